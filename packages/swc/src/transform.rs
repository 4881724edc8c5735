use swc_core::common::{Span, Spanned};
use swc_core::ecma::{
    ast::*,
    visit::{VisitMut, VisitMutWith},
};
use tracing::{debug, trace};

use crate::config::ReplaceMode;
use crate::matcher::{RulePolicy, RuleSet};

/// Rewrites calls to configured targets in place.
///
/// Every node is visited pre-order. Nodes the pass has no interest in are
/// walked through the default `visit_mut_children_with`, so new node kinds
/// pass through untouched.
pub struct ElideCallsTransformer<'a> {
    rules: &'a RuleSet,
    elided: usize,
}

impl<'a> ElideCallsTransformer<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules, elided: 0 }
    }

    /// Number of calls rewritten so far.
    pub fn elided(&self) -> usize {
        self.elided
    }

    fn replacement(policy: RulePolicy, span: Span) -> Expr {
        let expr = policy.replacement.to_expr(span);
        if policy.parenthesize && policy.mode == ReplaceMode::Callee {
            Expr::Paren(ParenExpr { span, expr: Box::new(expr) })
        } else {
            expr
        }
    }
}

impl VisitMut for ElideCallsTransformer<'_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        let hit = match &*expr {
            Expr::Call(call) => self.rules.matches(call),
            _ => None,
        };

        let Some((path, policy)) = hit else {
            expr.visit_mut_children_with(self);
            paren_tight_operands(expr);
            return;
        };

        self.elided += 1;
        debug!(path = %path, mode = ?policy.mode, "eliding call");

        match policy.mode {
            ReplaceMode::Callee => {
                if let Expr::Call(call) = expr {
                    let span = call.callee.span();
                    call.callee = Callee::Expr(Box::new(Self::replacement(policy, span)));
                    // the replacement is final, but arguments may hold more targets
                    call.args.visit_mut_with(self);
                }
            }
            ReplaceMode::Call => {
                let span = expr.span();
                *expr = Self::replacement(policy, span);
            }
        }
    }
}

/// Wraps `void 0` left by a whole-call replacement in the operand slots that
/// bind tighter than a unary expression, so `console.log(x).length` prints as
/// `(void 0).length` instead of `void 0.length`.
///
/// The parser keeps `ParenExpr` nodes, so a bare `Expr::Unary` can only sit in
/// one of these slots after a replacement.
fn paren_tight_operands(expr: &mut Expr) {
    match expr {
        Expr::Member(member) => paren_unary(&mut member.obj),
        Expr::Call(call) => {
            if let Callee::Expr(callee) = &mut call.callee {
                paren_unary(callee);
            }
        }
        Expr::New(new) => paren_unary(&mut new.callee),
        Expr::TaggedTpl(tagged) => paren_unary(&mut tagged.tag),
        Expr::Bin(bin) if bin.op == BinaryOp::Exp => paren_unary(&mut bin.left),
        Expr::OptChain(chain) => match &mut *chain.base {
            OptChainBase::Member(member) => paren_unary(&mut member.obj),
            OptChainBase::Call(call) => paren_unary(&mut call.callee),
        },
        _ => {}
    }
}

fn paren_unary(slot: &mut Box<Expr>) {
    if let Expr::Unary(unary) = &**slot {
        let span = unary.span;
        let inner = std::mem::replace(&mut **slot, Expr::Invalid(Invalid { span }));
        **slot = Expr::Paren(ParenExpr { span, expr: Box::new(inner) });
    }
}

/// Runs the rewrite over a whole program and returns how many calls were
/// elided.
pub fn rewrite(program: &mut Program, rules: &RuleSet) -> usize {
    if rules.is_empty() {
        trace!("no target call paths configured, skipping");
        return 0;
    }

    let mut transformer = ElideCallsTransformer::new(rules);
    program.visit_mut_with(&mut transformer);
    trace!(elided = transformer.elided(), rules = rules.len(), "rewrite finished");
    transformer.elided()
}

#[cfg(test)]
mod tests {
    use swc_core::common::DUMMY_SP;

    use crate::config::{PluginConfig, Replacement};
    use crate::driver::transform;

    use super::*;

    fn run(src: &str, config: &PluginConfig) -> (String, usize) {
        let out = transform(src, config).unwrap();
        (out.code, out.elided)
    }

    #[test]
    fn replaces_callee_and_keeps_arguments() {
        let (code, elided) = run("console.log(a, b);", &PluginConfig::default());
        assert_eq!(code, "void 0(a, b);\n");
        assert_eq!(elided, 1);
    }

    #[test]
    fn nested_targets_inside_arguments_are_rewritten() {
        let (code, elided) = run("console.log(console.log(1));", &PluginConfig::default());
        assert_eq!(code, "void 0(void 0(1));\n");
        assert_eq!(elided, 2);
    }

    #[test]
    fn call_mode_drops_arguments() {
        let config = PluginConfig { mode: ReplaceMode::Call, ..PluginConfig::default() };
        let (code, elided) = run("console.log(sideEffect());", &config);
        assert_eq!(code, "void 0;\n");
        assert_eq!(elided, 1);
    }

    #[test]
    fn call_mode_parenthesizes_tight_operands() {
        let config = PluginConfig { mode: ReplaceMode::Call, ..PluginConfig::default() };
        let cases = [
            ("let n = console.log(x).length;", "let n = (void 0).length;\n"),
            ("console.log(x) ** 2;", "(void 0) ** 2;\n"),
            ("console.log(x)();", "(void 0)();\n"),
            ("new (console.log(x))();", "new (void 0)();\n"),
            ("console.log(x)`t`;", "(void 0)`t`;\n"),
            ("console.log(x)?.y;", "(void 0)?.y;\n"),
            ("let s = console.log(x) + 1;", "let s = void 0 + 1;\n"),
        ];
        for (src, expected) in cases {
            let (code, elided) = run(src, &config);
            assert_eq!(code, expected, "{src}");
            assert_eq!(elided, 1, "{src}");

            // the printed code parses back to the same program
            let reparsed = run(&code, &PluginConfig::with_targets(Vec::<String>::new())).0;
            assert_eq!(reparsed, code, "{src}");
        }
    }

    #[test]
    fn call_mode_ignores_callee_parenthesize_flag() {
        let config =
            PluginConfig { mode: ReplaceMode::Call, parenthesize: true, ..PluginConfig::default() };
        assert_eq!(run("console.log(x);", &config).0, "void 0;\n");
        assert_eq!(run("console.log(x)();", &config).0, "(void 0)();\n");
    }

    #[test]
    fn primary_replacements_need_no_parentheses() {
        let config = PluginConfig {
            mode: ReplaceMode::Call,
            replacement_literal: Replacement::Null,
            ..PluginConfig::default()
        };
        assert_eq!(run("console.log(x).length;", &config).0, "null.length;\n");
    }

    #[test]
    fn other_calls_are_left_alone() {
        let (code, elided) = run("console.warn(x);\nlog(x);\n", &PluginConfig::default());
        assert_eq!(code, "console.warn(x);\nlog(x);\n");
        assert_eq!(elided, 0);
    }

    #[test]
    fn replacement_literals() {
        let cases = [
            (Replacement::Undefined, "undefined(1);\n"),
            (Replacement::Null, "null(1);\n"),
        ];
        for (replacement, expected) in cases {
            let config = PluginConfig { replacement_literal: replacement, ..PluginConfig::default() };
            assert_eq!(run("console.log(1)", &config).0, expected);
        }
    }

    #[test]
    fn empty_rule_set_is_a_no_op() {
        let rules = RuleSet::default();
        let mut program = Program::Script(Script { span: DUMMY_SP, body: vec![], shebang: None });
        assert_eq!(rewrite(&mut program, &rules), 0);
    }
}
