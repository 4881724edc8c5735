use std::collections::HashMap;

use swc_core::ecma::ast::{CallExpr, Callee, Expr, MemberProp};

use crate::config::{ReplaceMode, Replacement};

/// How a matched call is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulePolicy {
    pub replacement: Replacement,
    pub mode: ReplaceMode,
    pub parenthesize: bool,
}

/// Immutable lookup table from dotted call paths to their policy.
///
/// Exact paths win over wildcard prefixes: with both `console.*` and
/// `console.log` configured, `console.log` uses its own entry.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    exact: HashMap<String, RulePolicy>,
    /// `console.*` is stored under `console`.
    wildcard: HashMap<String, RulePolicy>,
}

impl RuleSet {
    pub fn insert_exact(&mut self, path: &str, policy: RulePolicy) {
        self.exact.insert(path.to_string(), policy);
    }

    pub fn insert_wildcard(&mut self, prefix: &str, policy: RulePolicy) {
        self.wildcard.insert(prefix.to_string(), policy);
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.wildcard.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.wildcard.len()
    }

    /// Returns the resolved callee path and its policy when `call` targets a
    /// configured function.
    pub fn matches(&self, call: &CallExpr) -> Option<(String, RulePolicy)> {
        if self.is_empty() {
            return None;
        }

        let parts = resolve_callee_path(&call.callee)?;
        let path = parts.join(".");

        if let Some(policy) = self.exact.get(&path) {
            return Some((path, *policy));
        }

        let (_, prefix) = parts.split_last()?;
        if prefix.is_empty() {
            return None;
        }
        let policy = self.wildcard.get(&prefix.join("."))?;
        Some((path, *policy))
    }
}

/// Resolves a callee such as `a.b.c` into `["a", "b", "c"]`.
///
/// Only identifiers and static member accesses resolve, seen through
/// parentheses and TypeScript wrappers (`!`, `as`, `<T>`, `satisfies`).
/// Computed access (`console["log"]`), private names, optional chains and any
/// other expression yield `None`, so such calls are never rewritten.
pub fn resolve_callee_path(callee: &Callee) -> Option<Vec<String>> {
    let Callee::Expr(expr) = callee else {
        return None;
    };

    let mut parts = Vec::new();
    let mut current: &Expr = expr;

    loop {
        match current {
            // obj.prop
            Expr::Member(member) => match &member.prop {
                MemberProp::Ident(ident) => {
                    parts.push(ident.sym.to_string());
                    current = &member.obj;
                }
                // obj['prop'], obj.#prop
                _ => return None,
            },

            Expr::Ident(ident) => {
                parts.push(ident.sym.to_string());
                break;
            }

            Expr::Paren(paren) => current = &paren.expr,
            Expr::TsNonNull(non_null) => current = &non_null.expr,
            Expr::TsAs(as_expr) => current = &as_expr.expr,
            Expr::TsTypeAssertion(assertion) => current = &assertion.expr,
            Expr::TsSatisfies(satisfies) => current = &satisfies.expr,

            _ => return None,
        }
    }

    parts.reverse();
    Some(parts)
}
