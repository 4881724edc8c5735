use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use swc_core::common::{Span, SyntaxContext};
use swc_core::ecma::ast::{Expr, Ident, Lit, Null, Number, UnaryExpr, UnaryOp};
use swc_core::ecma::parser::{EsSyntax, Syntax, TsSyntax};

use crate::errors::ConfigError;
use crate::matcher::{RulePolicy, RuleSet};

static SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid segment regex"));

const WILDCARD: &str = "*";

/// Expression substituted for an elided callee or call.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Replacement {
    /// `void 0`
    #[default]
    #[serde(rename = "void0")]
    Void0,
    /// the global `undefined` identifier
    Undefined,
    /// `null`
    Null,
}

impl Replacement {
    pub fn to_expr(self, span: Span) -> Expr {
        match self {
            Replacement::Void0 => Expr::Unary(UnaryExpr {
                span,
                op: UnaryOp::Void,
                arg: Box::new(Expr::Lit(Lit::Num(Number { span, value: 0.0, raw: None }))),
            }),
            Replacement::Undefined => {
                Expr::Ident(Ident::new("undefined".into(), span, SyntaxContext::empty()))
            }
            Replacement::Null => Expr::Lit(Lit::Null(Null { span })),
        }
    }
}

/// What part of a matched call gets replaced.
///
/// `Callee` keeps the argument list, so `console.log(f())` becomes
/// `void 0(f())`: arguments still evaluate and the call itself throws at
/// runtime if it is ever reached. `Call` drops the arguments entirely, so
/// their side effects are gone too.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ReplaceMode {
    #[default]
    Callee,
    Call,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SourceSyntax {
    #[default]
    Ecmascript,
    Typescript,
}

fn default_target_call_paths() -> Vec<String> {
    vec!["console.log".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    /// Dotted call targets to elide, e.g. `["console.log", "debug.*"]`.
    /// An empty list turns the plugin into a no-op.
    #[serde(default = "default_target_call_paths")]
    pub target_call_paths: Vec<String>,

    #[serde(default)]
    pub replacement_literal: Replacement,

    #[serde(default)]
    pub mode: ReplaceMode,

    /// Wrap a replaced callee in parentheses: `(void 0)("x")`. Only used in
    /// `callee` mode; `call` mode always adds the parentheses the grammar needs.
    #[serde(default)]
    pub parenthesize: bool,

    /// Parser dialect used by [`crate::transform`]. The plugin entry receives
    /// an already parsed program and ignores it.
    #[serde(default)]
    pub syntax: SourceSyntax,

    #[serde(default)]
    pub jsx: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            target_call_paths: default_target_call_paths(),
            replacement_literal: Replacement::default(),
            mode: ReplaceMode::default(),
            parenthesize: false,
            syntax: SourceSyntax::default(),
            jsx: false,
        }
    }
}

impl PluginConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))
    }

    pub fn with_targets<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target_call_paths: targets.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target_call_paths.iter().try_for_each(|path| validate_path(path))
    }

    /// Validates the config and builds the immutable rule set for one run.
    pub fn rule_set(&self) -> Result<RuleSet, ConfigError> {
        self.validate()?;

        let policy = RulePolicy {
            replacement: self.replacement_literal,
            mode: self.mode,
            parenthesize: self.parenthesize,
        };

        let mut rules = RuleSet::default();
        for path in &self.target_call_paths {
            match path.strip_suffix(".*") {
                Some(prefix) => rules.insert_wildcard(prefix, policy),
                None => rules.insert_exact(path, policy),
            }
        }
        Ok(rules)
    }

    pub fn parser_syntax(&self) -> Syntax {
        match self.syntax {
            SourceSyntax::Ecmascript => Syntax::Es(EsSyntax { jsx: self.jsx, ..Default::default() }),
            SourceSyntax::Typescript => {
                Syntax::Typescript(TsSyntax { tsx: self.jsx, ..Default::default() })
            }
        }
    }
}

fn validate_path(path: &str) -> Result<(), ConfigError> {
    if path.trim().is_empty() {
        return Err(ConfigError::EmptyPath);
    }
    if path == WILDCARD {
        return Err(ConfigError::BareWildcard);
    }

    let segments: Vec<&str> = path.split('.').collect();
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            return Err(ConfigError::EmptySegment { path: path.to_string() });
        }
        if *segment == WILDCARD {
            if i != last {
                return Err(ConfigError::MisplacedWildcard { path: path.to_string() });
            }
            continue;
        }
        if !SEGMENT.is_match(segment) {
            return Err(ConfigError::InvalidSegment {
                path: path.to_string(),
                segment: segment.to_string(),
            });
        }
    }
    Ok(())
}
