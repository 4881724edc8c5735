use swc_core::ecma::ast::Program;
use swc_core::plugin::{plugin_transform, proxies::TransformPluginProgramMetadata};
use tracing::warn;

mod config;
mod driver;
mod errors;
mod matcher;
mod transform;

pub use config::{PluginConfig, ReplaceMode, Replacement, SourceSyntax};
pub use driver::{transform, transform_program, TransformOutput};
pub use errors::{ConfigError, ParseError, TransformError};
pub use matcher::{resolve_callee_path, RulePolicy, RuleSet};
pub use transform::{rewrite, ElideCallsTransformer};

/// Builds the rule set from the host's JSON config string.
///
/// A missing config means defaults. An invalid one is reported to the host
/// diagnostics `HANDLER` and yields `None`, so the caller leaves the program
/// untouched.
fn load_rules(json: Option<&str>) -> Option<RuleSet> {
    let config = match json {
        Some(json) => PluginConfig::from_json(json),
        None => Ok(PluginConfig::default()),
    };

    match config.and_then(|config| config.rule_set()) {
        Ok(rules) => Some(rules),
        Err(err) => {
            warn!(error = %err, "invalid elide-calls config, leaving program untouched");
            errors::report_config_error(&err);
            None
        }
    }
}

#[plugin_transform]
pub fn process_transform(mut program: Program, metadata: TransformPluginProgramMetadata) -> Program {
    let config = metadata.get_transform_plugin_config();
    if let Some(rules) = load_rules(config.as_deref()) {
        transform_program(&mut program, &rules);
    }
    program
}

#[cfg(test)]
mod tests {
    use swc_core::common::errors::{ColorConfig, Handler, HANDLER};

    use super::*;

    fn with_handler<T>(f: impl FnOnce() -> T) -> (T, bool) {
        let handler = Handler::with_tty_emitter(ColorConfig::Never, true, false, None);
        let out = HANDLER.set(&handler, f);
        (out, handler.has_errors())
    }

    #[test]
    fn missing_config_uses_defaults() {
        let (rules, has_errors) = with_handler(|| load_rules(None));
        let rules = rules.unwrap();
        assert_eq!(rules.len(), 1);
        assert!(!has_errors);
    }

    #[test]
    fn valid_config_builds_rules() {
        let (rules, has_errors) =
            with_handler(|| load_rules(Some(r#"{"targetCallPaths": ["console.*", "debug"]}"#)));
        assert_eq!(rules.unwrap().len(), 2);
        assert!(!has_errors);
    }

    #[test]
    fn invalid_target_path_is_reported_to_the_host() {
        let (rules, has_errors) =
            with_handler(|| load_rules(Some(r#"{"targetCallPaths": ["console..log"]}"#)));
        assert!(rules.is_none());
        assert!(has_errors);
    }

    #[test]
    fn malformed_json_is_reported_to_the_host() {
        let (rules, has_errors) = with_handler(|| load_rules(Some("{not json")));
        assert!(rules.is_none());
        assert!(has_errors);
    }
}
