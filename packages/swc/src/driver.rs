use swc_core::common::{
    comments::SingleThreadedComments, sync::Lrc, FileName, FilePathMapping, Globals, SourceMap,
    Spanned, GLOBALS,
};
use swc_core::ecma::ast::{EsVersion, Program};
use swc_core::ecma::codegen::{text_writer::JsWriter, Config, Emitter};
use swc_core::ecma::parser::{error::Error as SyntaxError, parse_file_as_program};
use tracing::debug;

use crate::config::PluginConfig;
use crate::errors::{ParseError, TransformError};
use crate::matcher::RuleSet;
use crate::transform::rewrite;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    /// Rewritten source, always newline terminated.
    pub code: String,
    /// Number of calls that were rewritten.
    pub elided: usize,
}

/// Parses `source`, elides the configured calls and prints the result.
///
/// The whole run is self-contained: it owns its source map, comments and
/// globals, so concurrent callers never share state.
pub fn transform(source: &str, config: &PluginConfig) -> Result<TransformOutput, TransformError> {
    let rules = config.rule_set()?;

    GLOBALS.set(&Globals::new(), || -> Result<TransformOutput, TransformError> {
        let cm: Lrc<SourceMap> = Lrc::new(SourceMap::new(FilePathMapping::empty()));
        let comments = SingleThreadedComments::default();

        let mut program = parse(&cm, &comments, source, config)?;
        let elided = transform_program(&mut program, &rules);
        let code = print(&cm, &comments, &program)?;

        Ok(TransformOutput { code, elided })
    })
}

/// Tree-level entry shared with the plugin: rewrites `program` in place.
pub fn transform_program(program: &mut Program, rules: &RuleSet) -> usize {
    let elided = rewrite(program, rules);
    debug!(elided, "elide-calls pass done");
    elided
}

fn parse(
    cm: &Lrc<SourceMap>,
    comments: &SingleThreadedComments,
    source: &str,
    config: &PluginConfig,
) -> Result<Program, ParseError> {
    let fm = cm.new_source_file(Lrc::new(FileName::Anon), source.to_string());
    let mut recovered = Vec::new();

    let program = parse_file_as_program(
        &fm,
        config.parser_syntax(),
        EsVersion::EsNext,
        Some(comments),
        &mut recovered,
    )
    .map_err(|err| to_parse_error(cm, err))?;

    // transform is all-or-nothing: errors the parser recovered from still fail
    if let Some(err) = recovered.into_iter().next() {
        return Err(to_parse_error(cm, err));
    }

    Ok(program)
}

fn to_parse_error(cm: &SourceMap, err: SyntaxError) -> ParseError {
    let loc = cm.lookup_char_pos(err.span().lo);
    ParseError {
        message: err.kind().msg().to_string(),
        line: loc.line,
        column: loc.col.0 + 1,
    }
}

fn print(
    cm: &Lrc<SourceMap>,
    comments: &SingleThreadedComments,
    program: &Program,
) -> Result<String, TransformError> {
    let mut buf = Vec::new();
    {
        let mut emitter = Emitter {
            cfg: Config::default(),
            cm: cm.clone(),
            comments: Some(comments),
            wr: JsWriter::new(cm.clone(), "\n", &mut buf, None),
        };
        emitter.emit_program(program)?;
    }

    let mut code = String::from_utf8(buf)?;
    // the writer leaves a space after a trailing block comment
    code.truncate(code.trim_end().len());
    code.push('\n');
    Ok(code)
}
