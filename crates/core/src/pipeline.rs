//! Lex -> parse -> evaluate, end to end.
//!
//! This is a thin orchestrator over the stage modules. Each call builds its
//! own stage state; nothing is shared between calls.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::ast::Document;
use crate::error::Result;
use crate::eval::{self, EvalOptions};
use crate::lexer;
use crate::parser::{self, ParseOptions};
use crate::value::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub parse: ParseOptions,
    pub eval: EvalOptions,
}

/// Lex and parse, without evaluating.
pub fn parse_str(src: &str, options: &Options) -> Result<Document> {
    let tokens = lexer::tokenize(src)?;
    Ok(parser::parse_with(&tokens, options.parse)?)
}

/// Evaluate source text with default options, returning the first error
/// of whichever stage fails.
pub fn evaluate_str(src: &str) -> Result<Value> {
    evaluate_str_with(src, &Options::default())
}

pub fn evaluate_str_with(src: &str, options: &Options) -> Result<Value> {
    let doc = parse_str(src, options)?;
    Ok(eval::evaluate_with(&doc, options.eval)?)
}

/// Read a file and evaluate it.
pub fn evaluate_file(path: &Path, options: &Options) -> Result<Value> {
    let src = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), bytes = src.len(), "read source file");
    evaluate_str_with(&src, options)
}

/// Evaluate and deserialize into a caller-defined type.
pub fn from_str<T: DeserializeOwned>(src: &str) -> Result<T> {
    let value = evaluate_str(src)?;
    Ok(serde_json::from_value(value.to_json())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Widget {
        #[serde(rename = "type")]
        kind: String,
        format: Option<String>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Bar {
        position: String,
        height: u32,
        end: Vec<Widget>,
    }

    #[test]
    fn stages_report_their_own_errors() {
        assert!(matches!(evaluate_str("{ a = \"x }"), Err(Error::Lex(_))));
        assert!(matches!(evaluate_str("{ a = }"), Err(Error::Parse(_))));
        assert!(matches!(evaluate_str("{ a = $b }"), Err(Error::Eval(_))));
    }

    #[test]
    fn deserializes_into_host_types() {
        let bar: Bar = from_str(
            r#"
let {
    $clock = { type = "clock" format = "%H:%M" }
} in {
    position = "top"
    height = 32
    end = [ { type = "tray" } $clock ]
}
"#,
        )
        .unwrap();
        assert_eq!(bar.position, "top");
        assert_eq!(bar.height, 32);
        assert_eq!(
            bar.end,
            vec![
                Widget {
                    kind: "tray".into(),
                    format: None
                },
                Widget {
                    kind: "clock".into(),
                    format: Some("%H:%M".into())
                },
            ]
        );
    }

    #[test]
    fn deserialize_failure_is_reported() {
        let err = from_str::<Bar>("{ position = 1 }").unwrap_err();
        assert_eq!(err.stage(), "deserialize");
        assert_eq!(err.span(), None);
    }

    #[test]
    fn parse_options_are_applied() {
        let options = Options {
            parse: ParseOptions { max_depth: 1 },
            ..Options::default()
        };
        let err = evaluate_str_with("{ a = { b = 1 } }", &options).unwrap_err();
        assert_eq!(err.stage(), "parse");
    }

    #[test]
    fn eval_options_are_applied() {
        let src = "let { $a = { b = 1 } } in { a = $a }";
        assert!(evaluate_str(src).is_ok());
        let options = Options {
            eval: EvalOptions { max_depth: 3 },
            ..Options::default()
        };
        let err = evaluate_str_with(src, &options).unwrap_err();
        assert_eq!(err.stage(), "eval");
        assert_eq!(err.span(), Some(crate::ast::Span::new(1, 18)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = evaluate_file(Path::new("/nonexistent/bar.sheaf"), &Options::default())
            .unwrap_err();
        assert_eq!(err.stage(), "io");
    }
}
