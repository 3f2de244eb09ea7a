use crate::ast::Span;

/// A malformed token. Lexing stops at the first one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{span}: {reason}")]
pub struct LexError {
    pub span: Span,
    pub reason: String,
}

impl LexError {
    pub fn new(span: Span, reason: impl Into<String>) -> Self {
        LexError {
            span,
            reason: reason.into(),
        }
    }
}

/// A grammar violation: unexpected token, unbalanced bracket, duplicate
/// binding or a `let` block without its `in`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{span}: expected {expected}, found {found}")]
pub struct ParseError {
    pub span: Span,
    pub expected: String,
    pub found: String,
}

impl ParseError {
    pub fn new(span: Span, expected: impl Into<String>, found: impl Into<String>) -> Self {
        ParseError {
            span,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Failures while substituting variables and merging key paths.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// Reference to a name that is not bound, or not bound yet.
    #[error("{site}: undefined variable '${name}'")]
    UndefinedVariable { name: String, site: Span },

    /// A map and a non-map value written to the same key.
    #[error("{site}: cannot merge {incoming} into key '{key}', which already holds {existing}")]
    TypeConflict {
        key: String,
        site: Span,
        existing: &'static str,
        incoming: &'static str,
    },

    /// A binding that refers to itself.
    #[error("{site}: variable '${name}' refers to itself")]
    Cyclic { name: String, site: Span },

    /// `..$name` used with a value of the wrong shape.
    #[error("{site}: cannot spread '${name}' here: expected {expected}, found {found}")]
    SpreadMismatch {
        name: String,
        site: Span,
        expected: &'static str,
        found: &'static str,
    },

    /// Nested values and substitutions went deeper than the configured limit.
    #[error("{site}: evaluation nests deeper than {limit} levels")]
    TooDeep { site: Span, limit: usize },

    /// An error raised while evaluating a substituted binding.
    #[error("{reference}: in variable '${name}' (bound at {binding}): {source}")]
    InBinding {
        name: String,
        reference: Span,
        binding: Span,
        source: Box<EvalError>,
    },
}

impl EvalError {
    /// Location most useful to the author: the outermost reference site
    /// for wrapped errors.
    pub fn span(&self) -> Span {
        match self {
            EvalError::UndefinedVariable { site, .. }
            | EvalError::TypeConflict { site, .. }
            | EvalError::Cyclic { site, .. }
            | EvalError::SpreadMismatch { site, .. }
            | EvalError::TooDeep { site, .. } => *site,
            EvalError::InBinding { reference, .. } => *reference,
        }
    }

    /// The innermost error, with every `InBinding` layer removed.
    pub fn root_cause(&self) -> &EvalError {
        match self {
            EvalError::InBinding { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Any failure of the lex -> parse -> evaluate pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to deserialize value: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl Error {
    /// Pipeline stage that produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Lex(_) => "lex",
            Error::Parse(_) => "parse",
            Error::Eval(_) => "eval",
            Error::Io(_) => "io",
            Error::Deserialize(_) => "deserialize",
        }
    }

    /// Source location, when the error has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Lex(e) => Some(e.span),
            Error::Parse(e) => Some(e.span),
            Error::Eval(e) => Some(e.span()),
            Error::Io(_) | Error::Deserialize(_) => None,
        }
    }

    /// One-line cause without the location prefix.
    pub fn message(&self) -> String {
        match self {
            Error::Lex(e) => e.reason.clone(),
            Error::Parse(e) => format!("expected {}, found {}", e.expected, e.found),
            Error::Eval(e) => {
                let full = e.to_string();
                let prefix = format!("{}: ", e.span());
                full.strip_prefix(&prefix).map(str::to_owned).unwrap_or(full)
            }
            Error::Io(e) => e.to_string(),
            Error::Deserialize(e) => e.to_string(),
        }
    }

    /// Serialize for machine consumers. Missing locations are `null`.
    pub fn to_json_value(&self) -> serde_json::Value {
        let span = self.span();
        serde_json::json!({
            "stage":   self.stage(),
            "line":    span.map(|s| s.line),
            "col":     span.map(|s| s.col),
            "message": self.message(),
        })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
