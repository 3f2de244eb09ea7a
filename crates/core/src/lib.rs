//! sheaf-core: parser and evaluator for the sheaf configuration language.
//!
//! A document is an optional `let { ... } in` block of `$name = value`
//! bindings followed by a body value. Evaluation substitutes every variable
//! reference with its own copy of the bound value and merges dotted keys
//! (`icons.volume_high = "..."`) into nested maps, producing a [`Value`]
//! tree for the host application.
//!
//! ```text
//! let {
//!     $clock = { type = "clock" format = "%H:%M" }
//! } in {
//!     position = "top"
//!     icons.volume_high = "󰕾"
//!     end = [ $clock ]
//! }
//! ```
//!
//! # Public API
//!
//! - [`evaluate_str()`] / [`from_str()`] -- run the whole pipeline
//! - [`tokenize()`], [`parse()`], [`evaluate()`] -- individual stages
//! - [`Value`] -- evaluated tree
//! - [`Error`] and the per-stage [`LexError`], [`ParseError`], [`EvalError`]

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod merge;
pub mod parser;
pub mod pipeline;
pub mod scope;
pub mod value;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Document, KeyPath, Node, NodeKind, Span};
pub use error::{Error, EvalError, LexError, ParseError};
pub use eval::EvalOptions;
pub use parser::ParseOptions;
pub use pipeline::Options;
pub use scope::{Binding, Bindings};
pub use value::{Map, Value};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use eval::{evaluate, evaluate_with};
pub use lexer::tokenize;
pub use parser::{parse, parse_with};
pub use pipeline::{evaluate_file, evaluate_str, evaluate_str_with, from_str, parse_str};
