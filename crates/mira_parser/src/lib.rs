//! Mirana front end.
//!
//! Source text goes through a text-level preprocessor before it is parsed:
//!
//! - Line continuation (`\` at end of line)
//! - Function-like macros (`#define NAME(params) text`) with stringification
//!   (`#a`), token pasting (`a##b`) and variadic tails (`__VA_ARGS__`)
//!
//! The preprocessed text is then tokenized by `mira_lexer` and parsed into
//! the concrete syntax tree of `mira_syntax::cst`.

pub mod parse;
mod parser;
pub mod preprocess;

pub use parse::{parse_chunk, parse_mirana, ParseError, ParseOutput};
pub use preprocess::{preprocess, PreprocessOptions, Preprocessed};
