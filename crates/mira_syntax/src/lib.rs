//! Syntax definitions shared by every Mirana compiler stage.
//!
//! - [`span`]: byte spans and line/column positions
//! - [`diagnostic`]: the messages a compile unit accumulates
//! - [`cst`]: the concrete syntax tree the parser produces
//! - [`visit`]: read-only traversal over that tree

pub mod cst;
pub mod diagnostic;
pub mod span;
pub mod visit;

pub use diagnostic::{Diagnostic, DiagnosticKind, ErrorCode};
pub use span::{LineIndex, Position, Span};

/// Whether `c` may appear inside an identifier.
pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
