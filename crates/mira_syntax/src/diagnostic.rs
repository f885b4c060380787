//! Human-readable compile diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::Position;

/// Numbered semantic error classes, rendered as `Mira<code>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// A lambda-only construct used outside a lambda, or placeholder and
    /// iterator forms mixed in one lambda.
    Lambda = 1,
    DuplicateMacro = 2,
    MalformedMacro = 3,
    /// Argument matching, overload resolution or expansion limit failures.
    MacroCall = 4,
}

impl ErrorCode {
    pub fn number(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    Syntax,
    Error(ErrorCode),
}

/// One message attached to a compile unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub position: Position,
    pub message: String,
}

impl Diagnostic {
    pub fn syntax(position: Position, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Syntax,
            position,
            message: message.into(),
        }
    }

    pub fn error(code: ErrorCode, position: Position, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Error(code),
            position,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self.kind {
            DiagnosticKind::Syntax => None,
            DiagnosticKind::Error(code) => Some(code),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::Syntax => {
                write!(f, "Syntax Error at {}: {}", self.position, self.message)
            }
            DiagnosticKind::Error(code) => write!(
                f,
                "Error Mira{} {}: {}",
                code.number(),
                self.position,
                self.message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_semantic_errors() {
        let d = Diagnostic::error(
            ErrorCode::DuplicateMacro,
            Position::new(3, 0),
            "duplicate macro definition M",
        );
        assert_eq!(
            d.to_string(),
            "Error Mira2 (3, 0): duplicate macro definition M"
        );
    }

    #[test]
    fn renders_syntax_errors() {
        let d = Diagnostic::syntax(Position::new(1, 7), "expected 'end'");
        assert_eq!(d.to_string(), "Syntax Error at (1, 7): expected 'end'");
        assert_eq!(d.code(), None);
    }
}
