use mira_lexer::{tokenize, LexError};
use mira_syntax::cst::Chunk;
use mira_syntax::{Diagnostic, LineIndex, Span};
use thiserror::Error;
use tracing::debug;

use crate::parser::Parser;
use crate::preprocess::{self, PreprocessOptions};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected} near {found}")]
    Unexpected {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("{message}")]
    Invalid { message: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(err) => err.span(),
            ParseError::Unexpected { span, .. } | ParseError::Invalid { span, .. } => *span,
        }
    }

    /// Render as a `Syntax Error at (line, column)` diagnostic against the
    /// text that was parsed.
    pub fn to_diagnostic(&self, source: &str) -> Diagnostic {
        let position = LineIndex::new(source).position(source, self.span().start);
        Diagnostic::syntax(position, self.to_string())
    }
}

/// Result of parsing a Mirana source file.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub chunk: Chunk,
    /// The text the tree's spans point into (after line merging and macro
    /// expansion).
    pub preprocessed_source: String,
}

/// Parse already-preprocessed text.
pub fn parse_chunk(source: &str) -> Result<Chunk, ParseError> {
    let tokens = tokenize(source)?;
    Parser::new(source, tokens).chunk()
}

/// Parse a Mirana source string.
///
/// 1. Preprocess: merge continued lines, expand macros.
/// 2. Parse: tokenize the preprocessed text and build the tree.
///
/// Preprocessor diagnostics are all returned; a syntax error is returned
/// alone.
pub fn parse_mirana(
    source: &str,
    options: &PreprocessOptions,
) -> Result<ParseOutput, Vec<Diagnostic>> {
    let preprocessed = preprocess::preprocess(source, options);
    if !preprocessed.diagnostics.is_empty() {
        return Err(preprocessed.diagnostics);
    }

    let text = preprocessed.text;
    let chunk = parse_chunk(&text).map_err(|err| vec![err.to_diagnostic(&text)])?;
    debug!(statements = chunk.block.stats.len(), "parsed chunk");

    Ok(ParseOutput {
        chunk,
        preprocessed_source: text,
    })
}
