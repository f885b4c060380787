//! Lexer for Mirana.
//!
//! Produces the Lua 5.4 token set plus the Mirana additions:
//!
//! - `$1`, `$2`, ... implicit lambda parameters and the `it` keyword
//! - `fn` / `fun` lambda introducers and the `=>` arrow
//! - `++` / `--` step operators and `op=` compound assignments

pub mod token;

use logos::Logos;
use mira_syntax::Span;
use thiserror::Error;

pub use token::{Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char, span: Span },

    #[error("unfinished string")]
    UnterminatedString { span: Span },

    #[error("unfinished long string or comment")]
    UnterminatedLongBracket { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedLongBracket { span } => *span,
        }
    }
}

/// Tokenize `source`, ending with a single [`TokenKind::Eof`] token.
///
/// Stops at the first malformed token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(range.start, range.end);
        match result {
            Ok(kind) => tokens.push(Token::new(kind, span)),
            Err(()) => return Err(classify_error(source, span)),
        }
    }

    tokens.push(Token::new(
        TokenKind::Eof,
        Span::new(source.len(), source.len()),
    ));
    Ok(tokens)
}

fn classify_error(source: &str, span: Span) -> LexError {
    let text = &source[span.start..];
    match text.chars().next() {
        Some('"' | '\'') => LexError::UnterminatedString { span },
        Some('[') => LexError::UnterminatedLongBracket { span },
        // `--[[` without its closing bracket
        Some('-') => LexError::UnterminatedLongBracket { span },
        Some(ch) => LexError::UnexpectedChar { ch, span },
        None => LexError::UnexpectedChar { ch: '\0', span },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("lexes")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds("  \n\t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn keywords_and_names() {
        assert_eq!(
            kinds("local fun fn it item"),
            vec![
                TokenKind::Local,
                TokenKind::Fun,
                TokenKind::Fn,
                TokenKind::It,
                TokenKind::Name,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("3 3.0 .5 1e10 0xFF 0x1p4"),
            vec![TokenKind::Number; 6]
                .into_iter()
                .chain([TokenKind::Eof])
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn strings_and_long_strings() {
        let src = "'a' \"b\\\"c\" [[x\n]] [==[ ]] ]==]";
        assert_eq!(
            kinds(src),
            vec![
                TokenKind::String,
                TokenKind::String,
                TokenKind::LongString,
                TokenKind::LongString,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let src = "a -- comment\nb --[[ long\ncomment ]] c --[==[ x ]==]";
        assert_eq!(
            kinds(src),
            vec![TokenKind::Name, TokenKind::Name, TokenKind::Name, TokenKind::Eof]
        );
    }

    #[test]
    fn decrement_versus_comment() {
        assert_eq!(
            kinds("x--\ny"),
            vec![
                TokenKind::Name,
                TokenKind::MinusMinus,
                TokenKind::Name,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("x -- y"),
            vec![TokenKind::Name, TokenKind::Eof]
        );
        assert_eq!(
            kinds("f(--)"),
            vec![
                TokenKind::Name,
                TokenKind::LParen,
                TokenKind::MinusMinus,
                TokenKind::RParen,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("t[i]--;"),
            vec![
                TokenKind::Name,
                TokenKind::LBracket,
                TokenKind::Name,
                TokenKind::RBracket,
                TokenKind::MinusMinus,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn mirana_operators() {
        assert_eq!(
            kinds("$1 => ++ += ..= //= ... .."),
            vec![
                TokenKind::LambdaParam,
                TokenKind::FatArrow,
                TokenKind::PlusPlus,
                TokenKind::PlusAssign,
                TokenKind::DotDotAssign,
                TokenKind::DoubleSlashAssign,
                TokenKind::Ellipsis,
                TokenKind::DotDot,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unterminated_string_is_reported() {
        let err = tokenize("x = \"abc").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }), "{err:?}");
    }

    #[test]
    fn unterminated_long_comment_is_reported() {
        let err = tokenize("a = 1\n--[==[ never closed ]]\nb = 2").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedLongBracket { .. }), "{err:?}");
        assert_eq!(err.span().start, 6);
        assert_eq!(err.to_string(), "unfinished long string or comment");
        assert!(tokenize("--[[ closed ]] x").is_ok());
    }

    #[test]
    fn unexpected_character_is_reported() {
        let err = tokenize("a ? b").unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedChar {
                ch: '?',
                span: Span::new(2, 3)
            }
        );
    }
}
