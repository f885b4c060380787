//! Recursive-descent parser over the token stream.
//!
//! Statements live in [`stat`], expressions in [`expr`]. The parser stops at
//! the first error.

use mira_lexer::{Token, TokenKind};
use mira_syntax::cst::{Block, BlockTail, Chunk, Expr, ExpBlock, Name, ReturnStat, Stat};
use mira_syntax::Span;

use crate::parse::ParseError;

mod expr;
mod stat;

pub(crate) type PResult<T> = Result<T, ParseError>;

pub(crate) struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
}

/// What a line of an expression block turned out to be.
enum Item {
    Stat(Stat),
    /// Trailing values that become the block's result.
    Values(Vec<Expr>),
}

impl<'src> Parser<'src> {
    /// `tokens` must end with [`TokenKind::Eof`], as `mira_lexer::tokenize`
    /// guarantees.
    pub(crate) fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        debug_assert!(matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof));
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    pub(crate) fn chunk(&mut self) -> PResult<Chunk> {
        let block = self.block()?;
        self.expect(TokenKind::Eof)?;
        Ok(Chunk {
            block,
            span: Span::new(0, self.source.len()),
        })
    }

    // ============ Token access ============

    fn current(&self) -> Token {
        self.tokens[self.pos]
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_nth(&self, n: usize) -> TokenKind {
        let last = self.tokens.len() - 1;
        self.tokens[(self.pos + n).min(last)].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        self.check(kind).then(|| self.advance())
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        match self.eat(kind) {
            Some(token) => Ok(token),
            None => Err(self.unexpected(kind.describe())),
        }
    }

    fn start(&self) -> usize {
        self.current().span.start
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        let end = match self.pos {
            0 => start,
            pos => self.tokens[pos - 1].span.end,
        };
        Span::new(start, end.max(start))
    }

    fn text(&self, token: Token) -> &'src str {
        token.text(self.source)
    }

    fn name(&mut self) -> PResult<Name> {
        let token = self.expect(TokenKind::Name)?;
        Ok(Name {
            text: self.text(token).to_string(),
            span: token.span,
        })
    }

    // ============ Errors ============

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.current();
        let found = match token.kind {
            TokenKind::Name
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::LongString
            | TokenKind::LambdaParam => format!("'{}'", self.text(token)),
            kind => kind.describe().to_string(),
        };
        ParseError::Unexpected {
            expected: expected.to_string(),
            found,
            span: token.span,
        }
    }

    fn invalid(&self, message: impl Into<String>, span: Span) -> ParseError {
        ParseError::Invalid {
            message: message.into(),
            span,
        }
    }

    // ============ Blocks ============

    fn block_follow(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Else
                | TokenKind::Elseif
                | TokenKind::End
                | TokenKind::Until
                | TokenKind::Eof
        )
    }

    fn block(&mut self) -> PResult<Block> {
        let start = self.start();
        let mut stats = Vec::new();
        let mut ret = None;
        while !self.block_follow() {
            if self.check(TokenKind::Return) {
                ret = Some(self.return_stat()?);
                break;
            }
            stats.push(self.statement()?);
        }
        Ok(Block {
            stats,
            ret,
            span: self.span_from(start),
        })
    }

    /// Like [`Parser::block`], but a trailing expression list is allowed
    /// and becomes the block's value.
    fn exp_block(&mut self) -> PResult<ExpBlock> {
        let start = self.start();
        let mut stats = Vec::new();
        let mut tail = None;
        while !self.block_follow() {
            if self.check(TokenKind::Return) {
                tail = Some(BlockTail::Return(self.return_stat()?));
                break;
            }
            match self.exp_block_item()? {
                Item::Stat(stat) => stats.push(stat),
                Item::Values(values) => {
                    self.eat(TokenKind::Semicolon);
                    tail = Some(BlockTail::Values(values));
                    break;
                }
            }
        }
        Ok(ExpBlock {
            stats,
            tail,
            span: self.span_from(start),
        })
    }

    fn return_stat(&mut self) -> PResult<ReturnStat> {
        let start = self.expect(TokenKind::Return)?.span.start;
        let values = if self.block_follow() || self.check(TokenKind::Semicolon) {
            Vec::new()
        } else {
            self.expr_list()?
        };
        self.eat(TokenKind::Semicolon);
        Ok(ReturnStat {
            values,
            span: self.span_from(start),
        })
    }
}
