//! Token definitions.
//!
//! Whitespace and comments are skipped. Lua comments start with `--`, which
//! Mirana also uses as the decrement operator; [`dash_dash`] decides which
//! one a given `--` is.

use std::fmt;

use logos::{FilterResult, Lexer, Logos};
use mira_syntax::{is_ident_char, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f\v]+")]
pub enum TokenKind {
    // ============ Keywords ============
    #[token("and")]
    And,
    #[token("break")]
    Break,
    #[token("do")]
    Do,
    #[token("else")]
    Else,
    #[token("elseif")]
    Elseif,
    #[token("end")]
    End,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("function")]
    Function,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("local")]
    Local,
    #[token("nil")]
    Nil,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("repeat")]
    Repeat,
    #[token("return")]
    Return,
    #[token("then")]
    Then,
    #[token("true")]
    True,
    #[token("until")]
    Until,
    #[token("while")]
    While,
    /// Block and parameter-list lambda introducer.
    #[token("fn")]
    Fn,
    /// Implicit-parameter lambda introducer.
    #[token("fun")]
    Fun,
    /// Implicit iterator parameter.
    #[token("it")]
    It,

    // ============ Literals ============
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Name,
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"0[xX][0-9a-fA-F]*(\.[0-9a-fA-F]*)?([pP][+-]?[0-9]+)?")]
    Number,
    #[regex(r#""([^"\\\n]|\\(.|\n))*""#)]
    #[regex(r#"'([^'\\\n]|\\(.|\n))*'"#)]
    String,
    #[regex(r"\[=*\[", long_bracket)]
    LongString,
    /// `$1`, `$2`, ...
    #[regex(r"\$[0-9]+")]
    LambdaParam,

    // ============ Operators ============
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("#")]
    Hash,
    #[token("&")]
    Ampersand,
    #[token("~")]
    Tilde,
    #[token("|")]
    Pipe,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("==")]
    EqEq,
    #[token("~=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Assign,
    #[token("..")]
    DotDot,
    #[token("...")]
    Ellipsis,
    #[token("=>")]
    FatArrow,
    #[token("++")]
    PlusPlus,
    #[token("--", dash_dash)]
    MinusMinus,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("//=")]
    DoubleSlashAssign,
    #[token("%=")]
    PercentAssign,
    #[token("^=")]
    CaretAssign,
    #[token("..=")]
    DotDotAssign,

    // ============ Punctuation ============
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("::")]
    DoubleColon,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,

    Eof,
}

/// Consume the body of a long bracket (`[[ ... ]]`, `[==[ ... ]==]`).
fn long_bracket(lex: &mut Lexer<TokenKind>) -> bool {
    let level = lex.slice().len() - 2;
    skip_long_bracket(lex, level)
}

fn skip_long_bracket(lex: &mut Lexer<TokenKind>, level: usize) -> bool {
    let close = format!("]{}]", "=".repeat(level));
    match lex.remainder().find(&close) {
        Some(at) => {
            lex.bump(at + close.len());
            true
        }
        None => false,
    }
}

/// Decide between the decrement operator and a comment. An unclosed long
/// comment is an error.
fn dash_dash(lex: &mut Lexer<TokenKind>) -> FilterResult<(), ()> {
    let span = lex.span();
    if is_decrement(lex.source(), span.start, span.end) {
        return FilterResult::Emit(());
    }

    let remainder = lex.remainder();
    if let Some(open) = long_bracket_open(remainder) {
        lex.bump(open.len());
        let level = open.len() - 2;
        if !skip_long_bracket(lex, level) {
            return FilterResult::Error(());
        }
        return FilterResult::Skip;
    }

    let line_len = remainder.find('\n').unwrap_or(remainder.len());
    lex.bump(line_len);
    FilterResult::Skip
}

/// `--` is a decrement when it is directly followed (on the same line) by
/// `)`, `,` or `;`, or when it is glued to the end of an operand and ends
/// the line.
pub(crate) fn is_decrement(source: &str, start: usize, end: usize) -> bool {
    let rest_of_line = source[end..].split('\n').next().unwrap_or("");
    let next = rest_of_line
        .trim_start_matches([' ', '\t', '\r'])
        .chars()
        .next();
    if matches!(next, Some(')' | ',' | ';')) {
        return true;
    }
    let attached = source[..start]
        .chars()
        .next_back()
        .is_some_and(|c| is_ident_char(c) || c == ')' || c == ']');
    attached && next.is_none()
}

fn long_bracket_open(s: &str) -> Option<&str> {
    let rest = s.strip_prefix('[')?;
    let level = rest.len() - rest.trim_start_matches('=').len();
    rest[level..].starts_with('[').then(|| &s[..level + 2])
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::And => "'and'",
            TokenKind::Break => "'break'",
            TokenKind::Do => "'do'",
            TokenKind::Else => "'else'",
            TokenKind::Elseif => "'elseif'",
            TokenKind::End => "'end'",
            TokenKind::False => "'false'",
            TokenKind::For => "'for'",
            TokenKind::Function => "'function'",
            TokenKind::Goto => "'goto'",
            TokenKind::If => "'if'",
            TokenKind::In => "'in'",
            TokenKind::Local => "'local'",
            TokenKind::Nil => "'nil'",
            TokenKind::Not => "'not'",
            TokenKind::Or => "'or'",
            TokenKind::Repeat => "'repeat'",
            TokenKind::Return => "'return'",
            TokenKind::Then => "'then'",
            TokenKind::True => "'true'",
            TokenKind::Until => "'until'",
            TokenKind::While => "'while'",
            TokenKind::Fn => "'fn'",
            TokenKind::Fun => "'fun'",
            TokenKind::It => "'it'",
            TokenKind::Name => "name",
            TokenKind::Number => "number",
            TokenKind::String | TokenKind::LongString => "string",
            TokenKind::LambdaParam => "lambda parameter",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::DoubleSlash => "'//'",
            TokenKind::Percent => "'%'",
            TokenKind::Caret => "'^'",
            TokenKind::Hash => "'#'",
            TokenKind::Ampersand => "'&'",
            TokenKind::Tilde => "'~'",
            TokenKind::Pipe => "'|'",
            TokenKind::Shl => "'<<'",
            TokenKind::Shr => "'>>'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'~='",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Assign => "'='",
            TokenKind::DotDot => "'..'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::PlusAssign => "'+='",
            TokenKind::MinusAssign => "'-='",
            TokenKind::StarAssign => "'*='",
            TokenKind::SlashAssign => "'/='",
            TokenKind::DoubleSlashAssign => "'//='",
            TokenKind::PercentAssign => "'%='",
            TokenKind::CaretAssign => "'^='",
            TokenKind::DotDotAssign => "'..='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::DoubleColon => "'::'",
            TokenKind::Semicolon => "';'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}
