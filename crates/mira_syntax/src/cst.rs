//! Concrete syntax tree for Mirana.
//!
//! One type per grammar production. The tree is produced by `mira_parser`
//! and only ever read by the translator; nothing rewrites it in place.

use serde::Serialize;

use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Name {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub block: Block,
    pub span: Span,
}

/// A plain statement block (function bodies, loops, `do`, `if` statements).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub stats: Vec<Stat>,
    pub ret: Option<ReturnStat>,
    pub span: Span,
}

/// A block whose trailing expressions form its value: lambda bodies and
/// if-expression branches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpBlock {
    pub stats: Vec<Stat>,
    pub tail: Option<BlockTail>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BlockTail {
    Return(ReturnStat),
    Values(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnStat {
    pub values: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stat {
    /// A lone `;`.
    Empty(Span),
    Assign(AssignStat),
    Local(LocalStat),
    CompoundAssign(CompoundAssignStat),
    Step(StepStat),
    /// A function or method call used as a statement.
    Call(PrefixExpr),
    Label(Name),
    Break(Span),
    Goto(Name),
    Do(Block),
    While(WhileStat),
    Repeat(RepeatStat),
    If(IfStat),
    NumericFor(NumericForStat),
    GenericFor(GenericForStat),
    Function(FunctionStat),
    LocalFunction(LocalFunctionStat),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignStat {
    pub targets: Vec<PrefixExpr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalStat {
    pub names: Vec<AttName>,
    pub values: Vec<Expr>,
    pub span: Span,
}

/// `name` or `name <attrib>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttName {
    pub name: Name,
    pub attrib: Option<Name>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompoundOp {
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
    Mod,
    Pow,
    Concat,
}

impl CompoundOp {
    /// The binary operator applied by the read-modify-write.
    pub fn binary(self) -> BinOp {
        match self {
            CompoundOp::Add => BinOp::Add,
            CompoundOp::Sub => BinOp::Sub,
            CompoundOp::Mul => BinOp::Mul,
            CompoundOp::Div => BinOp::Div,
            CompoundOp::IDiv => BinOp::IDiv,
            CompoundOp::Mod => BinOp::Mod,
            CompoundOp::Pow => BinOp::Pow,
            CompoundOp::Concat => BinOp::Concat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundAssignStat {
    pub target: PrefixExpr,
    pub op: CompoundOp,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StepOp {
    Increment,
    Decrement,
}

impl StepOp {
    pub fn binary(self) -> BinOp {
        match self {
            StepOp::Increment => BinOp::Add,
            StepOp::Decrement => BinOp::Sub,
        }
    }
}

/// `var++` / `var--`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepStat {
    pub target: PrefixExpr,
    pub op: StepOp,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhileStat {
    pub cond: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeatStat {
    pub body: Block,
    pub cond: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStat {
    pub branches: Vec<IfBranch<Block>>,
    pub else_block: Option<Block>,
    pub span: Span,
}

/// One `if`/`elseif` arm; `B` is [`Block`] for statements and [`ExpBlock`]
/// for if-expressions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfBranch<B> {
    pub predicate: Predicate,
    pub body: B,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Predicate {
    Expr(Expr),
    Declare(DeclaringPredicate),
}

impl Predicate {
    pub fn declaration(&self) -> Option<&DeclaringPredicate> {
        match self {
            Predicate::Declare(decl) => Some(decl),
            Predicate::Expr(_) => None,
        }
    }
}

/// `local name = value [; test]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclaringPredicate {
    pub name: Name,
    pub value: Expr,
    pub test: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericForStat {
    pub var: Name,
    pub start: Expr,
    pub limit: Expr,
    pub step: Option<Expr>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericForStat {
    pub names: Vec<Name>,
    pub exprs: Vec<Expr>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionStat {
    pub name: FuncName,
    pub body: FuncBody,
    pub span: Span,
}

/// `a.b.c` or `a.b:c`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncName {
    pub path: Vec<Name>,
    pub method: Option<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalFunctionStat {
    pub name: Name,
    pub body: FuncBody,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncBody {
    pub params: ParamList,
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParamList {
    pub names: Vec<Name>,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal),
    Table(TableConstructor),
    Function(FuncBody),
    Prefix(PrefixExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    If(Box<IfExpr>),
    BlockLambda(BlockLambda),
    ArrowLambda(ArrowLambda),
    ImplicitLambda(ImplicitLambda),
    OperatorSection(OperatorSection),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Table(e) => e.span,
            Expr::Function(e) => e.span,
            Expr::Prefix(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::If(e) => e.span,
            Expr::BlockLambda(e) => e.span,
            Expr::ArrowLambda(e) => e.span,
            Expr::ImplicitLambda(e) => e.span,
            Expr::OperatorSection(e) => e.span,
        }
    }

    /// True for `nil`, booleans, numbers and strings: values whose
    /// re-evaluation has no effect.
    pub fn is_constant(&self) -> bool {
        matches!(self, Expr::Literal(lit) if lit.kind != LiteralKind::Dots)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LiteralKind {
    Nil,
    True,
    False,
    Number,
    String,
    /// `...`
    Dots,
}

/// A literal copied verbatim from the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: String,
    pub span: Span,
}

/// A variable, call chain or parenthesised expression with its suffixes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrefixExpr {
    pub head: PrefixHead,
    pub suffixes: Vec<Suffix>,
    pub span: Span,
}

impl PrefixExpr {
    pub fn is_call(&self) -> bool {
        matches!(
            self.suffixes.last(),
            Some(Suffix::Call(_)) | Some(Suffix::Method(_, _))
        )
    }

    /// Whether the expression can appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        match self.suffixes.last() {
            None => matches!(self.head, PrefixHead::Name(_)),
            Some(suffix) => matches!(suffix, Suffix::Field(_) | Suffix::Index(_, _)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PrefixHead {
    Name(Name),
    Paren(Box<Expr>, Span),
    /// `$n`
    LambdaParam(LambdaParam),
    /// `it`
    It(Span),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LambdaParam {
    pub index: u32,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Suffix {
    /// `.name`
    Field(Name),
    /// `[exp]`
    Index(Box<Expr>, Span),
    Call(CallArgs),
    /// `:name args`
    Method(Name, CallArgs),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CallArgs {
    /// `(explist)` optionally followed by a trailing lambda.
    List {
        values: Vec<Expr>,
        trailing: Option<Box<Expr>>,
        span: Span,
    },
    Table(TableConstructor),
    String(Literal),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableConstructor {
    pub fields: Vec<Field>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Field {
    /// `[key] = value`
    Keyed { key: Expr, value: Expr },
    /// `name = value`
    Named { name: Name, value: Expr },
    Positional(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinOp {
    Or,
    And,
    Lt,
    Gt,
    Le,
    Ge,
    Ne,
    Eq,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
    Mod,
    Pow,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Or => "or",
            BinOp::And => "and",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Ne => "~=",
            BinOp::Eq => "==",
            BinOp::BitOr => "|",
            BinOp::BitXor => "~",
            BinOp::BitAnd => "&",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Concat => "..",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::IDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "^",
        }
    }

    /// Left and right binding power, following the Lua 5.4 reference manual.
    pub fn binding_power(self) -> (u8, u8) {
        match self {
            BinOp::Or => (1, 1),
            BinOp::And => (2, 2),
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge | BinOp::Ne | BinOp::Eq => (3, 3),
            BinOp::BitOr => (4, 4),
            BinOp::BitXor => (5, 5),
            BinOp::BitAnd => (6, 6),
            BinOp::Shl | BinOp::Shr => (7, 7),
            // right associative
            BinOp::Concat => (9, 8),
            BinOp::Add | BinOp::Sub => (10, 10),
            BinOp::Mul | BinOp::Div | BinOp::IDiv | BinOp::Mod => (11, 11),
            BinOp::Pow => (14, 13),
        }
    }
}

/// Binding power of prefix operators; sits between `*` and `^`.
pub const UNARY_PRIORITY: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnOp {
    Not,
    Neg,
    Len,
    BitNot,
}

impl UnOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnOp::Not => "not",
            UnOp::Neg => "-",
            UnOp::Len => "#",
            UnOp::BitNot => "~",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfExpr {
    pub branches: Vec<IfBranch<ExpBlock>>,
    pub else_block: Option<ExpBlock>,
    pub span: Span,
}

/// `fn(params) <expblock> end`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockLambda {
    pub params: ParamList,
    pub body: ExpBlock,
    pub span: Span,
}

/// `name => exp` or `fn(params) => exp`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrowLambda {
    pub params: ParamList,
    pub body: Box<Expr>,
    pub span: Span,
}

/// `fun <expblock> end`, parameters referenced as `$n` or `it`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplicitLambda {
    pub body: ExpBlock,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionOp {
    Unary(UnOp),
    Binary(BinOp),
    Step(StepOp),
}

/// A bare operator used as a function value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorSection {
    pub op: SectionOp,
    pub span: Span,
}
