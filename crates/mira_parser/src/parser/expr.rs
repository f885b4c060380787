//! Expressions, precedence climbing over [`BinOp::binding_power`].

use mira_lexer::{Token, TokenKind};
use mira_syntax::cst::*;

use super::{PResult, Parser};

/// Highest `$n`; a Lua function holds at most 200 locals.
const MAX_LAMBDA_PARAM: u32 = 200;

impl Parser<'_> {
    pub(super) fn expr(&mut self) -> PResult<Expr> {
        self.sub_expr(0)
    }

    pub(super) fn expr_list(&mut self) -> PResult<Vec<Expr>> {
        let mut exprs = vec![self.expr()?];
        while self.eat(TokenKind::Comma).is_some() {
            exprs.push(self.expr()?);
        }
        Ok(exprs)
    }

    fn sub_expr(&mut self, limit: u8) -> PResult<Expr> {
        let start = self.start();
        let lhs = match unary_op(self.peek()) {
            Some(op) if can_start_expr(self.peek_nth(1)) => {
                self.advance();
                let operand = self.sub_expr(UNARY_PRIORITY)?;
                Expr::Unary(UnaryExpr {
                    op,
                    operand: Box::new(operand),
                    span: self.span_from(start),
                })
            }
            _ => self.simple_expr()?,
        };
        self.binary_tail(lhs, limit)
    }

    /// Extend `lhs` with binary operators binding tighter than `limit`.
    pub(super) fn binary_tail(&mut self, mut lhs: Expr, limit: u8) -> PResult<Expr> {
        while let Some(op) = binary_op(self.peek()) {
            let (left, right) = op.binding_power();
            if left <= limit {
                break;
            }
            self.advance();
            let rhs = self.sub_expr(right)?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary(BinaryExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            });
        }
        Ok(lhs)
    }

    fn simple_expr(&mut self) -> PResult<Expr> {
        let token = self.current();
        let literal = match token.kind {
            TokenKind::Nil => Some(LiteralKind::Nil),
            TokenKind::True => Some(LiteralKind::True),
            TokenKind::False => Some(LiteralKind::False),
            TokenKind::Number => Some(LiteralKind::Number),
            TokenKind::String | TokenKind::LongString => Some(LiteralKind::String),
            TokenKind::Ellipsis => Some(LiteralKind::Dots),
            _ => None,
        };
        if let Some(kind) = literal {
            self.advance();
            return Ok(Expr::Literal(self.literal(kind, token)));
        }

        match token.kind {
            TokenKind::LBrace => Ok(Expr::Table(self.table()?)),
            TokenKind::Function => {
                self.advance();
                Ok(Expr::Function(self.func_body(token.span.start)?))
            }
            TokenKind::Fn => self.fn_lambda(),
            TokenKind::Fun => {
                self.advance();
                let body = self.exp_block()?;
                self.expect(TokenKind::End)?;
                Ok(Expr::ImplicitLambda(ImplicitLambda {
                    body,
                    span: self.span_from(token.span.start),
                }))
            }
            TokenKind::If => self.if_expr(),
            TokenKind::Name if self.peek_nth(1) == TokenKind::FatArrow => {
                let name = self.name()?;
                self.advance();
                let body = self.expr()?;
                Ok(Expr::ArrowLambda(ArrowLambda {
                    params: ParamList {
                        names: vec![name],
                        variadic: false,
                    },
                    body: Box::new(body),
                    span: self.span_from(token.span.start),
                }))
            }
            kind => match section_op(kind) {
                Some(op) => {
                    self.advance();
                    Ok(Expr::OperatorSection(OperatorSection {
                        op,
                        span: token.span,
                    }))
                }
                None => Ok(Expr::Prefix(self.prefix_expr()?)),
            },
        }
    }

    fn literal(&self, kind: LiteralKind, token: Token) -> Literal {
        Literal {
            kind,
            text: self.text(token).to_string(),
            span: token.span,
        }
    }

    /// `fn(params) => exp` or `fn(params) <expblock> end`.
    fn fn_lambda(&mut self) -> PResult<Expr> {
        let start = self.expect(TokenKind::Fn)?.span.start;
        let params = self.param_list()?;
        if self.eat(TokenKind::FatArrow).is_some() {
            let body = self.expr()?;
            return Ok(Expr::ArrowLambda(ArrowLambda {
                params,
                body: Box::new(body),
                span: self.span_from(start),
            }));
        }
        let body = self.exp_block()?;
        self.expect(TokenKind::End)?;
        Ok(Expr::BlockLambda(BlockLambda {
            params,
            body,
            span: self.span_from(start),
        }))
    }

    fn if_expr(&mut self) -> PResult<Expr> {
        let start = self.expect(TokenKind::If)?.span.start;
        let mut branches = vec![self.if_branch(start, Self::exp_block)?];
        while self.check(TokenKind::Elseif) {
            let branch_start = self.advance().span.start;
            branches.push(self.if_branch(branch_start, Self::exp_block)?);
        }
        let else_block = match self.eat(TokenKind::Else) {
            Some(_) => Some(self.exp_block()?),
            None => None,
        };
        self.expect(TokenKind::End)?;
        Ok(Expr::If(Box::new(IfExpr {
            branches,
            else_block,
            span: self.span_from(start),
        })))
    }

    pub(super) fn prefix_expr(&mut self) -> PResult<PrefixExpr> {
        let start = self.start();
        let token = self.current();
        let head = match token.kind {
            TokenKind::Name => PrefixHead::Name(self.name()?),
            TokenKind::LParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(TokenKind::RParen)?;
                PrefixHead::Paren(Box::new(inner), self.span_from(start))
            }
            TokenKind::LambdaParam => {
                self.advance();
                PrefixHead::LambdaParam(self.lambda_param(token)?)
            }
            TokenKind::It => {
                self.advance();
                PrefixHead::It(token.span)
            }
            _ => return Err(self.unexpected("expression")),
        };

        let mut suffixes = Vec::new();
        loop {
            let suffix = match self.peek() {
                TokenKind::Dot => {
                    self.advance();
                    Suffix::Field(self.name()?)
                }
                TokenKind::LBracket => {
                    let open = self.advance().span.start;
                    let key = self.expr()?;
                    self.expect(TokenKind::RBracket)?;
                    Suffix::Index(Box::new(key), self.span_from(open))
                }
                TokenKind::Colon => {
                    self.advance();
                    let method = self.name()?;
                    Suffix::Method(method, self.call_args()?)
                }
                TokenKind::LParen
                | TokenKind::LBrace
                | TokenKind::String
                | TokenKind::LongString => Suffix::Call(self.call_args()?),
                _ => break,
            };
            suffixes.push(suffix);
        }

        Ok(PrefixExpr {
            head,
            suffixes,
            span: self.span_from(start),
        })
    }

    fn lambda_param(&self, token: Token) -> PResult<LambdaParam> {
        let digits = &self.text(token)[1..];
        match digits.parse::<u32>() {
            Ok(0) => Err(self.invalid("lambda parameters are numbered from $1", token.span)),
            Ok(index) if index <= MAX_LAMBDA_PARAM => Ok(LambdaParam {
                index,
                span: token.span,
            }),
            _ => Err(self.invalid(
                format!("lambda parameter index is larger than ${MAX_LAMBDA_PARAM}"),
                token.span,
            )),
        }
    }

    fn call_args(&mut self) -> PResult<CallArgs> {
        let token = self.current();
        match token.kind {
            TokenKind::LParen => {
                self.advance();
                let values = if self.check(TokenKind::RParen) {
                    Vec::new()
                } else {
                    self.expr_list()?
                };
                self.expect(TokenKind::RParen)?;
                let trailing = match self.peek() {
                    TokenKind::Fn | TokenKind::Fun => Some(Box::new(self.simple_expr()?)),
                    _ => None,
                };
                Ok(CallArgs::List {
                    values,
                    trailing,
                    span: self.span_from(token.span.start),
                })
            }
            TokenKind::LBrace => Ok(CallArgs::Table(self.table()?)),
            TokenKind::String | TokenKind::LongString => {
                self.advance();
                Ok(CallArgs::String(self.literal(LiteralKind::String, token)))
            }
            _ => Err(self.unexpected("function arguments")),
        }
    }

    fn table(&mut self) -> PResult<TableConstructor> {
        let start = self.expect(TokenKind::LBrace)?.span.start;
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) {
            fields.push(self.field()?);
            if self.eat(TokenKind::Comma).is_none() && self.eat(TokenKind::Semicolon).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(TableConstructor {
            fields,
            span: self.span_from(start),
        })
    }

    fn field(&mut self) -> PResult<Field> {
        match self.peek() {
            TokenKind::LBracket => {
                self.advance();
                let key = self.expr()?;
                self.expect(TokenKind::RBracket)?;
                self.expect(TokenKind::Assign)?;
                let value = self.expr()?;
                Ok(Field::Keyed { key, value })
            }
            TokenKind::Name if self.peek_nth(1) == TokenKind::Assign => {
                let name = self.name()?;
                self.advance();
                let value = self.expr()?;
                Ok(Field::Named { name, value })
            }
            _ => Ok(Field::Positional(self.expr()?)),
        }
    }

    /// Parameters and body of `function` definitions; `start` is where the
    /// definition began.
    pub(super) fn func_body(&mut self, start: usize) -> PResult<FuncBody> {
        let params = self.param_list()?;
        let block = self.block()?;
        self.expect(TokenKind::End)?;
        Ok(FuncBody {
            params,
            block,
            span: self.span_from(start),
        })
    }

    fn param_list(&mut self) -> PResult<ParamList> {
        self.expect(TokenKind::LParen)?;
        let mut params = ParamList::default();
        if !self.check(TokenKind::RParen) {
            loop {
                if self.eat(TokenKind::Ellipsis).is_some() {
                    params.variadic = true;
                    break;
                }
                params.names.push(self.name()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }
}

pub(super) fn binary_op(kind: TokenKind) -> Option<BinOp> {
    Some(match kind {
        TokenKind::Or => BinOp::Or,
        TokenKind::And => BinOp::And,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::LtEq => BinOp::Le,
        TokenKind::GtEq => BinOp::Ge,
        TokenKind::NotEq => BinOp::Ne,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::Pipe => BinOp::BitOr,
        TokenKind::Tilde => BinOp::BitXor,
        TokenKind::Ampersand => BinOp::BitAnd,
        TokenKind::Shl => BinOp::Shl,
        TokenKind::Shr => BinOp::Shr,
        TokenKind::DotDot => BinOp::Concat,
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::DoubleSlash => BinOp::IDiv,
        TokenKind::Percent => BinOp::Mod,
        TokenKind::Caret => BinOp::Pow,
        _ => return None,
    })
}

fn unary_op(kind: TokenKind) -> Option<UnOp> {
    Some(match kind {
        TokenKind::Not => UnOp::Not,
        TokenKind::Minus => UnOp::Neg,
        TokenKind::Hash => UnOp::Len,
        TokenKind::Tilde => UnOp::BitNot,
        _ => return None,
    })
}

/// The function an operator denotes when it stands alone. Prefix operators
/// take precedence over their binary spelling (`-`, `~`).
fn section_op(kind: TokenKind) -> Option<SectionOp> {
    if let Some(op) = unary_op(kind) {
        return Some(SectionOp::Unary(op));
    }
    match kind {
        TokenKind::PlusPlus => Some(SectionOp::Step(StepOp::Increment)),
        TokenKind::MinusMinus => Some(SectionOp::Step(StepOp::Decrement)),
        kind => binary_op(kind).map(SectionOp::Binary),
    }
}

fn can_start_expr(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Name
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::LongString
            | TokenKind::Nil
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Ellipsis
            | TokenKind::LBrace
            | TokenKind::LParen
            | TokenKind::Function
            | TokenKind::Fn
            | TokenKind::Fun
            | TokenKind::If
            | TokenKind::Not
            | TokenKind::Minus
            | TokenKind::Hash
            | TokenKind::Tilde
            | TokenKind::LambdaParam
            | TokenKind::It
    )
}

#[cfg(test)]
mod tests {
    use crate::parse_chunk;
    use mira_syntax::cst::*;

    /// The value of `return <src>`.
    fn value(src: &str) -> Expr {
        let chunk = parse_chunk(&format!("return {src}")).expect("parses");
        chunk
            .block
            .ret
            .expect("return")
            .values
            .into_iter()
            .next()
            .expect("one value")
    }

    fn binary(expr: &Expr) -> (&Expr, BinOp, &Expr) {
        match expr {
            Expr::Binary(b) => (&b.lhs, b.op, &b.rhs),
            other => panic!("expected a binary expression, got {other:?}"),
        }
    }

    #[test]
    fn precedence_follows_lua() {
        let e = value("1 + 2 * 3");
        let (_, op, rhs) = binary(&e);
        assert_eq!(op, BinOp::Add);
        assert_eq!(binary(rhs).1, BinOp::Mul);

        let e = value("a or b and c");
        assert_eq!(binary(&e).1, BinOp::Or);
    }

    #[test]
    fn concat_and_pow_are_right_associative() {
        let e = value("a .. b .. c");
        let (lhs, _, rhs) = binary(&e);
        assert!(matches!(lhs, Expr::Prefix(_)));
        assert_eq!(binary(rhs).1, BinOp::Concat);

        let e = value("-x ^ 2");
        let Expr::Unary(u) = &e else {
            panic!("expected negation, got {e:?}");
        };
        assert_eq!(binary(&u.operand).1, BinOp::Pow);
    }

    #[test]
    fn lambdas() {
        assert!(matches!(value("x => x + 1"), Expr::ArrowLambda(l) if l.params.names.len() == 1));
        assert!(matches!(value("fn(a, b) => a"), Expr::ArrowLambda(l) if l.params.names.len() == 2));
        assert!(matches!(value("fn(a)\n local b = a\n b\n end"), Expr::BlockLambda(l)
            if l.body.stats.len() == 1 && matches!(l.body.tail, Some(BlockTail::Values(_)))));
        assert!(matches!(value("fun $1 + $2 end"), Expr::ImplicitLambda(_)));
    }

    #[test]
    fn lambda_parameters() {
        let e = value("fun $12 end");
        let Expr::ImplicitLambda(l) = e else {
            panic!("expected an implicit lambda");
        };
        let Some(BlockTail::Values(values)) = l.body.tail else {
            panic!("expected a value tail");
        };
        assert!(matches!(&values[0], Expr::Prefix(p)
            if matches!(p.head, PrefixHead::LambdaParam(LambdaParam { index: 12, .. }))));

        let err = parse_chunk("return fun $0 end").unwrap_err();
        assert_eq!(err.to_string(), "lambda parameters are numbered from $1");
    }

    #[test]
    fn lambda_parameter_index_is_bounded() {
        assert!(parse_chunk("return fun $200 end").is_ok());
        for src in ["g = fun $201 end", "g = fun $20000000 end", "g = fun $99999999999 end"] {
            let err = parse_chunk(src).unwrap_err();
            assert_eq!(err.to_string(), "lambda parameter index is larger than $200");
        }
    }

    #[test]
    fn trailing_lambda_is_attached_to_the_call() {
        let e = value("map(t) fun $1 * 2 end");
        let Expr::Prefix(p) = e else {
            panic!("expected a call");
        };
        assert!(matches!(&p.suffixes[0], Suffix::Call(CallArgs::List { values, trailing: Some(_), .. })
            if values.len() == 1));
    }

    #[test]
    fn operator_sections() {
        let e = value("f(+, -, not, ++, ..)");
        let Expr::Prefix(p) = e else {
            panic!("expected a call");
        };
        let Suffix::Call(CallArgs::List { values, .. }) = &p.suffixes[0] else {
            panic!("expected an argument list");
        };
        let ops: Vec<SectionOp> = values
            .iter()
            .map(|v| match v {
                Expr::OperatorSection(s) => s.op,
                other => panic!("expected a section, got {other:?}"),
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                SectionOp::Binary(BinOp::Add),
                SectionOp::Unary(UnOp::Neg),
                SectionOp::Unary(UnOp::Not),
                SectionOp::Step(StepOp::Increment),
                SectionOp::Binary(BinOp::Concat),
            ]
        );
    }

    #[test]
    fn if_expressions() {
        let e = value("if local v = f() then v elseif x then 1 else 2 end");
        let Expr::If(i) = e else {
            panic!("expected an if-expression");
        };
        assert_eq!(i.branches.len(), 2);
        assert!(i.branches[0].predicate.declaration().is_some());
        assert!(i.else_block.is_some());
    }

    #[test]
    fn if_closing_a_lambda_body_is_its_value() {
        let e = value("fn(x) if x then 1 else 2 end end");
        let Expr::BlockLambda(l) = e else {
            panic!("expected a block lambda");
        };
        assert!(l.body.stats.is_empty());
        assert!(matches!(&l.body.tail, Some(BlockTail::Values(v)) if matches!(v[0], Expr::If(_))));

        let e = value("fn(x) if x then print(x) end return 1 end");
        let Expr::BlockLambda(l) = e else {
            panic!("expected a block lambda");
        };
        assert!(matches!(l.body.stats[0], Stat::If(_)));
    }

    #[test]
    fn tables() {
        let Expr::Table(t) = value("{ 1, x = 2; [k] = 3, }") else {
            panic!("expected a table");
        };
        assert!(matches!(t.fields[0], Field::Positional(_)));
        assert!(matches!(t.fields[1], Field::Named { .. }));
        assert!(matches!(t.fields[2], Field::Keyed { .. }));
    }

    #[test]
    fn suffix_chains() {
        let Expr::Prefix(p) = value("a.b[c]:d(e) 'f' {g}") else {
            panic!("expected a prefix expression");
        };
        assert_eq!(p.suffixes.len(), 5);
        assert!(p.is_call());
        assert!(!p.is_assignable());
    }
}
