//! Statements.

use mira_lexer::TokenKind;
use mira_syntax::cst::*;

use super::{Item, PResult, Parser};

impl Parser<'_> {
    pub(super) fn statement(&mut self) -> PResult<Stat> {
        let start = self.start();
        match self.peek() {
            TokenKind::Semicolon => Ok(Stat::Empty(self.advance().span)),
            TokenKind::DoubleColon => {
                self.advance();
                let label = self.name()?;
                self.expect(TokenKind::DoubleColon)?;
                Ok(Stat::Label(label))
            }
            TokenKind::Break => Ok(Stat::Break(self.advance().span)),
            TokenKind::Goto => {
                self.advance();
                Ok(Stat::Goto(self.name()?))
            }
            TokenKind::Do => {
                self.advance();
                let block = self.block()?;
                self.expect(TokenKind::End)?;
                Ok(Stat::Do(block))
            }
            TokenKind::While => {
                self.advance();
                let cond = self.expr()?;
                self.expect(TokenKind::Do)?;
                let body = self.block()?;
                self.expect(TokenKind::End)?;
                Ok(Stat::While(WhileStat {
                    cond,
                    body,
                    span: self.span_from(start),
                }))
            }
            TokenKind::Repeat => {
                self.advance();
                let body = self.block()?;
                self.expect(TokenKind::Until)?;
                let cond = self.expr()?;
                Ok(Stat::Repeat(RepeatStat {
                    body,
                    cond,
                    span: self.span_from(start),
                }))
            }
            TokenKind::If => self.if_stat(),
            TokenKind::For => self.for_stat(),
            TokenKind::Function => self.function_stat(),
            TokenKind::Local if self.peek_nth(1) == TokenKind::Function => {
                self.advance();
                self.advance();
                let name = self.name()?;
                let body = self.func_body(start)?;
                Ok(Stat::LocalFunction(LocalFunctionStat {
                    name,
                    body,
                    span: self.span_from(start),
                }))
            }
            TokenKind::Local => self.local_stat(),
            _ => match self.expr_statement(false)? {
                Item::Stat(stat) => Ok(stat),
                Item::Values(_) => Err(self.invalid("expected a statement", self.span_from(start))),
            },
        }
    }

    /// One item of an expression block: a statement, or the trailing values.
    pub(super) fn exp_block_item(&mut self) -> PResult<Item> {
        match self.peek() {
            // An `if` that closes the block is its value.
            TokenKind::If => {
                let mark = self.pos;
                if let Ok(values) = self.expr_list() {
                    self.eat(TokenKind::Semicolon);
                    if self.block_follow() {
                        return Ok(Item::Values(values));
                    }
                }
                self.pos = mark;
                Ok(Item::Stat(self.if_stat()?))
            }
            TokenKind::Name if self.peek_nth(1) == TokenKind::FatArrow => {
                Ok(Item::Values(self.expr_list()?))
            }
            TokenKind::Name | TokenKind::LParen | TokenKind::LambdaParam | TokenKind::It => {
                self.expr_statement(true)
            }
            TokenKind::Function if self.peek_nth(1) != TokenKind::Name => {
                Ok(Item::Values(self.expr_list()?))
            }
            TokenKind::Semicolon
            | TokenKind::DoubleColon
            | TokenKind::Break
            | TokenKind::Goto
            | TokenKind::Do
            | TokenKind::While
            | TokenKind::Repeat
            | TokenKind::For
            | TokenKind::Function
            | TokenKind::Local => Ok(Item::Stat(self.statement()?)),
            _ => Ok(Item::Values(self.expr_list()?)),
        }
    }

    /// A statement starting with a prefix expression: assignment, compound
    /// assignment, step or call. Inside expression blocks anything else is
    /// the start of the trailing values.
    fn expr_statement(&mut self, in_exp_block: bool) -> PResult<Item> {
        let start = self.start();
        let target = self.prefix_expr()?;

        if let Some(op) = compound_op(self.peek()) {
            self.advance();
            let target = self.assign_target(Expr::Prefix(target))?;
            let value = self.expr()?;
            return Ok(Item::Stat(Stat::CompoundAssign(CompoundAssignStat {
                target,
                op,
                value,
                span: self.span_from(start),
            })));
        }

        match self.peek() {
            TokenKind::Assign | TokenKind::Comma => {
                let mut exprs = vec![Expr::Prefix(target)];
                while self.eat(TokenKind::Comma).is_some() {
                    exprs.push(self.expr()?);
                }
                if self.eat(TokenKind::Assign).is_none() {
                    return if in_exp_block {
                        Ok(Item::Values(exprs))
                    } else {
                        Err(self.unexpected("'='"))
                    };
                }
                let targets = exprs
                    .into_iter()
                    .map(|e| self.assign_target(e))
                    .collect::<PResult<Vec<_>>>()?;
                let values = self.expr_list()?;
                Ok(Item::Stat(Stat::Assign(AssignStat {
                    targets,
                    values,
                    span: self.span_from(start),
                })))
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = match self.advance().kind {
                    TokenKind::PlusPlus => StepOp::Increment,
                    _ => StepOp::Decrement,
                };
                let target = self.assign_target(Expr::Prefix(target))?;
                Ok(Item::Stat(Stat::Step(StepStat {
                    target,
                    op,
                    span: self.span_from(start),
                })))
            }
            kind if in_exp_block && (!target.is_call() || super::expr::binary_op(kind).is_some()) => {
                let first = self.binary_tail(Expr::Prefix(target), 0)?;
                let mut values = vec![first];
                while self.eat(TokenKind::Comma).is_some() {
                    values.push(self.expr()?);
                }
                Ok(Item::Values(values))
            }
            _ if target.is_call() => Ok(Item::Stat(Stat::Call(target))),
            _ => Err(self.unexpected("'='")),
        }
    }

    fn assign_target(&self, expr: Expr) -> PResult<PrefixExpr> {
        match expr {
            Expr::Prefix(prefix) if prefix.is_assignable() => Ok(prefix),
            other => Err(self.invalid("cannot assign to this expression", other.span())),
        }
    }

    fn local_stat(&mut self) -> PResult<Stat> {
        let start = self.expect(TokenKind::Local)?.span.start;
        let mut names = Vec::new();
        loop {
            let name = self.name()?;
            let attrib = if self.eat(TokenKind::Lt).is_some() {
                let attrib = self.name()?;
                self.expect(TokenKind::Gt)?;
                Some(attrib)
            } else {
                None
            };
            names.push(AttName { name, attrib });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        let values = if self.eat(TokenKind::Assign).is_some() {
            self.expr_list()?
        } else {
            Vec::new()
        };
        Ok(Stat::Local(LocalStat {
            names,
            values,
            span: self.span_from(start),
        }))
    }

    fn if_stat(&mut self) -> PResult<Stat> {
        let start = self.expect(TokenKind::If)?.span.start;
        let mut branches = vec![self.if_branch(start, Self::block)?];
        while self.check(TokenKind::Elseif) {
            let branch_start = self.advance().span.start;
            branches.push(self.if_branch(branch_start, Self::block)?);
        }
        let else_block = match self.eat(TokenKind::Else) {
            Some(_) => Some(self.block()?),
            None => None,
        };
        self.expect(TokenKind::End)?;
        Ok(Stat::If(IfStat {
            branches,
            else_block,
            span: self.span_from(start),
        }))
    }

    /// `predicate then body`, shared by `if` statements and expressions.
    pub(super) fn if_branch<B>(
        &mut self,
        start: usize,
        body: fn(&mut Self) -> PResult<B>,
    ) -> PResult<IfBranch<B>> {
        let predicate = self.predicate()?;
        self.expect(TokenKind::Then)?;
        let body = body(self)?;
        Ok(IfBranch {
            predicate,
            body,
            span: self.span_from(start),
        })
    }

    fn predicate(&mut self) -> PResult<Predicate> {
        let Some(local) = self.eat(TokenKind::Local) else {
            return Ok(Predicate::Expr(self.expr()?));
        };
        let name = self.name()?;
        self.expect(TokenKind::Assign)?;
        let value = self.expr()?;
        let test = match self.eat(TokenKind::Semicolon) {
            Some(_) => Some(self.expr()?),
            None => None,
        };
        Ok(Predicate::Declare(DeclaringPredicate {
            name,
            value,
            test,
            span: self.span_from(local.span.start),
        }))
    }

    fn for_stat(&mut self) -> PResult<Stat> {
        let start = self.expect(TokenKind::For)?.span.start;
        let first = self.name()?;

        if self.eat(TokenKind::Assign).is_some() {
            let init = self.expr()?;
            self.expect(TokenKind::Comma)?;
            let limit = self.expr()?;
            let step = match self.eat(TokenKind::Comma) {
                Some(_) => Some(self.expr()?),
                None => None,
            };
            let body = self.loop_body()?;
            return Ok(Stat::NumericFor(NumericForStat {
                var: first,
                start: init,
                limit,
                step,
                body,
                span: self.span_from(start),
            }));
        }

        let mut names = vec![first];
        while self.eat(TokenKind::Comma).is_some() {
            names.push(self.name()?);
        }
        self.expect(TokenKind::In)?;
        let exprs = self.expr_list()?;
        let body = self.loop_body()?;
        Ok(Stat::GenericFor(GenericForStat {
            names,
            exprs,
            body,
            span: self.span_from(start),
        }))
    }

    fn loop_body(&mut self) -> PResult<Block> {
        self.expect(TokenKind::Do)?;
        let body = self.block()?;
        self.expect(TokenKind::End)?;
        Ok(body)
    }

    fn function_stat(&mut self) -> PResult<Stat> {
        let start = self.expect(TokenKind::Function)?.span.start;
        let mut path = vec![self.name()?];
        while self.eat(TokenKind::Dot).is_some() {
            path.push(self.name()?);
        }
        let method = match self.eat(TokenKind::Colon) {
            Some(_) => Some(self.name()?),
            None => None,
        };
        let body = self.func_body(start)?;
        Ok(Stat::Function(FunctionStat {
            name: FuncName { path, method },
            body,
            span: self.span_from(start),
        }))
    }
}

fn compound_op(kind: TokenKind) -> Option<CompoundOp> {
    Some(match kind {
        TokenKind::PlusAssign => CompoundOp::Add,
        TokenKind::MinusAssign => CompoundOp::Sub,
        TokenKind::StarAssign => CompoundOp::Mul,
        TokenKind::SlashAssign => CompoundOp::Div,
        TokenKind::DoubleSlashAssign => CompoundOp::IDiv,
        TokenKind::PercentAssign => CompoundOp::Mod,
        TokenKind::CaretAssign => CompoundOp::Pow,
        TokenKind::DotDotAssign => CompoundOp::Concat,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use crate::parse_chunk;
    use mira_syntax::cst::*;

    fn stats(src: &str) -> Vec<Stat> {
        parse_chunk(src).expect("parses").block.stats
    }

    #[test]
    fn assignment_and_locals() {
        let s = stats("local a <const>, b = 1, 2\na, t.x = b, 3");
        assert!(matches!(&s[0], Stat::Local(l) if l.names.len() == 2
            && l.names[0].attrib.as_ref().is_some_and(|a| a.text == "const")));
        assert!(matches!(&s[1], Stat::Assign(a) if a.targets.len() == 2 && a.values.len() == 2));
    }

    #[test]
    fn compound_and_step_statements() {
        let s = stats("x += 1\nt[i] ..= 's'\nn++\nt.k--\n");
        assert!(matches!(&s[0], Stat::CompoundAssign(c) if c.op == CompoundOp::Add));
        assert!(matches!(&s[1], Stat::CompoundAssign(c) if c.op == CompoundOp::Concat));
        assert!(matches!(&s[2], Stat::Step(st) if st.op == StepOp::Increment));
        assert!(matches!(&s[3], Stat::Step(st) if st.op == StepOp::Decrement));
    }

    #[test]
    fn control_flow() {
        let s = stats(
            "while x do break end\nrepeat x = x - 1 until x < 0\nfor i = 1, 10, 2 do end\n\
             for k, v in pairs(t) do end\ndo ::top:: goto top end",
        );
        assert!(matches!(s[0], Stat::While(_)));
        assert!(matches!(s[1], Stat::Repeat(_)));
        assert!(matches!(&s[2], Stat::NumericFor(f) if f.step.is_some()));
        assert!(matches!(&s[3], Stat::GenericFor(f) if f.names.len() == 2));
        assert!(matches!(&s[4], Stat::Do(b) if b.stats.len() == 2));
    }

    #[test]
    fn functions() {
        let s = stats("function a.b:c(x, ...) return x end\nlocal function f() end");
        match &s[0] {
            Stat::Function(f) => {
                assert_eq!(f.name.path.len(), 2);
                assert_eq!(f.name.method.as_ref().map(|m| m.text.as_str()), Some("c"));
                assert!(f.body.params.variadic);
                assert!(f.body.block.ret.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(s[1], Stat::LocalFunction(_)));
    }

    #[test]
    fn declaring_predicates() {
        let s = stats("if local v = f(); v > 1 then elseif local w = g() then else end");
        let Stat::If(stat) = &s[0] else {
            panic!("expected an if statement");
        };
        let first = stat.branches[0].predicate.declaration().expect("declaring");
        assert_eq!(first.name.text, "v");
        assert!(first.test.is_some());
        let second = stat.branches[1].predicate.declaration().expect("declaring");
        assert!(second.test.is_none());
        assert!(stat.else_block.is_some());
    }

    fn lambda_body(src: &str) -> ExpBlock {
        match stats(src).remove(0) {
            Stat::Assign(mut a) => match a.values.remove(0) {
                Expr::BlockLambda(l) => l.body,
                other => panic!("expected a block lambda, got {other:?}"),
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn if_followed_by_semicolon_and_more_statements() {
        let body = lambda_body("f = fn()\n if a then x = 1 end; print(x)\nend");
        assert!(matches!(body.stats[0], Stat::If(_)));
        assert!(matches!(body.stats[1], Stat::Call(_)));
        assert!(body.tail.is_none());

        let body = lambda_body("f = fn() if a then 1 else 2 end; end");
        assert!(body.stats.is_empty());
        assert!(matches!(&body.tail, Some(BlockTail::Values(v)) if matches!(v[0], Expr::If(_))));
    }

    #[test]
    fn call_statements() {
        let s = stats("print 'x'\nobj:method{1}\nf(a)(b)");
        assert!(s.iter().all(|s| matches!(s, Stat::Call(_))));
    }

    #[test]
    fn rejects_invalid_targets() {
        let err = crate::parse_chunk("f() = 1").unwrap_err();
        assert_eq!(err.to_string(), "cannot assign to this expression");
        let err = crate::parse_chunk("x").unwrap_err();
        assert_eq!(err.to_string(), "expected '=' near end of file");
    }
}
