//! Conditionals.
//!
//! An if-expression becomes a self-invoking function whose branches return
//! their values:
//!
//! ```text
//! x = if a then 1 else 2 end   →   x = (function()
//!                                      if a then
//!                                          return 1
//!                                      else
//!                                          return 2
//!                                      end
//!                                  end)()
//! ```
//!
//! A declaring predicate `local v = e [; test]` binds `v` in its own scope:
//! on the first branch the local precedes the `if`, on a later branch the
//! chain continues inside `else` with a nested `if`. Statement `if`s use the
//! same shape, wrapped in `do … end` when the first branch declares.

use mira_syntax::cst::{DeclaringPredicate, Expr, IfBranch, IfExpr, IfStat, Predicate, PrefixHead};

use crate::translate::Translator;

impl Translator<'_> {
    pub(crate) fn if_stat(&mut self, stat: &IfStat) {
        let scoped = stat
            .branches
            .first()
            .is_some_and(|b| b.predicate.declaration().is_some());
        if scoped {
            self.w.write("do");
            self.w.indent();
            self.w.newline();
        }
        self.if_chain(&stat.branches, stat.else_block.as_ref(), Self::block);
        if scoped {
            self.w.end();
        }
    }

    pub(crate) fn if_expr(&mut self, expr: &IfExpr) {
        self.w.write("(function()");
        self.w.indent();
        self.w.newline();
        self.if_chain(&expr.branches, expr.else_block.as_ref(), Self::exp_block);
        self.w.dedent();
        self.w.newline();
        self.w.write("end)()");
    }

    /// Branches from the current position up to and including every `end`
    /// the chain opened.
    fn if_chain<B>(
        &mut self,
        branches: &[IfBranch<B>],
        else_block: Option<&B>,
        emit: fn(&mut Self, &B),
    ) {
        let mut nested = 0;
        for (i, branch) in branches.iter().enumerate() {
            match (&branch.predicate, i) {
                (Predicate::Expr(cond), 0) => {
                    self.w.write("if ");
                    self.condition(cond);
                }
                (Predicate::Expr(cond), _) => {
                    self.w.newline();
                    self.w.write("elseif ");
                    self.condition(cond);
                }
                (Predicate::Declare(decl), 0) => self.declaring_if(decl),
                (Predicate::Declare(decl), _) => {
                    self.w.newline();
                    self.w.write("else");
                    self.w.indent();
                    self.w.newline();
                    nested += 1;
                    self.declaring_if(decl);
                }
            }
            self.w.write(" then");
            self.w.indent();
            emit(self, &branch.body);
            self.w.dedent();
        }

        if let Some(block) = else_block {
            self.w.newline();
            self.w.write("else");
            self.w.indent();
            emit(self, block);
            self.w.dedent();
        }

        self.w.newline();
        self.w.write("end");
        for _ in 0..nested {
            self.w.end();
        }
    }

    /// `local v = e` then `if <test or v>`.
    fn declaring_if(&mut self, decl: &DeclaringPredicate) {
        self.w.write("local ");
        self.w.write(&decl.name.text);
        self.w.write(" = ");
        self.expr(&decl.value);
        self.w.newline();
        self.w.write("if ");
        match &decl.test {
            Some(test) => self.condition(test),
            None => self.w.write(&decl.name.text),
        }
    }

    /// A condition that is wholly parenthesised loses its parentheses.
    fn condition(&mut self, cond: &Expr) {
        match cond {
            Expr::Prefix(p) if p.suffixes.is_empty() => match &p.head {
                PrefixHead::Paren(inner, _) => self.expr(inner),
                _ => self.prefix_expr(p),
            },
            cond => self.expr(cond),
        }
    }
}
