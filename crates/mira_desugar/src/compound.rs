//! Compound assignment (`+=`, `..=`, …) and step statements (`++`, `--`).
//!
//! `x += e`        → `x = x + e`
//! `t.f()[g()] += 1` →
//!
//! ```text
//! do
//!     local __mira_locvar_1 = t.f()
//!     local __mira_locvar_2 = g()
//!     __mira_locvar_1[__mira_locvar_2] = __mira_locvar_1[__mira_locvar_2] + 1
//! end
//! ```
//!
//! Everything but the last selector of a suffixed target is evaluated once
//! into a temporary, as is a non-constant index key.

use mira_syntax::cst::{BinOp, Expr, Name, PrefixExpr, Suffix};

use crate::translate::Translator;

/// The final selector of an assignment target.
enum Selector<'a> {
    Field(&'a Name),
    Key(&'a Expr),
    Temp(String),
}

impl Translator<'_> {
    /// `value` is `None` for `++`/`--`.
    pub(crate) fn compound_assign(
        &mut self,
        target: &PrefixExpr,
        op: BinOp,
        value: Option<&Expr>,
    ) {
        let (last, init) = match target.suffixes.split_last() {
            Some((Suffix::Field(name), init)) => (Selector::Field(name), init),
            Some((Suffix::Index(key, _), init)) => (Selector::Key(key), init),
            _ => {
                self.prefix_expr(target);
                self.w.write(" = ");
                self.prefix_expr(target);
                self.binary_op(op);
                self.operand(value);
                return;
            }
        };

        self.w.write("do");
        self.w.indent();

        let base = self.temp();
        self.w.newline();
        self.w.write("local ");
        self.w.write(&base);
        self.w.write(" = ");
        self.prefix_head(&target.head);
        self.suffixes(init);

        let selector = match last {
            Selector::Key(key) if !key.is_constant() => {
                let name = self.temp();
                self.w.newline();
                self.w.write("local ");
                self.w.write(&name);
                self.w.write(" = ");
                self.expr(key);
                Selector::Temp(name)
            }
            selector => selector,
        };

        self.w.newline();
        self.w.write(&base);
        self.selector(&selector);
        self.w.write(" = ");
        self.w.write(&base);
        self.selector(&selector);
        self.binary_op(op);
        self.operand(value);
        self.w.end();
    }

    fn selector(&mut self, selector: &Selector<'_>) {
        match selector {
            Selector::Field(name) => {
                self.w.write(".");
                self.w.write(&name.text);
            }
            Selector::Key(key) => {
                self.w.write("[");
                self.expr(key);
                self.w.write("]");
            }
            Selector::Temp(name) => {
                self.w.write("[");
                self.w.write(name);
                self.w.write("]");
            }
        }
    }

    /// Right operand of the read-modify-write; binary operands keep their
    /// grouping.
    fn operand(&mut self, value: Option<&Expr>) {
        match value {
            None => self.w.write("1"),
            Some(value @ Expr::Binary(_)) => {
                self.w.write("(");
                self.expr(value);
                self.w.write(")");
            }
            Some(value) => self.expr(value),
        }
    }
}
