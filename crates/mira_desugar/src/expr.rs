//! Expression emission.

use mira_syntax::cst::{
    BinOp, CallArgs, Expr, Field, LiteralKind, ParamList, PrefixExpr, PrefixHead, Suffix,
    TableConstructor, UnOp,
};
use mira_syntax::ErrorCode;

use crate::translate::Translator;

impl Translator<'_> {
    pub(crate) fn expr_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.w.write(", ");
            }
            self.expr(expr);
        }
    }

    pub(crate) fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(lit) => self.w.write(&lit.text),
            Expr::Table(table) => self.table(table),
            Expr::Function(body) => {
                self.w.write("function");
                self.func_body(body);
            }
            Expr::Prefix(prefix) => self.prefix_expr(prefix),
            Expr::Binary(b) => {
                self.expr(&b.lhs);
                if b.op == BinOp::Concat && ends_with_number(&b.lhs) {
                    self.w.write(" .. ");
                } else {
                    self.binary_op(b.op);
                }
                self.expr(&b.rhs);
            }
            Expr::Unary(u) => {
                self.unary_op(u.op);
                if u.op == UnOp::Neg && starts_with_minus(&u.operand) {
                    self.w.write(" ");
                }
                self.expr(&u.operand);
            }
            Expr::If(e) => self.if_expr(e),
            Expr::BlockLambda(l) => self.block_lambda(l),
            Expr::ArrowLambda(l) => self.arrow_lambda(l),
            Expr::ImplicitLambda(l) => self.implicit_lambda(l),
            Expr::OperatorSection(s) => self.operator_section(s),
        }
    }

    pub(crate) fn binary_op(&mut self, op: BinOp) {
        match op {
            BinOp::Concat => self.w.write(".."),
            op => {
                self.w.write(" ");
                self.w.write(op.as_str());
                self.w.write(" ");
            }
        }
    }

    pub(crate) fn unary_op(&mut self, op: UnOp) {
        self.w.write(op.as_str());
        if op == UnOp::Not {
            self.w.write(" ");
        }
    }

    pub(crate) fn prefix_expr(&mut self, prefix: &PrefixExpr) {
        self.prefix_head(&prefix.head);
        self.suffixes(&prefix.suffixes);
    }

    pub(crate) fn prefix_head(&mut self, head: &PrefixHead) {
        match head {
            PrefixHead::Name(name) => self.w.write(&name.text),
            PrefixHead::Paren(inner, _) => {
                self.w.write("(");
                self.expr(inner);
                self.w.write(")");
            }
            PrefixHead::LambdaParam(param) => {
                if self.lambda_depth == 0 {
                    self.error(
                        ErrorCode::Lambda,
                        param.span,
                        "Cannot use lambda implicit parameter in a non-lambda environment",
                    );
                }
                self.w.write(&crate::lambda::param_name(param.index));
            }
            PrefixHead::It(span) => {
                if self.lambda_depth == 0 {
                    self.error(
                        ErrorCode::Lambda,
                        *span,
                        "Cannot use 'it' in a non fun lambda context",
                    );
                }
                self.w.write(crate::lambda::IT);
            }
        }
    }

    pub(crate) fn suffixes(&mut self, suffixes: &[Suffix]) {
        for suffix in suffixes {
            self.suffix(suffix);
        }
    }

    pub(crate) fn suffix(&mut self, suffix: &Suffix) {
        match suffix {
            Suffix::Field(name) => {
                self.w.write(".");
                self.w.write(&name.text);
            }
            Suffix::Index(key, _) => {
                self.w.write("[");
                self.expr(key);
                self.w.write("]");
            }
            Suffix::Call(args) => self.call_args(args),
            Suffix::Method(name, args) => {
                self.w.write(":");
                self.w.write(&name.text);
                self.call_args(args);
            }
        }
    }

    fn call_args(&mut self, args: &CallArgs) {
        match args {
            CallArgs::List {
                values, trailing, ..
            } => {
                self.w.write("(");
                self.expr_list(values);
                if let Some(lambda) = trailing {
                    if !values.is_empty() {
                        self.w.write(", ");
                    }
                    self.expr(lambda);
                }
                self.w.write(")");
            }
            CallArgs::Table(table) => {
                self.w.write(" ");
                self.table(table);
            }
            CallArgs::String(lit) => {
                self.w.write(" ");
                self.w.write(&lit.text);
            }
        }
    }

    fn table(&mut self, table: &TableConstructor) {
        match table.fields.as_slice() {
            [] => self.w.write("{}"),
            [field] => {
                self.w.write("{ ");
                self.field(field);
                self.w.write(" }");
            }
            fields => {
                self.w.write("{");
                self.w.indent();
                for field in fields {
                    self.w.newline();
                    self.field(field);
                    self.w.write(",");
                }
                self.w.dedent();
                self.w.newline();
                self.w.write("}");
            }
        }
    }

    fn field(&mut self, field: &Field) {
        match field {
            Field::Keyed { key, value } => {
                self.w.write("[");
                self.expr(key);
                self.w.write("] = ");
                self.expr(value);
            }
            Field::Named { name, value } => {
                self.w.write(&name.text);
                self.w.write(" = ");
                self.expr(value);
            }
            Field::Positional(value) => self.expr(value),
        }
    }

    pub(crate) fn param_list(&mut self, params: &ParamList) {
        self.w.write("(");
        for (i, name) in params.names.iter().enumerate() {
            if i > 0 {
                self.w.write(", ");
            }
            self.w.write(&name.text);
        }
        if params.variadic {
            if !params.names.is_empty() {
                self.w.write(", ");
            }
            self.w.write("...");
        }
        self.w.write(")");
    }
}

/// `- -x` must not print as the comment `--x`.
fn starts_with_minus(expr: &Expr) -> bool {
    match expr {
        Expr::Unary(u) => u.op == UnOp::Neg,
        Expr::Binary(b) => starts_with_minus(&b.lhs),
        _ => false,
    }
}

/// `1..x` would lex as a malformed number.
fn ends_with_number(expr: &Expr) -> bool {
    match expr {
        Expr::Literal(lit) => lit.kind == LiteralKind::Number,
        Expr::Binary(b) => ends_with_number(&b.rhs),
        Expr::Unary(u) => ends_with_number(&u.operand),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::lua;

    #[test]
    fn operators_spacing() {
        assert_eq!(
            lua("x = not a and -b or #c .. d ^ 2"),
            "x = not a and -b or #c..d ^ 2"
        );
    }

    #[test]
    fn double_negation_stays_apart() {
        assert_eq!(lua("x = - -y"), "x = - -y");
    }

    #[test]
    fn tables_by_field_count() {
        assert_eq!(lua("t = {}"), "t = {}");
        assert_eq!(lua("t = {1}"), "t = { 1 }");
        assert_eq!(
            lua("t = {1, x = 2; [k] = v}"),
            "t = {\n    1,\n    x = 2,\n    [k] = v,\n}"
        );
    }

    #[test]
    fn call_argument_forms() {
        assert_eq!(
            lua("f{1} g'a' h(1, 2) o:m(x).y[1]()"),
            "f { 1 }\ng 'a'\nh(1, 2)\no:m(x).y[1]()"
        );
    }

    #[test]
    fn literals_are_verbatim() {
        assert_eq!(
            lua("x = 0x1F + 1e3 .. [[long\nstring]] .. \"q\\n\""),
            "x = 0x1F + 1e3 .. [[long\nstring]]..\"q\\n\""
        );
    }

    #[test]
    fn parentheses_are_kept() {
        assert_eq!(lua("x = (a + b) * c"), "x = (a + b) * c");
    }
}
