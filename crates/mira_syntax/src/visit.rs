//! Read-only traversal over the concrete syntax tree.
//!
//! Every `visit_*` method defaults to walking the node's children, so a
//! visitor only overrides the nodes it cares about. Overriding a method
//! without calling the matching `walk_*` function prunes that subtree.

use crate::cst::*;
use crate::span::Span;

pub trait Visit {
    fn visit_block(&mut self, node: &Block) {
        walk_block(self, node);
    }

    fn visit_exp_block(&mut self, node: &ExpBlock) {
        walk_exp_block(self, node);
    }

    fn visit_stat(&mut self, node: &Stat) {
        walk_stat(self, node);
    }

    fn visit_expr(&mut self, node: &Expr) {
        walk_expr(self, node);
    }

    fn visit_prefix_expr(&mut self, node: &PrefixExpr) {
        walk_prefix_expr(self, node);
    }

    fn visit_predicate(&mut self, node: &Predicate) {
        walk_predicate(self, node);
    }

    fn visit_func_body(&mut self, node: &FuncBody) {
        self.visit_block(&node.block);
    }

    fn visit_implicit_lambda(&mut self, node: &ImplicitLambda) {
        self.visit_exp_block(&node.body);
    }

    fn visit_lambda_param(&mut self, _node: &LambdaParam) {}

    fn visit_it(&mut self, _span: Span) {}
}

pub fn walk_block<V: Visit + ?Sized>(v: &mut V, node: &Block) {
    for stat in &node.stats {
        v.visit_stat(stat);
    }
    if let Some(ret) = &node.ret {
        walk_exprs(v, &ret.values);
    }
}

pub fn walk_exp_block<V: Visit + ?Sized>(v: &mut V, node: &ExpBlock) {
    for stat in &node.stats {
        v.visit_stat(stat);
    }
    match &node.tail {
        Some(BlockTail::Return(ret)) => walk_exprs(v, &ret.values),
        Some(BlockTail::Values(values)) => walk_exprs(v, values),
        None => {}
    }
}

fn walk_exprs<V: Visit + ?Sized>(v: &mut V, exprs: &[Expr]) {
    for expr in exprs {
        v.visit_expr(expr);
    }
}

pub fn walk_stat<V: Visit + ?Sized>(v: &mut V, node: &Stat) {
    match node {
        Stat::Empty(_) | Stat::Label(_) | Stat::Break(_) | Stat::Goto(_) => {}
        Stat::Assign(s) => {
            for target in &s.targets {
                v.visit_prefix_expr(target);
            }
            walk_exprs(v, &s.values);
        }
        Stat::Local(s) => walk_exprs(v, &s.values),
        Stat::CompoundAssign(s) => {
            v.visit_prefix_expr(&s.target);
            v.visit_expr(&s.value);
        }
        Stat::Step(s) => v.visit_prefix_expr(&s.target),
        Stat::Call(call) => v.visit_prefix_expr(call),
        Stat::Do(block) => v.visit_block(block),
        Stat::While(s) => {
            v.visit_expr(&s.cond);
            v.visit_block(&s.body);
        }
        Stat::Repeat(s) => {
            v.visit_block(&s.body);
            v.visit_expr(&s.cond);
        }
        Stat::If(s) => {
            for branch in &s.branches {
                v.visit_predicate(&branch.predicate);
                v.visit_block(&branch.body);
            }
            if let Some(block) = &s.else_block {
                v.visit_block(block);
            }
        }
        Stat::NumericFor(s) => {
            v.visit_expr(&s.start);
            v.visit_expr(&s.limit);
            if let Some(step) = &s.step {
                v.visit_expr(step);
            }
            v.visit_block(&s.body);
        }
        Stat::GenericFor(s) => {
            walk_exprs(v, &s.exprs);
            v.visit_block(&s.body);
        }
        Stat::Function(s) => v.visit_func_body(&s.body),
        Stat::LocalFunction(s) => v.visit_func_body(&s.body),
    }
}

pub fn walk_predicate<V: Visit + ?Sized>(v: &mut V, node: &Predicate) {
    match node {
        Predicate::Expr(e) => v.visit_expr(e),
        Predicate::Declare(decl) => {
            v.visit_expr(&decl.value);
            if let Some(test) = &decl.test {
                v.visit_expr(test);
            }
        }
    }
}

pub fn walk_expr<V: Visit + ?Sized>(v: &mut V, node: &Expr) {
    match node {
        Expr::Literal(_) | Expr::OperatorSection(_) => {}
        Expr::Table(t) => walk_table(v, t),
        Expr::Function(body) => v.visit_func_body(body),
        Expr::Prefix(p) => v.visit_prefix_expr(p),
        Expr::Binary(b) => {
            v.visit_expr(&b.lhs);
            v.visit_expr(&b.rhs);
        }
        Expr::Unary(u) => v.visit_expr(&u.operand),
        Expr::If(e) => {
            for branch in &e.branches {
                v.visit_predicate(&branch.predicate);
                v.visit_exp_block(&branch.body);
            }
            if let Some(block) = &e.else_block {
                v.visit_exp_block(block);
            }
        }
        Expr::BlockLambda(l) => v.visit_exp_block(&l.body),
        Expr::ArrowLambda(l) => v.visit_expr(&l.body),
        Expr::ImplicitLambda(l) => v.visit_implicit_lambda(l),
    }
}

pub fn walk_prefix_expr<V: Visit + ?Sized>(v: &mut V, node: &PrefixExpr) {
    match &node.head {
        PrefixHead::Name(_) => {}
        PrefixHead::Paren(inner, _) => v.visit_expr(inner),
        PrefixHead::LambdaParam(param) => v.visit_lambda_param(param),
        PrefixHead::It(span) => v.visit_it(*span),
    }
    for suffix in &node.suffixes {
        match suffix {
            Suffix::Field(_) => {}
            Suffix::Index(key, _) => v.visit_expr(key),
            Suffix::Call(args) | Suffix::Method(_, args) => walk_call_args(v, args),
        }
    }
}

pub fn walk_call_args<V: Visit + ?Sized>(v: &mut V, node: &CallArgs) {
    match node {
        CallArgs::List {
            values, trailing, ..
        } => {
            walk_exprs(v, values);
            if let Some(lambda) = trailing {
                v.visit_expr(lambda);
            }
        }
        CallArgs::Table(t) => walk_table(v, t),
        CallArgs::String(_) => {}
    }
}

pub fn walk_table<V: Visit + ?Sized>(v: &mut V, node: &TableConstructor) {
    for field in &node.fields {
        match field {
            Field::Keyed { key, value } => {
                v.visit_expr(key);
                v.visit_expr(value);
            }
            Field::Named { value, .. } | Field::Positional(value) => v.visit_expr(value),
        }
    }
}
