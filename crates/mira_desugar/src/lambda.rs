//! Lambda forms.
//!
//! - `fn(a, b) <block> end`   → `function(a, b) <block> end`
//! - `x => e`, `fn(x) => e`   → `function(x) return e end`
//! - `fun <block> end`        → `function(__mira_lpar_1, _, __mira_lpar_3) <block> end`
//!
//! A `fun` lambda names its parameters `$1`, `$2`, … or `it`. Its parameter
//! list is recovered by scanning the body; nested `fun` lambdas have their
//! own parameters and are not scanned.

use std::collections::BTreeSet;

use mira_syntax::cst::{ArrowLambda, BlockLambda, ImplicitLambda, LambdaParam};
use mira_syntax::visit::Visit;
use mira_syntax::{ErrorCode, Span};

use crate::translate::Translator;

/// The single implicit parameter of a `fun` lambda.
pub const IT: &str = "it";

/// Name bound to the unused positions of an implicit parameter list.
pub const DISCARD: &str = "_";

pub fn param_name(index: u32) -> String {
    format!("__mira_lpar_{index}")
}

/// Placeholders referenced by one `fun` lambda body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlaceholderScan {
    pub indices: BTreeSet<u32>,
    pub uses_it: bool,
}

impl PlaceholderScan {
    pub fn of(lambda: &ImplicitLambda) -> Self {
        let mut scan = Self::default();
        scan.visit_exp_block(&lambda.body);
        scan
    }

    pub fn is_conflicting(&self) -> bool {
        self.uses_it && !self.indices.is_empty()
    }

    /// `it`, nothing, or every position up to the highest `$n`.
    pub fn params(&self) -> Vec<String> {
        match self.indices.last() {
            None if self.uses_it => vec![IT.to_string()],
            None => Vec::new(),
            Some(&max) => (1..=max)
                .map(|i| {
                    if self.indices.contains(&i) {
                        param_name(i)
                    } else {
                        DISCARD.to_string()
                    }
                })
                .collect(),
        }
    }
}

impl Visit for PlaceholderScan {
    fn visit_implicit_lambda(&mut self, _: &ImplicitLambda) {}

    fn visit_lambda_param(&mut self, param: &LambdaParam) {
        self.indices.insert(param.index);
    }

    fn visit_it(&mut self, _: Span) {
        self.uses_it = true;
    }
}

impl Translator<'_> {
    pub(crate) fn block_lambda(&mut self, lambda: &BlockLambda) {
        self.w.write("function");
        self.param_list(&lambda.params);
        self.exp_body(&lambda.body);
    }

    pub(crate) fn arrow_lambda(&mut self, lambda: &ArrowLambda) {
        self.w.write("function");
        self.param_list(&lambda.params);
        self.w.write(" return ");
        self.expr(&lambda.body);
        self.w.write(" end");
    }

    pub(crate) fn implicit_lambda(&mut self, lambda: &ImplicitLambda) {
        let scan = PlaceholderScan::of(lambda);
        if scan.is_conflicting() {
            self.error(
                ErrorCode::Lambda,
                lambda.span,
                "Cannot use both numbered lambda parameter and 'it' in fun lambda",
            );
            return;
        }

        self.w.write("function(");
        self.w.write(&scan.params().join(", "));
        self.w.write(")");
        self.lambda_depth += 1;
        self.exp_body(&lambda.body);
        self.lambda_depth -= 1;
    }
}
