//! Translator state and statement emission.

use mira_syntax::cst::{
    Block, BlockTail, Chunk, ExpBlock, Expr, FuncBody, GenericForStat, LocalStat, NumericForStat,
    Stat,
};
use mira_syntax::{Diagnostic, ErrorCode, LineIndex, Span};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::writer::LuaWriter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    /// Spaces per indentation level.
    pub indent_width: usize,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}

/// Translate a parsed chunk to Lua.
///
/// `source` is the text the chunk was parsed from; diagnostics are
/// positioned against it. Every diagnostic of the chunk is collected before
/// returning, and no text is returned if there is any.
pub fn translate_chunk(
    chunk: &Chunk,
    source: &str,
    options: &TranslateOptions,
) -> Result<String, Vec<Diagnostic>> {
    let mut translator = Translator::new(source, options);
    translator.block(&chunk.block);
    debug!(
        temporaries = translator.temps,
        errors = translator.diagnostics.len(),
        "translated chunk"
    );
    translator.finish()
}

/// One-pass emitter. Owned by a single compile unit.
pub(crate) struct Translator<'src> {
    pub(crate) w: LuaWriter,
    source: &'src str,
    lines: LineIndex,
    temps: usize,
    /// Number of enclosing `fun` lambdas.
    pub(crate) lambda_depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Translator<'src> {
    pub(crate) fn new(source: &'src str, options: &TranslateOptions) -> Self {
        Self {
            w: LuaWriter::new(options.indent_width),
            source,
            lines: LineIndex::new(source),
            temps: 0,
            lambda_depth: 0,
            diagnostics: Vec::new(),
        }
    }

    fn finish(self) -> Result<String, Vec<Diagnostic>> {
        if self.diagnostics.is_empty() {
            Ok(self.w.finish())
        } else {
            Err(self.diagnostics)
        }
    }

    pub(crate) fn error(&mut self, code: ErrorCode, span: Span, message: impl Into<String>) {
        let position = self.lines.position(self.source, span.start);
        self.diagnostics.push(Diagnostic::error(code, position, message));
    }

    /// A fresh `__mira_locvar_<n>` name.
    pub(crate) fn temp(&mut self) -> String {
        self.temps += 1;
        format!("__mira_locvar_{}", self.temps)
    }

    // ============ Blocks ============

    pub(crate) fn block(&mut self, block: &Block) {
        for stat in &block.stats {
            self.stat(stat);
        }
        if let Some(ret) = &block.ret {
            self.return_values(&ret.values);
        }
    }

    /// Indented block followed by `end`.
    pub(crate) fn body(&mut self, block: &Block) {
        self.w.indent();
        self.block(block);
        self.w.end();
    }

    /// Body of a lambda or if-expression branch. Trailing values become a
    /// `return`; without them a final bare call is returned instead.
    pub(crate) fn exp_block(&mut self, block: &ExpBlock) {
        let (init, returned_call) = match (&block.tail, block.stats.split_last()) {
            (None, Some((Stat::Call(call), init))) => (init, Some(call)),
            _ => (&block.stats[..], None),
        };
        for stat in init {
            self.stat(stat);
        }
        if let Some(call) = returned_call {
            self.w.newline();
            self.w.write("return ");
            self.prefix_expr(call);
        }
        match &block.tail {
            Some(BlockTail::Return(ret)) => self.return_values(&ret.values),
            Some(BlockTail::Values(values)) => self.return_values(values),
            None => {}
        }
    }

    pub(crate) fn exp_body(&mut self, block: &ExpBlock) {
        self.w.indent();
        self.exp_block(block);
        self.w.end();
    }

    fn return_values(&mut self, values: &[Expr]) {
        self.w.newline();
        self.w.write("return");
        if !values.is_empty() {
            self.w.write(" ");
            self.expr_list(values);
        }
    }

    // ============ Statements ============

    pub(crate) fn stat(&mut self, stat: &Stat) {
        if let Stat::Empty(_) = stat {
            return;
        }
        self.w.newline();
        match stat {
            Stat::Empty(_) => {}
            Stat::Assign(s) => {
                for (i, target) in s.targets.iter().enumerate() {
                    if i > 0 {
                        self.w.write(", ");
                    }
                    self.prefix_expr(target);
                }
                self.w.write(" = ");
                self.expr_list(&s.values);
            }
            Stat::Local(s) => self.local_stat(s),
            Stat::CompoundAssign(s) => {
                self.compound_assign(&s.target, s.op.binary(), Some(&s.value))
            }
            Stat::Step(s) => self.compound_assign(&s.target, s.op.binary(), None),
            Stat::Call(call) => self.prefix_expr(call),
            Stat::Label(name) => {
                self.w.write("::");
                self.w.write(&name.text);
                self.w.write("::");
            }
            Stat::Break(_) => self.w.write("break"),
            Stat::Goto(name) => {
                self.w.write("goto ");
                self.w.write(&name.text);
            }
            Stat::Do(block) => {
                self.w.write("do");
                self.body(block);
            }
            Stat::While(s) => {
                self.w.write("while ");
                self.expr(&s.cond);
                self.w.write(" do");
                self.body(&s.body);
            }
            Stat::Repeat(s) => {
                self.w.write("repeat");
                self.w.indent();
                self.block(&s.body);
                self.w.dedent();
                self.w.newline();
                self.w.write("until ");
                self.expr(&s.cond);
            }
            Stat::If(s) => self.if_stat(s),
            Stat::NumericFor(s) => self.numeric_for(s),
            Stat::GenericFor(s) => self.generic_for(s),
            Stat::Function(s) => {
                self.w.write("function ");
                for (i, part) in s.name.path.iter().enumerate() {
                    if i > 0 {
                        self.w.write(".");
                    }
                    self.w.write(&part.text);
                }
                if let Some(method) = &s.name.method {
                    self.w.write(":");
                    self.w.write(&method.text);
                }
                self.func_body(&s.body);
            }
            Stat::LocalFunction(s) => {
                self.w.write("local function ");
                self.w.write(&s.name.text);
                self.func_body(&s.body);
            }
        }
    }

    fn local_stat(&mut self, s: &LocalStat) {
        self.w.write("local ");
        for (i, att) in s.names.iter().enumerate() {
            if i > 0 {
                self.w.write(", ");
            }
            self.w.write(&att.name.text);
            if let Some(attrib) = &att.attrib {
                self.w.write(" <");
                self.w.write(&attrib.text);
                self.w.write(">");
            }
        }
        if !s.values.is_empty() {
            self.w.write(" = ");
            self.expr_list(&s.values);
        }
    }

    fn numeric_for(&mut self, s: &NumericForStat) {
        self.w.write("for ");
        self.w.write(&s.var.text);
        self.w.write(" = ");
        self.expr(&s.start);
        self.w.write(", ");
        self.expr(&s.limit);
        if let Some(step) = &s.step {
            self.w.write(", ");
            self.expr(step);
        }
        self.w.write(" do");
        self.body(&s.body);
    }

    fn generic_for(&mut self, s: &GenericForStat) {
        self.w.write("for ");
        for (i, name) in s.names.iter().enumerate() {
            if i > 0 {
                self.w.write(", ");
            }
            self.w.write(&name.text);
        }
        self.w.write(" in ");
        self.expr_list(&s.exprs);
        self.w.write(" do");
        self.body(&s.body);
    }

    /// `(params)` followed by the indented body and `end`.
    pub(crate) fn func_body(&mut self, body: &FuncBody) {
        self.param_list(&body.params);
        self.body(&body.block);
    }
}
