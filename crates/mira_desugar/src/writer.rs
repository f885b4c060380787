//! Indentation-aware text sink for generated Lua.

/// Accumulates output text and tracks the current indentation depth.
///
/// Lines are started explicitly with [`LuaWriter::newline`]; nothing is
/// written for the first line of the output, so a translation never starts
/// with a blank line.
#[derive(Debug, Clone)]
pub struct LuaWriter {
    out: String,
    depth: usize,
    unit: String,
}

impl LuaWriter {
    pub fn new(indent_width: usize) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            unit: " ".repeat(indent_width),
        }
    }

    pub fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Start a new line at the current depth.
    pub fn newline(&mut self) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        for _ in 0..self.depth {
            self.out.push_str(&self.unit);
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Close the innermost block: `end` on its own line, one level out.
    pub fn end(&mut self) {
        self.dedent();
        self.newline();
        self.write("end");
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_has_no_leading_newline() {
        let mut w = LuaWriter::new(4);
        w.newline();
        w.write("do");
        w.indent();
        w.newline();
        w.write("x()");
        w.end();
        assert_eq!(w.finish(), "do\n    x()\nend");
    }

    #[test]
    fn indent_width_is_configurable() {
        let mut w = LuaWriter::new(2);
        w.write("a");
        w.indent();
        w.indent();
        w.newline();
        w.write("b");
        assert_eq!(w.finish(), "a\n    b");
    }
}
