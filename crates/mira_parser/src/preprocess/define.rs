//! `#define` lines and the macro table they build.

use mira_syntax::{is_ident_char, Diagnostic, ErrorCode, Position};

use super::fragment::{self, Fragment};

/// One function-like macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    pub name: String,
    pub params: Vec<String>,
    pub variadic: bool,
    fragments: Vec<Fragment>,
}

impl MacroDef {
    /// Compile a definition. `text` is the substitution text as written.
    pub fn new(name: impl Into<String>, params: Vec<String>, variadic: bool, text: &str) -> Self {
        let template = pad(text);
        let fragments = fragment::compile(&template, &params, variadic);
        Self {
            name: name.into(),
            params,
            variadic,
            fragments,
        }
    }

    /// Same name, same parameter count and same variadic flag.
    pub fn conflicts_with(&self, other: &MacroDef) -> bool {
        self.name == other.name
            && self.params.len() == other.params.len()
            && self.variadic == other.variadic
    }

    pub fn render(&self, args: &[String]) -> String {
        fragment::render(&self.fragments, args, self.params.len())
    }
}

/// Trim the substitution text and keep it from fusing with neighbouring
/// identifiers once substituted.
fn pad(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return " ".to_string();
    }
    let mut padded = String::with_capacity(text.len() + 2);
    if text.starts_with(is_ident_char) {
        padded.push(' ');
    }
    padded.push_str(text);
    if text.ends_with(is_ident_char) {
        padded.push(' ');
    }
    padded
}

/// Definitions in declaration order; overloads share a name.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    defs: Vec<MacroDef>,
}

impl MacroTable {
    /// Add `def`, handing it back if it conflicts with an earlier one.
    pub fn insert(&mut self, def: MacroDef) -> Result<(), MacroDef> {
        if self.defs.iter().any(|d| d.conflicts_with(&def)) {
            return Err(def);
        }
        self.defs.push(def);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Distinct macro names, ordered by their first definition.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for def in &self.defs {
            if !names.contains(&def.name.as_str()) {
                names.push(&def.name);
            }
        }
        names
    }

    /// Pick the overload of `name` for a call with `argc` arguments.
    ///
    /// An exact parameter count wins. Otherwise the variadic overload with
    /// the most named parameters that still leaves arguments for the tail.
    pub fn resolve(&self, name: &str, argc: usize) -> Option<&MacroDef> {
        let overloads = || self.defs.iter().filter(move |d| d.name == name);
        overloads()
            .find(|d| d.params.len() == argc)
            .or_else(|| {
                overloads()
                    .filter(|d| d.variadic && d.params.len() < argc)
                    .max_by_key(|d| d.params.len())
            })
    }
}

pub(super) struct Scan {
    /// The input with every definition line emptied.
    pub text: String,
    pub table: MacroTable,
    pub diagnostics: Vec<Diagnostic>,
}

pub(super) fn scan_definitions(text: &str) -> Scan {
    let mut out = String::with_capacity(text.len());
    let mut table = MacroTable::default();
    let mut diagnostics = Vec::new();

    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let Some(at) = definition_start(line) else {
            out.push_str(line);
            continue;
        };

        let position = Position::new(index + 1, line[..at].chars().count());
        match parse_definition(&line[at..]) {
            Ok(def) => {
                if let Err(def) = table.insert(def) {
                    diagnostics.push(Diagnostic::error(
                        ErrorCode::DuplicateMacro,
                        position,
                        format!("duplicate macro definition {}", def.name),
                    ));
                }
            }
            Err(reason) => diagnostics.push(Diagnostic::error(
                ErrorCode::MalformedMacro,
                position,
                format!("malformed macro definition: {reason}"),
            )),
        }
    }

    Scan {
        text: out,
        table,
        diagnostics,
    }
}

const DEFINE: &str = "#define";

/// Byte offset of `#define` when `line` is a definition line.
fn definition_start(line: &str) -> Option<usize> {
    let trimmed = line.trim_start_matches([' ', '\t']);
    let rest = trimmed.strip_prefix(DEFINE)?;
    (rest.is_empty() || rest.starts_with(char::is_whitespace))
        .then(|| line.len() - trimmed.len())
}

fn parse_definition(line: &str) -> Result<MacroDef, &'static str> {
    let mut cursor = Cursor::new(&line[DEFINE.len()..]);

    cursor.skip_blanks();
    let name = cursor.ident().ok_or("expected a macro name")?;
    cursor.skip_blanks();
    if !cursor.eat("(") {
        return Err("expected '(' after the macro name");
    }

    let mut params: Vec<String> = Vec::new();
    let mut variadic = false;
    cursor.skip_blanks();
    if !cursor.eat(")") {
        loop {
            cursor.skip_blanks();
            if cursor.eat("...") {
                variadic = true;
                cursor.skip_blanks();
                if !cursor.eat(")") {
                    return Err("'...' must close the parameter list");
                }
                break;
            }
            let param = cursor.ident().ok_or("expected a parameter name")?;
            if params.iter().any(|p| p == param) {
                return Err("duplicate parameter name");
            }
            params.push(param.to_string());
            cursor.skip_blanks();
            if cursor.eat(")") {
                break;
            }
            if !cursor.eat(",") {
                return Err("expected ',' or ')' in the parameter list");
            }
        }
    }

    Ok(MacroDef::new(name, params, variadic, cursor.rest()))
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_blanks(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        if !rest.starts_with(|c: char| c.is_alphabetic() || c == '_') {
            return None;
        }
        let len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
        self.pos += len;
        Some(&rest[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(src: &str) -> MacroDef {
        parse_definition(src).expect("valid definition")
    }

    #[test]
    fn parses_parameter_lists() {
        let m = def("#define ADD(a, b) a + b");
        assert_eq!(m.name, "ADD");
        assert_eq!(m.params, vec!["a", "b"]);
        assert!(!m.variadic);

        let m = def("#define LOG(fmt, ...) print(fmt, __VA_ARGS__)");
        assert_eq!(m.params, vec!["fmt"]);
        assert!(m.variadic);

        let m = def("#define ALL(...) {__VA_ARGS__}");
        assert!(m.params.is_empty());
        assert!(m.variadic);

        let m = def("#define NOTHING()");
        assert!(m.params.is_empty());
        assert_eq!(m.render(&[]), " ");
    }

    #[test]
    fn substitution_is_padded_next_to_identifiers() {
        assert_eq!(def("#define ID(x) x").render(&["v".into()]), " v ");
        assert_eq!(def("#define P(x) (x)  ").render(&["v".into()]), "(v)");
    }

    #[test]
    fn malformed_definitions() {
        assert_eq!(
            parse_definition("#define").unwrap_err(),
            "expected a macro name"
        );
        assert_eq!(
            parse_definition("#define X 1").unwrap_err(),
            "expected '(' after the macro name"
        );
        assert_eq!(
            parse_definition("#define F(a b) a").unwrap_err(),
            "expected ',' or ')' in the parameter list"
        );
        assert_eq!(
            parse_definition("#define F(..., a) a").unwrap_err(),
            "'...' must close the parameter list"
        );
        assert_eq!(
            parse_definition("#define F(a, a) a").unwrap_err(),
            "duplicate parameter name"
        );
    }

    #[test]
    fn only_define_directives_are_definition_lines() {
        assert_eq!(definition_start("  #define F() 1"), Some(2));
        assert_eq!(definition_start("#define"), Some(0));
        assert_eq!(definition_start("#defined"), None);
        assert_eq!(definition_start("x = #t"), None);
    }

    #[test]
    fn overloads_resolve_by_arity() {
        let mut table = MacroTable::default();
        table.insert(def("#define M(a) one")).unwrap();
        table.insert(def("#define M(a, ...) many")).unwrap();
        table.insert(def("#define M(a, b, c, ...) lots")).unwrap();

        let chosen = |argc| table.resolve("M", argc).map(|d| d.params.len());
        assert_eq!(chosen(1), Some(1));
        assert_eq!(chosen(2), Some(1));
        assert_eq!(chosen(3), Some(3));
        assert_eq!(chosen(5), Some(3));
        assert_eq!(chosen(0), None);
        assert!(table.resolve("N", 1).is_none());
    }

    #[test]
    fn conflicting_definitions_are_rejected() {
        let mut table = MacroTable::default();
        table.insert(def("#define M(a) 1")).unwrap();
        table.insert(def("#define M(a, ...) 2")).unwrap();
        let rejected = table.insert(def("#define M(b) 3")).unwrap_err();
        assert_eq!(rejected.params, vec!["b"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.names(), vec!["M"]);
    }

    #[test]
    fn scanning_blanks_definition_lines() {
        let scan = scan_definitions("#define A() 1\nx = A()\n  #define A() 2\n#define B\n");
        assert_eq!(scan.text, "\nx = A()\n\n\n");
        assert_eq!(scan.table.len(), 1);
        let rendered: Vec<String> = scan.diagnostics.iter().map(|d| d.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "Error Mira2 (3, 2): duplicate macro definition A",
                "Error Mira3 (4, 0): malformed macro definition: expected '(' after the macro name",
            ]
        );
    }
}
