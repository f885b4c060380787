//! Text-level preprocessing that runs before the parser.
//!
//! Processing order:
//! 1. Line merging: `\` at end of line joins it with the next one
//! 2. Definition scanning: `#define` lines build the macro table and are
//!    blanked out
//! 3. Expansion: macro invocations are rewritten until none remain
//!
//! Every stage keeps the line count of its input, so positions reported by
//! the parser still point at the user's source lines.

use mira_syntax::Diagnostic;
use serde::{Deserialize, Serialize};
use tracing::debug;

mod define;
mod expand;
mod fragment;
mod line_merge;

pub use define::{MacroDef, MacroTable};
pub use line_merge::merge_lines;

/// Knobs for [`preprocess`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessOptions {
    /// Scan `#define`s and expand invocations. Line merging always runs.
    pub macros: bool,
    /// Substitutions allowed before expansion gives up.
    pub max_expansions: usize,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            macros: true,
            max_expansions: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Merge continued lines, collect macro definitions and expand them.
///
/// Errors are accumulated: a bad definition does not stop the scan, and a
/// failed invocation leaves the remaining text unexpanded.
pub fn preprocess(source: &str, options: &PreprocessOptions) -> Preprocessed {
    let merged = merge_lines(source);
    if !options.macros {
        return Preprocessed {
            text: merged,
            diagnostics: Vec::new(),
        };
    }

    let scan = define::scan_definitions(&merged);
    debug!(definitions = scan.table.len(), "scanned macro definitions");
    let mut diagnostics = scan.diagnostics;

    let expansion = expand::expand(scan.text, &scan.table, options.max_expansions);
    debug!(substitutions = expansion.substitutions, "expanded macros");
    diagnostics.extend(expansion.diagnostics);

    Preprocessed {
        text: expansion.text,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mira_syntax::ErrorCode;

    fn run(source: &str) -> Preprocessed {
        preprocess(source, &PreprocessOptions::default())
    }

    #[test]
    fn text_without_macros_is_unchanged() {
        let src = "local x = f(1, 2)\nprint(\"#define\")\n";
        let out = run(src);
        assert_eq!(out.text, src);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn definitions_become_blank_lines() {
        let out = run("#define SQ(x) x * x\nlocal y = SQ(3)\n");
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        assert_eq!(out.text, "\nlocal y =  3 * 3 \n");
    }

    #[test]
    fn stray_markers_do_not_reach_the_output() {
        let words = |src: &str| {
            let out = run(src);
            assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
            out.text
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        assert_eq!(words("#define SIZE(t) # t\nn = SIZE(list)\n"), ["n", "=", "list"]);
        assert_eq!(words("#define W(x) ##x + #y\nm = W(v)\n"), ["m", "=", "v", "+", "y"]);
        assert_eq!(
            words("#define P(a, b) a#b\ns = P(u, v)\n"),
            ["s", "=", "\"u\"..\"v\""]
        );
    }

    #[test]
    fn line_count_is_preserved_through_every_stage() {
        let src = "#define A(x) \\\n  (x + 1)\nlocal a = A(1)\nlocal b = \\\n  2\nprint(a)";
        let out = run(src);
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        assert_eq!(out.text.lines().count(), src.lines().count());
        assert_eq!(out.text.lines().nth(3), Some("local b =   2"));
        assert_eq!(out.text.lines().nth(5), Some("print(a)"));
    }

    #[test]
    fn macros_can_be_disabled() {
        let src = "#define A() 1\nA()";
        let out = preprocess(
            src,
            &PreprocessOptions {
                macros: false,
                ..Default::default()
            },
        );
        assert_eq!(out.text, src);
    }

    #[test]
    fn errors_accumulate_across_stages() {
        let src = "#define A(x) x\n#define A(y) y\n#define (oops\nlocal v = A(1, 2)";
        let out = run(src);
        let codes: Vec<_> = out.diagnostics.iter().filter_map(|d| d.code()).collect();
        assert_eq!(
            codes,
            vec![
                ErrorCode::DuplicateMacro,
                ErrorCode::MalformedMacro,
                ErrorCode::MacroCall
            ]
        );
        assert_eq!(
            out.diagnostics[0].to_string(),
            "Error Mira2 (2, 0): duplicate macro definition A"
        );
        assert!(out.text.ends_with("local v = A(1, 2)"));
    }
}
