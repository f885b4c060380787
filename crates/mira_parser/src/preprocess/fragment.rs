//! Compiled substitution templates.
//!
//! A template is split at every whole-word occurrence of a parameter name
//! (or `__VA_ARGS__` for variadic macros). `#` markers directly around an
//! occurrence change how the argument is inserted:
//!
//! | template | inserted as                         |
//! |----------|-------------------------------------|
//! | `a`      | argument text, verbatim             |
//! | `#a`     | quoted string                       |
//! | `x#a`    | `x..` followed by the quoted string |
//! | `a##b`   | both arguments pasted together      |
//!
//! Any other `#` in the template is dropped.

use mira_syntax::is_ident_char;

pub(super) const VA_ARGS: &str = "__VA_ARGS__";

/// Where a `..` must be glued onto a quoted argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Sides {
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Fragment {
    Text(String),
    Argument(usize),
    Stringify { index: usize, sides: Sides },
    /// Pasted with `##`. Renders like [`Fragment::Argument`].
    Concat(usize),
    /// Every argument past the named parameters.
    VarArgs { stringify: bool, sides: Sides },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    None,
    Stringify,
    Concat,
}

impl Marker {
    fn len(self) -> usize {
        match self {
            Marker::None => 0,
            Marker::Stringify => 1,
            Marker::Concat => 2,
        }
    }
}

enum Slot {
    Param(usize),
    VarArgs,
}

pub(super) fn compile(template: &str, params: &[String], variadic: bool) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut literal_start = 0;

    for (start, end) in words(template) {
        let word = &template[start..end];
        let slot = match params.iter().position(|p| p == word) {
            Some(index) => Slot::Param(index),
            None if variadic && word == VA_ARGS => Slot::VarArgs,
            None => continue,
        };

        let left = marker_before(template, start);
        let right = marker_after(template, end);
        // `a#b`: the marker was already taken as the right side of `a`.
        let shared = start - left.len() < literal_start;
        let cut = (start - left.len()).max(literal_start);
        push_text(&mut fragments, &template[literal_start..cut]);
        literal_start = end + right.len();

        let concat = left == Marker::Concat || right == Marker::Concat;
        let stringify = !concat && (left == Marker::Stringify || right == Marker::Stringify);
        let sides = if stringify {
            Sides {
                left: left == Marker::Stringify && !shared && glued_before(template, start - 1),
                right: right == Marker::Stringify && glued_after(template, end + 1),
            }
        } else {
            Sides::default()
        };

        fragments.push(match slot {
            Slot::VarArgs => Fragment::VarArgs { stringify, sides },
            Slot::Param(index) if concat => Fragment::Concat(index),
            Slot::Param(index) if stringify => Fragment::Stringify { index, sides },
            Slot::Param(index) => Fragment::Argument(index),
        });
    }

    push_text(&mut fragments, &template[literal_start.min(template.len())..]);
    fragments
}

/// Render `fragments` with the captured call arguments.
///
/// `fixed` is the number of named parameters; arguments beyond it feed
/// `__VA_ARGS__`.
pub(super) fn render(fragments: &[Fragment], args: &[String], fixed: usize) -> String {
    let mut out = String::new();
    for fragment in fragments {
        match fragment {
            Fragment::Text(text) => out.push_str(text),
            Fragment::Argument(index) | Fragment::Concat(index) => {
                out.push_str(args.get(*index).map_or("", String::as_str));
            }
            Fragment::Stringify { index, sides } => {
                let arg = args.get(*index).map_or("", |a| a.trim());
                glue(&mut out, &quote(arg), *sides);
            }
            Fragment::VarArgs { stringify, sides } => {
                let tail: Vec<&str> = args
                    .get(fixed..)
                    .unwrap_or_default()
                    .iter()
                    .map(|a| a.trim())
                    .collect();
                let joined = tail.join(", ");
                if *stringify {
                    glue(&mut out, &quote(&joined), *sides);
                } else {
                    out.push_str(&joined);
                }
            }
        }
    }
    out
}

fn glue(out: &mut String, value: &str, sides: Sides) {
    if sides.left {
        out.push_str("..");
    }
    out.push_str(value);
    if sides.right {
        out.push_str("..");
    }
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '\\' | '"') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn push_text(fragments: &mut Vec<Fragment>, text: &str) {
    let text: String = text.chars().filter(|&c| c != '#').collect();
    if !text.is_empty() {
        fragments.push(Fragment::Text(text));
    }
}

/// Byte ranges of maximal identifier-character runs.
fn words(text: &str) -> Vec<(usize, usize)> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (is_ident_char(c), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                words.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, text.len()));
    }
    words
}

fn marker_before(text: &str, start: usize) -> Marker {
    let before = &text[..start];
    if before.ends_with("##") {
        Marker::Concat
    } else if before.ends_with('#') {
        Marker::Stringify
    } else {
        Marker::None
    }
}

fn marker_after(text: &str, end: usize) -> Marker {
    let after = &text[end..];
    if after.starts_with("##") {
        Marker::Concat
    } else if after.starts_with('#') {
        Marker::Stringify
    } else {
        Marker::None
    }
}

/// Whether the text ending at `marker` (the `#` left of an argument) ends a
/// value that a `..` can follow.
fn glued_before(text: &str, marker: usize) -> bool {
    text[..marker]
        .chars()
        .next_back()
        .is_some_and(|c| is_ident_char(c) || matches!(c, ')' | ']' | '}' | '"' | '\''))
}

/// Whether the text starting at `after` (just past the `#` right of an
/// argument) starts a value that a `..` can precede.
fn glued_after(text: &str, after: usize) -> bool {
    text.get(after..)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| is_ident_char(c) || matches!(c, '(' | '[' | '{' | '"' | '\''))
}
