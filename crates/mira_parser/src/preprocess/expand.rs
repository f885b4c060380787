//! Macro invocation rewriting.
//!
//! Macro names are tried in definition order. The first invocation of the
//! first name that still occurs is replaced, then the search starts over
//! from the first name on the updated text. Expansion ends when no name
//! occurs any more, on the first failed invocation, or when the
//! substitution limit is reached.

use mira_syntax::{is_ident_char, Diagnostic, ErrorCode, LineIndex};
use tracing::trace;

use super::define::MacroTable;

pub(super) struct Expansion {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
    pub substitutions: usize,
}

pub(super) fn expand(text: String, table: &MacroTable, limit: usize) -> Expansion {
    let names = table.names();
    let mut text = text;
    let mut diagnostics = Vec::new();
    let mut substitutions = 0;

    'rescan: loop {
        for &name in &names {
            let Some(at) = find_invocation(&text, name) else {
                continue;
            };
            let fail = |message: String| {
                let position = LineIndex::new(&text).position(&text, at);
                Diagnostic::error(ErrorCode::MacroCall, position, message)
            };

            if substitutions >= limit {
                diagnostics.push(fail(format!(
                    "macro expansion limit of {limit} exceeded while expanding {name}"
                )));
                break 'rescan;
            }

            let args_at = at + name.len();
            let Some(call) = match_arguments(&text[args_at..]) else {
                diagnostics.push(fail(format!("match macro {name} failed")));
                break 'rescan;
            };
            let Some(def) = table.resolve(name, call.args.len()) else {
                diagnostics.push(fail(format!(
                    "match macro {name} with {} argument(s) failed",
                    call.args.len()
                )));
                break 'rescan;
            };

            let replacement = def.render(&call.args);
            trace!(
                macro_name = name,
                args = call.args.len(),
                offset = at,
                %replacement,
                "expanded macro"
            );
            text.replace_range(at..args_at + call.end, &replacement);
            substitutions += 1;
            continue 'rescan;
        }
        break;
    }

    Expansion {
        text,
        diagnostics,
        substitutions,
    }
}

/// Byte offset of the first whole-word `name` outside string literals.
fn find_invocation(text: &str, name: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev: Option<char> = None;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q || c == '\n' {
                quote = None;
            }
        } else if c == '"' || c == '\'' {
            quote = Some(c);
        } else if !prev.is_some_and(is_ident_char) && text[i..].starts_with(name) {
            let after = text[i + name.len()..].chars().next();
            if !after.is_some_and(is_ident_char) {
                return Some(i);
            }
        }
        prev = Some(c);
    }
    None
}

/// Arguments captured at a call site.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct Call {
    pub args: Vec<String>,
    /// Byte offset just past the closing `)`.
    pub end: usize,
}

/// Capture the argument list that follows a macro name.
///
/// Blanks may precede the `(`. Commas split arguments only at the top
/// nesting level; brackets and quoted strings nest. Arguments keep their
/// surrounding whitespace.
pub(super) fn match_arguments(text: &str) -> Option<Call> {
    let mut depth = 0usize;
    let mut arg_start = 0;
    let mut args = Vec::new();
    let mut chars = text.char_indices();

    while let Some((i, c)) = chars.next() {
        if depth == 0 {
            if c.is_whitespace() {
                continue;
            }
            if c != '(' {
                return None;
            }
            depth = 1;
            arg_start = i + 1;
            continue;
        }

        match c {
            '"' | '\'' => skip_string(&mut chars, c)?,
            '(' | '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1).max(1),
            ',' if depth == 1 => {
                args.push(text[arg_start..i].to_string());
                arg_start = i + 1;
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    args.push(text[arg_start..i].to_string());
                    if args.len() == 1 && args[0].trim().is_empty() {
                        args.clear();
                    }
                    return Some(Call { args, end: i + 1 });
                }
            }
            _ => {}
        }
    }
    None
}

fn skip_string(chars: &mut std::str::CharIndices<'_>, quote: char) -> Option<()> {
    let mut escaped = false;
    for (_, c) in chars.by_ref() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(());
        } else if c == '\n' {
            return None;
        }
    }
    None
}
