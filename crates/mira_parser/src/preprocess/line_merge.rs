//! Backslash line continuation.

use mira_syntax::is_ident_char;

/// Join every line ending in `\` with the line after it.
///
/// The joined lines are followed by as many empty lines as were merged, so
/// the output has exactly as many lines as the input. A space is inserted
/// when the merged line ends in an identifier character, keeping
/// `local\` + `x` two tokens.
pub fn merge_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = 0usize;
    let mut lines = text.split('\n').peekable();

    while let Some(line) = lines.next() {
        let is_last = lines.peek().is_none();
        match continued(line) {
            Some(head) => {
                out.push_str(head);
                if head.ends_with(is_ident_char) {
                    out.push(' ');
                }
                pending += 1;
            }
            None => {
                out.push_str(line);
                push_newlines(&mut out, pending);
                pending = 0;
                if !is_last {
                    out.push('\n');
                }
            }
        }
    }

    // A continuation on the final line has no line of its own to join.
    push_newlines(&mut out, pending.saturating_sub(1));
    out
}

fn continued(line: &str) -> Option<&str> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.strip_suffix('\\')
}

fn push_newlines(out: &mut String, count: usize) {
    out.extend(std::iter::repeat('\n').take(count));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(merge_lines("a\nb\n"), "a\nb\n");
        assert_eq!(merge_lines(""), "");
    }

    #[test]
    fn continued_lines_are_joined_and_padded() {
        assert_eq!(merge_lines("local\\\nx = 1\ny"), "local x = 1\n\ny");
        assert_eq!(merge_lines("f(1,\\\n2)\n"), "f(1,2)\n\n");
    }

    #[test]
    fn several_continuations_keep_the_line_count() {
        let src = "a = 1 +\\\n2 +\\\n3\nb";
        let merged = merge_lines(src);
        assert_eq!(merged, "a = 1 +2 +3\n\n\nb");
        assert_eq!(merged.split('\n').count(), src.split('\n').count());
    }

    #[test]
    fn continuation_on_the_last_line() {
        assert_eq!(merge_lines("a\nb\\"), "a\nb ");
    }

    #[test]
    fn carriage_returns_before_the_backslash_are_dropped() {
        assert_eq!(merge_lines("x\\\r\ny\r\n"), "x y\r\n\n");
    }
}
