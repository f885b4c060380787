//! Translation of the Mirana tree into Lua source text.
//!
//! Plain Lua constructs are printed back in a canonical layout. Mirana
//! extensions are rewritten on the way out:
//!
//! - if-expressions       → self-invoking `(function() … end)()`
//! - `fn`, `=>`, `fun`    → anonymous functions (see [`lambda`])
//! - `+`, `not`, `++` …   → operator-section functions (see [`section`])
//! - `t[k] += v`, `x++`   → read-modify-write through temporaries (see [`compound`])

pub mod compound;
pub mod if_expr;
pub mod lambda;
pub mod section;
pub mod translate;
pub mod writer;

mod expr;

pub use translate::{translate_chunk, TranslateOptions};
pub use writer::LuaWriter;

#[cfg(test)]
pub(crate) mod test_util {
    use mira_parser::parse_chunk;

    use crate::{translate_chunk, TranslateOptions};

    /// Translate `source` (no preprocessing) and unwrap.
    pub fn lua(source: &str) -> String {
        let chunk = parse_chunk(source).expect("parses");
        translate_chunk(&chunk, source, &TranslateOptions::default()).expect("translates")
    }

    /// Translate `source` and return the rendered diagnostics.
    pub fn errors(source: &str) -> Vec<String> {
        let chunk = parse_chunk(source).expect("parses");
        translate_chunk(&chunk, source, &TranslateOptions::default())
            .expect_err("fails")
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}
