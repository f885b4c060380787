//! A single compile unit.

use std::path::{Path, PathBuf};

use mira_desugar::translate_chunk;
use mira_parser::parse_mirana;
use mira_syntax::Diagnostic;
use tracing::{debug, warn};

use crate::error::DriverError;
use crate::options::CompileOptions;

pub const SOURCE_EXTENSION: &str = "mira";
pub const OUTPUT_EXTENSION: &str = "lua";

/// Comment block every generated file starts with.
pub fn banner() -> String {
    format!(
        "---------------------------------------------\n\
         -- Generated from Mirana Compiler version {}\n\
         -- Do not modify\n\
         ---------------------------------------------\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// `dir/name.mira` → `dir/name.lua`.
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension(OUTPUT_EXTENSION)
}

/// Preprocess, parse and translate `source`, returning the full output file
/// text.
pub fn compile_source(source: &str, options: &CompileOptions) -> Result<String, Vec<Diagnostic>> {
    let parsed = parse_mirana(source, &options.preprocess())?;
    let body = translate_chunk(
        &parsed.chunk,
        &parsed.preprocessed_source,
        &options.translate(),
    )?;

    let mut out = if options.banner { banner() } else { String::new() };
    if !body.is_empty() {
        out.push_str(&body);
        out.push('\n');
    }
    Ok(out)
}

/// One source file and the diagnostics compiling it produced.
#[derive(Debug, Clone)]
pub struct CompileUnit {
    pub path: PathBuf,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileUnit {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            diagnostics: Vec::new(),
        }
    }

    pub fn open(path: &Path) -> Result<Self, DriverError> {
        let source = std::fs::read_to_string(path).map_err(|source| DriverError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path, source))
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn output_path(&self) -> PathBuf {
        output_path(&self.path)
    }

    /// Compile the unit. On failure the diagnostics are kept on the unit and
    /// `None` is returned.
    pub fn compile(&mut self, options: &CompileOptions) -> Option<String> {
        debug!(path = %self.path.display(), "compiling");
        match compile_source(&self.source, options) {
            Ok(output) => Some(output),
            Err(diagnostics) => {
                debug!(
                    path = %self.path.display(),
                    errors = diagnostics.len(),
                    "compile failed"
                );
                self.diagnostics = diagnostics;
                None
            }
        }
    }

    /// Compile and write the output file. Returns the path written, or
    /// `None` when the unit has diagnostics.
    pub fn build(&mut self, options: &CompileOptions) -> Result<Option<PathBuf>, DriverError> {
        let Some(output) = self.compile(options) else {
            return Ok(None);
        };
        let path = self.output_path();
        if let Err(source) = std::fs::write(&path, output) {
            warn!(path = %path.display(), error = %source, "cannot write output");
            return Err(DriverError::Write { path, source });
        }
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> CompileOptions {
        CompileOptions {
            banner: false,
            ..CompileOptions::default()
        }
    }

    #[test]
    fn banner_names_the_version() {
        let b = banner();
        assert_eq!(b.lines().count(), 4);
        assert!(b.contains(&format!("version {}", env!("CARGO_PKG_VERSION"))));
    }

    #[test]
    fn output_ends_with_one_newline() {
        assert_eq!(compile_source("x = 1", &plain()).unwrap(), "x = 1\n");
        assert_eq!(compile_source("", &plain()).unwrap(), "");
        assert_eq!(
            compile_source("-- only a comment", &CompileOptions::default()).unwrap(),
            banner()
        );
    }

    #[test]
    fn macros_can_be_disabled() {
        let source = "#define ID(x) x\ny = ID(2)";
        assert_eq!(compile_source(source, &plain()).unwrap(), "y = 2\n");
        let options = CompileOptions {
            macros: false,
            ..plain()
        };
        assert!(compile_source(source, &options).is_err());
    }

    #[test]
    fn diagnostics_stay_on_the_unit() {
        let mut unit = CompileUnit::new("bad.mira", "local = 1");
        assert!(unit.compile(&plain()).is_none());
        assert!(unit.has_errors());
        assert!(unit.diagnostics[0].to_string().starts_with("Syntax Error at (1, 6)"));
    }

    #[test]
    fn output_goes_next_to_the_input() {
        assert_eq!(
            output_path(Path::new("src/game/main.mira")),
            PathBuf::from("src/game/main.lua")
        );
    }
}
