//! Compiler configuration.
//!
//! Read from `mira.toml` (or a path given on the command line); every key is
//! optional:
//!
//! ```toml
//! macros = true
//! indent_width = 4
//! banner = true
//! max_macro_expansions = 10000
//! parallel = true
//! ```

use std::path::Path;

use mira_desugar::TranslateOptions;
use mira_parser::PreprocessOptions;
use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = "mira.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Run the macro preprocessor. Line continuations are always merged.
    pub macros: bool,
    /// Spaces per indentation level in the generated Lua.
    pub indent_width: usize,
    /// Start every output file with the generator banner.
    pub banner: bool,
    /// Substitutions allowed per unit before expansion is abandoned.
    pub max_macro_expansions: usize,
    /// Compile units on the rayon thread pool.
    pub parallel: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            macros: true,
            indent_width: 4,
            banner: true,
            max_macro_expansions: 10_000,
            parallel: true,
        }
    }
}

impl CompileOptions {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, DriverError> {
        let text = std::fs::read_to_string(path).map_err(|source| DriverError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| DriverError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `dir/mira.toml` if it exists, defaults otherwise.
    pub fn load_from_dir(dir: &Path) -> Result<Self, DriverError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn preprocess(&self) -> PreprocessOptions {
        PreprocessOptions {
            macros: self.macros,
            max_expansions: self.max_macro_expansions,
        }
    }

    pub fn translate(&self) -> TranslateOptions {
        TranslateOptions {
            indent_width: self.indent_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let options = CompileOptions::from_toml("indent_width = 2\nparallel = false\n").unwrap();
        assert_eq!(options.indent_width, 2);
        assert!(!options.parallel);
        assert!(options.macros);
        assert_eq!(options.max_macro_expansions, 10_000);
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(CompileOptions::from_toml("indent_width = \"wide\"").is_err());
    }

    #[test]
    fn config_file_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            CompileOptions::load_from_dir(dir.path()).unwrap(),
            CompileOptions::default()
        );

        std::fs::write(dir.path().join(CONFIG_FILE), "banner = false\n").unwrap();
        let options = CompileOptions::load_from_dir(dir.path()).unwrap();
        assert!(!options.banner);
    }

    #[test]
    fn broken_config_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "macros = [").unwrap();
        let err = CompileOptions::load(&path).unwrap_err();
        assert!(err.to_string().starts_with("invalid config "));
        assert!(err.to_string().contains("mira.toml"));
    }
}
