//! Input discovery and batch compilation.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use mira_syntax::Diagnostic;
use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::options::CompileOptions;
use crate::unit::{CompileUnit, SOURCE_EXTENSION};

/// Resolve command-line paths to source files.
///
/// Files are taken as given; directories are searched recursively for
/// `*.mira`. A file reached twice is compiled once, at its first position.
pub fn discover(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut add = |path: PathBuf| {
        let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if seen.insert(key) {
            files.push(path);
        }
    };

    for path in paths {
        if path.is_file() {
            add(path.clone());
        } else if path.is_dir() {
            WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_source(e.path()))
                .for_each(|e| add(e.into_path()));
        } else {
            warn!(path = %path.display(), "no such file or directory");
        }
    }

    debug!(files = files.len(), "discovered inputs");
    files
}

fn is_source(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(SOURCE_EXTENSION)
}

/// Outcome of one unit in a batch.
#[derive(Debug)]
pub struct UnitReport {
    pub path: PathBuf,
    pub status: UnitStatus,
}

#[derive(Debug)]
pub enum UnitStatus {
    /// Output written to this path.
    Written(PathBuf),
    /// The unit did not compile.
    Failed(Vec<Diagnostic>),
    /// The input could not be read or the output could not be written.
    Io(String),
}

impl UnitReport {
    pub fn is_success(&self) -> bool {
        matches!(self.status, UnitStatus::Written(_))
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match &self.status {
            UnitStatus::Failed(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}

impl fmt::Display for UnitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            UnitStatus::Written(output) => {
                write!(f, "Successfully write to file {}", output.display())
            }
            UnitStatus::Failed(diagnostics) => {
                write!(
                    f,
                    "{} errors in file {}",
                    diagnostics.len(),
                    self.path.display()
                )?;
                for diagnostic in diagnostics {
                    write!(f, "\n{diagnostic}")?;
                }
                Ok(())
            }
            UnitStatus::Io(message) => f.write_str(message),
        }
    }
}

/// Compile and write one file.
pub fn compile_file(path: &Path, options: &CompileOptions) -> UnitReport {
    let status = match CompileUnit::open(path) {
        Err(err) => UnitStatus::Io(err.to_string()),
        Ok(mut unit) => match unit.build(options) {
            Ok(Some(output)) => UnitStatus::Written(output),
            Ok(None) => UnitStatus::Failed(unit.diagnostics),
            Err(err) => UnitStatus::Io(err.to_string()),
        },
    };
    UnitReport {
        path: path.to_path_buf(),
        status,
    }
}

/// Discover and compile every input. Reports come back in discovery order.
pub fn compile_all(paths: &[PathBuf], options: &CompileOptions) -> Vec<UnitReport> {
    let files = discover(paths);
    if options.parallel {
        files
            .par_iter()
            .map(|path| compile_file(path, options))
            .collect()
    } else {
        files
            .iter()
            .map(|path| compile_file(path, options))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn directories_are_searched_for_sources() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.mira", "");
        let b = write(&dir, "nested/b.mira", "");
        write(&dir, "nested/readme.md", "");

        let files = discover(&[dir.path().to_path_buf()]);
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn inputs_are_deduplicated() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.mira", "");
        let files = discover(&[a.clone(), dir.path().to_path_buf(), a.clone()]);
        assert_eq!(files, vec![a]);
    }

    #[test]
    fn missing_paths_are_skipped() {
        let dir = TempDir::new().unwrap();
        assert!(discover(&[dir.path().join("nope.mira")]).is_empty());
    }

    #[test]
    fn failing_unit_does_not_affect_siblings() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "good.mira", "local x = 1\nx += 2\n");
        let bad = write(&dir, "bad.mira", "local x = \n");

        for parallel in [true, false] {
            let options = CompileOptions {
                parallel,
                ..CompileOptions::default()
            };
            let reports = compile_all(&[good.clone(), bad.clone()], &options);
            assert_eq!(reports.len(), 2);

            assert!(reports[0].is_success());
            let lua = fs::read_to_string(dir.path().join("good.lua")).unwrap();
            assert!(lua.ends_with("local x = 1\nx = x + 2\n"));

            assert!(!reports[1].is_success());
            assert_eq!(reports[1].diagnostics().len(), 1);
            assert!(!dir.path().join("bad.lua").exists());
        }
    }

    #[test]
    fn reports_render_status_lines() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "good.mira", "print(1)");
        let bad = write(&dir, "bad.mira", "x = $1");

        let reports = compile_all(&[good, bad.clone()], &CompileOptions::default());
        assert_eq!(
            reports[0].to_string(),
            format!(
                "Successfully write to file {}",
                dir.path().join("good.lua").display()
            )
        );
        assert_eq!(
            reports[1].to_string(),
            format!(
                "1 errors in file {}\nError Mira1 (1, 4): Cannot use lambda implicit parameter in a non-lambda environment",
                bad.display()
            )
        );
    }
}
