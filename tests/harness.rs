//! Golden-file test harness for the Mirana compiler.
//!
//! Discovers `.input.mira` files under `tests/fixtures/`, compiles them
//! (preprocess → parse → translate, without the banner) and compares the
//! output against the matching `.expected.lua` file. Inputs that must fail
//! have an `.expected.err` file holding the rendered diagnostics instead.
//!
//! Set `MIRA_UPDATE_FIXTURES=1` to overwrite expected files with actual output.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use mira_driver::{compile_source, CompileOptions};
use walkdir::WalkDir;

const INPUT_SUFFIX: &str = ".input.mira";

fn fixtures_dir() -> PathBuf {
    // CARGO_MANIFEST_DIR is crates/mira_test/, the fixtures live at the workspace root.
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
}

fn collect_input_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.file_name()
                    .to_str()
                    .is_some_and(|n| n.ends_with(INPUT_SUFFIX))
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn sibling(input: &Path, suffix: &str) -> PathBuf {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .trim_end_matches(INPUT_SUFFIX);
    input.with_file_name(format!("{name}{suffix}"))
}

fn options() -> CompileOptions {
    CompileOptions {
        banner: false,
        parallel: false,
        ..CompileOptions::default()
    }
}

/// Compiled text, or the diagnostics rendered one per line.
fn run_pipeline(source: &str) -> std::result::Result<String, String> {
    compile_source(source, &options()).map_err(|diagnostics| {
        diagnostics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn check_fixture(input_path: &Path, update_mode: bool) -> Result<()> {
    let source = std::fs::read_to_string(input_path)
        .map_err(|e| anyhow!("failed to read input: {e}"))?;

    let lua_path = sibling(input_path, ".expected.lua");
    let err_path = sibling(input_path, ".expected.err");
    let (actual, expected_path, other_path) = match run_pipeline(&source) {
        Ok(lua) => (lua, lua_path, err_path),
        Err(errors) => (errors, err_path, lua_path),
    };

    if update_mode {
        std::fs::write(&expected_path, &actual)
            .map_err(|e| anyhow!("failed to write expected: {e}"))?;
        return Ok(());
    }

    if !expected_path.exists() {
        if other_path.exists() {
            let other = std::fs::read_to_string(&other_path)?;
            return Err(anyhow!(
                "expected {} but got\n{}\n--- expected ---\n{}",
                other_path.display(),
                actual.trim(),
                other.trim()
            ));
        }
        return Err(anyhow!(
            "missing expected file: {}",
            expected_path.display()
        ));
    }

    let expected = std::fs::read_to_string(&expected_path)
        .map_err(|e| anyhow!("failed to read expected: {e}"))?;
    if actual.trim() != expected.trim() {
        return Err(anyhow!(
            "output mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
            expected.trim(),
            actual.trim()
        ));
    }
    Ok(())
}

#[test]
fn golden_file_tests() {
    let fixtures = fixtures_dir();
    let input_files: Vec<PathBuf> = collect_input_files(&fixtures)
        .into_iter()
        .filter(|p| !p.starts_with(fixtures.join("roundtrip")))
        .collect();

    assert!(
        !input_files.is_empty(),
        "No test fixtures found in {}",
        fixtures.display()
    );

    let update_mode = std::env::var("MIRA_UPDATE_FIXTURES").is_ok();
    let mut failures = Vec::new();

    for input_path in &input_files {
        let test_name = input_path
            .strip_prefix(&fixtures)
            .unwrap_or(input_path)
            .display()
            .to_string();
        if let Err(e) = check_fixture(input_path, update_mode) {
            failures.push(format!("{test_name}: {e}"));
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} golden test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

/// Translating the compiler's own output again changes nothing.
#[test]
fn roundtrip_tests() {
    let fixtures = fixtures_dir().join("roundtrip");
    let input_files = collect_input_files(&fixtures);

    assert!(
        !input_files.is_empty(),
        "No roundtrip fixtures found in {}",
        fixtures.display()
    );

    let mut failures = Vec::new();

    for input_path in &input_files {
        let test_name = input_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read: {e}"));
                continue;
            }
        };

        let first = match run_pipeline(&source) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: pipeline failed:\n{e}"));
                continue;
            }
        };

        match run_pipeline(&first) {
            Ok(second) if second == first => {}
            Ok(second) => failures.push(format!(
                "{test_name}: output is not stable\n--- first ---\n{}\n--- second ---\n{}",
                first.trim(),
                second.trim()
            )),
            Err(e) => failures.push(format!(
                "{test_name}: output does not compile again:\n{e}\n--- output ---\n{}",
                first.trim()
            )),
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} roundtrip test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}
