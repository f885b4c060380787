use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use mira_driver::{compile_all, compile_source, CompileOptions, UnitReport, UnitStatus};
use mira_parser::{parse_mirana, preprocess};
use mira_syntax::Diagnostic;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mira", version, about = "Mirana: Lua with lambdas, macros and if-expressions")]
struct Cli {
    /// Config file (default: ./mira.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log more (-v debug, -vv trace). Overrides RUST_LOG.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(flatten)]
    overrides: Overrides,
    #[command(subcommand)]
    command: Commands,
}

/// Flags that take precedence over the config file.
#[derive(Args)]
struct Overrides {
    /// Skip macro expansion (line continuations are still merged).
    #[arg(long, global = true)]
    no_macros: bool,
    /// Spaces per indentation level.
    #[arg(long, global = true)]
    indent: Option<usize>,
    /// Leave out the generator banner.
    #[arg(long, global = true)]
    no_banner: bool,
    /// Compile one file at a time.
    #[arg(long, global = true)]
    sequential: bool,
}

impl Overrides {
    fn apply(&self, options: &mut CompileOptions) {
        if self.no_macros {
            options.macros = false;
        }
        if let Some(width) = self.indent {
            options.indent_width = width;
        }
        if self.no_banner {
            options.banner = false;
        }
        if self.sequential {
            options.parallel = false;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile files and directories; each `x.mira` is written to `x.lua`.
    Build {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Compile one file and report errors without writing anything.
    Check { input: PathBuf },
    /// Print the text after line merging and macro expansion.
    Preprocess {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse and dump the syntax tree.
    Parse {
        input: PathBuf,
        /// Dump as JSON.
        #[arg(long)]
        ast: bool,
    },
    /// Translate one file to Lua.
    Translate {
        input: PathBuf,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut options = match &cli.config {
        Some(path) => CompileOptions::load(path)?,
        None => CompileOptions::load_from_dir(Path::new("."))?,
    };
    cli.overrides.apply(&mut options);
    debug!(?options, "options");

    let ok = match cli.command {
        Commands::Build { paths } => {
            let reports = compile_all(&paths, &options);
            for report in &reports {
                println!("{report}");
            }
            reports.iter().all(UnitReport::is_success)
        }
        Commands::Check { input } => {
            let source = read(&input)?;
            match compile_source(&source, &options) {
                Ok(_) => {
                    eprintln!("OK: {}", input.display());
                    true
                }
                Err(diagnostics) => report_failure(&input, diagnostics),
            }
        }
        Commands::Preprocess { input, output } => {
            let source = read(&input)?;
            let preprocessed = preprocess(&source, &options.preprocess());
            if preprocessed.diagnostics.is_empty() {
                emit(output.as_deref(), &preprocessed.text)?;
                true
            } else {
                report_failure(&input, preprocessed.diagnostics)
            }
        }
        Commands::Parse { input, ast } => {
            let source = read(&input)?;
            match parse_mirana(&source, &options.preprocess()) {
                Ok(parsed) => {
                    if ast {
                        let json = serde_json::to_string_pretty(&parsed.chunk)?;
                        println!("{json}");
                    } else {
                        println!("{:#?}", parsed.chunk);
                    }
                    true
                }
                Err(diagnostics) => report_failure(&input, diagnostics),
            }
        }
        Commands::Translate { input, output } => {
            let source = read(&input)?;
            match compile_source(&source, &options) {
                Ok(lua) => {
                    emit(output.as_deref(), &lua)?;
                    true
                }
                Err(diagnostics) => report_failure(&input, diagnostics),
            }
        }
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("cannot write {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

/// Print the per-file error block and signal failure.
fn report_failure(path: &Path, diagnostics: Vec<Diagnostic>) -> bool {
    let report = UnitReport {
        path: path.to_path_buf(),
        status: UnitStatus::Failed(diagnostics),
    };
    println!("{report}");
    false
}
