//! binsniff: identify third-party components embedded in binaries
//!
//! Matches extracted strings and symbols against a signature corpus and
//! reports confidence-scored component identifications.

#![allow(clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use binsniff::{
    cli::{self, AnalyzeOptions, CurateOptions, ImportOptions},
    config::{AppConfig, CorpusFormat, OutputFormat},
    pipeline::exit_codes,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "binsniff")]
#[command(version)]
#[command(about = "Identify open-source components inside binaries and source trees", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success (no components found, or no --fail-on-match)
    1  Components found with --fail-on-match
    3  Error occurred

EXAMPLES:
    # Analyze a firmware image against a SQLite corpus
    binsniff analyze firmware.bin --corpus signatures.db

    # Walk a directory on 8 workers and emit JSON
    binsniff analyze ./rootfs --corpus signatures.db --workers 8 -o json > report.json

    # Build a corpus from signature documents
    binsniff import signatures/ --database signatures.db

    # Preview genericity curation without touching files
    binsniff curate signatures/ --dry-run")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Corpus selection shared by `analyze` and `check`
#[derive(Parser)]
struct CorpusArgs {
    /// SQLite database or directory of signature documents
    #[arg(short, long)]
    corpus: Option<PathBuf>,

    /// How to read the corpus (auto, sqlite, json)
    #[arg(long)]
    corpus_format: Option<CorpusFormat>,

    /// Configuration preset (balanced, strict, permissive, deep)
    #[arg(long)]
    preset: Option<String>,
}

/// Arguments for the `analyze` subcommand
#[derive(Parser)]
struct AnalyzeArgs {
    /// Files or directories to analyze
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    #[command(flatten)]
    corpus: CorpusArgs,

    /// Minimum confidence for a reported match (0.0-1.0)
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Add fuzzy similarity matching for every file
    #[arg(long)]
    deep: bool,

    /// Analyze files one at a time
    #[arg(long)]
    sequential: bool,

    /// Worker threads for parallel analysis
    #[arg(short, long)]
    workers: Option<usize>,

    /// Do not descend into subdirectories
    #[arg(long)]
    no_recursive: bool,

    /// Only analyze files matching these globs (repeatable)
    #[arg(short, long = "pattern")]
    patterns: Vec<String>,

    /// Output format (summary, json)
    #[arg(short, long)]
    output: Option<OutputFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// List matched patterns under each component
    #[arg(long)]
    show_evidence: bool,

    /// Exit with code 1 if any component is identified
    #[arg(long)]
    fail_on_match: bool,
}

/// Arguments for the `check` subcommand
#[derive(Parser)]
struct CheckArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    /// Output format (summary, json)
    #[arg(short, long)]
    output: Option<OutputFormat>,
}

/// Arguments for the `curate` subcommand
#[derive(Parser)]
struct CurateArgs {
    /// Signature documents or directories of documents
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Report what would be removed without writing
    #[arg(long)]
    dry_run: bool,

    /// Write curated documents here instead of in place
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the `import` subcommand
#[derive(Parser)]
struct ImportArgs {
    /// Signature documents or directories of documents
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// SQLite database to create or extend
    #[arg(short, long)]
    database: PathBuf,

    /// Import generic patterns too
    #[arg(long)]
    keep_generic: bool,

    /// Do not store MinHash sketches
    #[arg(long)]
    no_sketches: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify components in files and directories
    Analyze(AnalyzeArgs),

    /// Load the corpus and report its health
    Check(CheckArgs),

    /// Remove generic patterns from signature documents
    Curate(CurateArgs),

    /// Import signature documents into a SQLite corpus
    Import(ImportArgs),

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .binsniff.yaml in the current directory
    Init,
    /// Generate JSON Schema for the config file format
    Schema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match run(cli) {
        Ok(exit_codes::SUCCESS) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let colored =
        !cli.no_color && std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();

    match cli.command {
        Commands::Analyze(args) => {
            let mut config = session_config(cli.config.as_deref(), &args.corpus)?;
            if let Some(threshold) = args.threshold {
                config.matching.threshold = threshold;
            }
            if args.deep {
                config.fuzzy.deep = true;
            }
            if args.sequential {
                config.batch.parallel = false;
            }
            if args.workers.is_some() {
                config.batch.max_workers = args.workers;
            }
            if args.no_recursive {
                config.batch.recursive = false;
            }
            if !args.patterns.is_empty() {
                config.batch.patterns = args.patterns;
            }
            if let Some(format) = args.output {
                config.output.format = format;
            }
            if args.output_file.is_some() {
                config.output.file = args.output_file;
            }
            if args.show_evidence {
                config.output.show_evidence = true;
            }

            cli::run_analyze(
                &config,
                &AnalyzeOptions {
                    inputs: args.inputs,
                    fail_on_match: args.fail_on_match,
                    colored,
                },
            )
        }

        Commands::Check(args) => {
            let mut config = session_config(cli.config.as_deref(), &args.corpus)?;
            if let Some(format) = args.output {
                config.output.format = format;
            }
            cli::run_check(&config)
        }

        Commands::Curate(args) => {
            let config = cli::resolve_config(cli.config.as_deref(), None)?;
            cli::run_curate(
                &config,
                &CurateOptions {
                    inputs: args.inputs,
                    dry_run: args.dry_run,
                    output_dir: args.output_dir,
                    json: args.json,
                },
            )
        }

        Commands::Import(args) => {
            let config = cli::resolve_config(cli.config.as_deref(), None)?;
            cli::run_import(
                &config,
                &ImportOptions {
                    inputs: args.inputs,
                    database: args.database,
                    keep_generic: args.keep_generic,
                    no_sketches: args.no_sketches,
                },
            )
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "binsniff", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => run_config_action(cli.config.as_deref(), action),
    }
}

/// Preset, config file, then corpus flags.
fn session_config(config_path: Option<&Path>, args: &CorpusArgs) -> Result<AppConfig> {
    let mut config = cli::resolve_config(config_path, args.preset.as_deref())?;
    if args.corpus.is_some() {
        config.corpus.path.clone_from(&args.corpus);
    }
    if let Some(format) = args.corpus_format {
        config.corpus.format = format;
    }
    Ok(config)
}

fn run_config_action(config_path: Option<&Path>, action: ConfigAction) -> Result<i32> {
    match action {
        ConfigAction::Show => {
            let (config, loaded_from) = binsniff::config::load_or_default(config_path);
            if let Some(path) = &loaded_from {
                eprintln!("# Loaded from: {}", path.display());
            } else {
                eprintln!("# No config file found; showing defaults");
            }
            let yaml = serde_yaml_ng::to_string(&config).context("failed to serialize config")?;
            print!("{yaml}");
        }
        ConfigAction::Path => {
            let search_paths: [Option<String>; 3] = [
                std::env::current_dir()
                    .ok()
                    .map(|p| p.display().to_string()),
                dirs::config_dir().map(|p| p.join("binsniff").display().to_string()),
                dirs::home_dir().map(|p| p.display().to_string()),
            ];
            eprintln!("Config file search paths (in order):");
            for path in search_paths.into_iter().flatten() {
                eprintln!("  {path}");
            }
            eprintln!();
            eprintln!("Recognized file names:");
            for name in &[".binsniff.yaml", ".binsniff.yml", "binsniff.yaml", "binsniff.yml"] {
                eprintln!("  {name}");
            }
            eprintln!();
            match binsniff::config::discover_config_file(config_path) {
                Some(path) => eprintln!("Active config file: {}", path.display()),
                None => eprintln!("No config file found."),
            }
        }
        ConfigAction::Init => {
            let target = std::env::current_dir()
                .context("cannot determine current directory")?
                .join(".binsniff.yaml");
            if target.exists() {
                anyhow::bail!(
                    "{} already exists. Remove it first to re-initialize.",
                    target.display()
                );
            }
            let content = binsniff::config::generate_example_config();
            std::fs::write(&target, content)
                .with_context(|| format!("failed to write {}", target.display()))?;
            eprintln!("Created {}", target.display());
        }
        ConfigAction::Schema { output } => {
            let schema = binsniff::config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
        }
    }
    Ok(exit_codes::SUCCESS)
}
