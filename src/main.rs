use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};
use colored::Colorize;
use readtrack::commands::{self, CliContext, check::CheckOptions};
use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "readtrack",
    version = readtrack::VERSION,
    about = "Track observed files and detect stale copies",
    long_about = "Records which files were read, what they looked like, and whether that view still matches the disk"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ~/.config/readtrack/config.toml)
    #[arg(short, long, global = true, env = "READTRACK_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture and print snapshots without tracking
    Capture {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Track files, then report which copies went stale
    Check {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Milliseconds to wait before checking
        #[arg(short, long)]
        wait_ms: Option<u64>,

        /// Re-read every file after checking
        #[arg(short, long)]
        refresh: bool,

        /// Show diffs for stale files
        #[arg(short, long)]
        diff: bool,
    },

    /// Get and set configuration options
    Config {
        /// Configuration key (e.g., tracking.max_tracked_files)
        key: Option<String>,

        /// Value to set
        value: Option<String>,

        /// Write the current configuration to the config file
        #[arg(long, conflicts_with_all = ["key", "value"])]
        init: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Capture { paths } => {
            let ctx = CliContext::load(cli.config)?;
            commands::capture::execute(&ctx, &paths)?;
        }
        Commands::Check {
            paths,
            wait_ms,
            refresh,
            diff,
        } => {
            let ctx = CliContext::load(cli.config)?;
            let options = CheckOptions {
                wait: wait_ms.map(Duration::from_millis),
                refresh,
                show_diffs: diff,
            };
            commands::check::execute(&ctx, &paths, &options)?;
        }
        Commands::Config { key, value, init } => {
            let mut ctx = CliContext::load(cli.config)?;
            commands::config::execute(&mut ctx, key.as_deref(), value.as_deref(), init)?;
        }
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "readtrack=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
