//! PaperScout CLI: summarize research text and discover related arXiv papers.

mod commands;
mod render;

use clap::Parser;
use paperscout_core::LengthTier;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// PaperScout: research paper assistant for the terminal
#[derive(Parser, Debug)]
#[command(name = "paperscout", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace directory (for `.paperscout/config.toml`)
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Where the research text comes from. Reads stdin when neither is given.
#[derive(clap::Args, Debug, Clone, Default)]
struct InputArgs {
    /// PDF or plain-text file to read
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Research text passed inline
    #[arg(short, long)]
    text: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Summarize research text and report its keywords and intent
    Summarize {
        #[command(flatten)]
        input: InputArgs,

        /// Summary length: short, medium, long
        #[arg(short, long, default_value = "medium")]
        length: LengthTier,
    },
    /// Suggest papers related to research text, using its keywords
    Related {
        #[command(flatten)]
        input: InputArgs,

        /// Number of papers to return
        #[arg(short = 'n', long = "max-results")]
        max_results: Option<usize>,
    },
    /// Search arXiv directly with a query
    Search {
        /// Search query, e.g. "smart autonomous drone"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Number of papers to return
        #[arg(short = 'n', long = "max-results")]
        max_results: Option<usize>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create a default workspace configuration file
    Init,
    /// Show the effective configuration
    Show,
}

fn stderr_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Human-readable layer for stderr (always active)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(stderr_filter(cli.verbose, cli.quiet)));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "paperscout", "paperscout")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "paperscout.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let options = commands::OutputOptions { json: cli.json };
    match commands::handle_command(cli.command, &workspace, options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("{}", render::status_line(&err));
            ExitCode::from(commands::exit_code(&err))
        }
    }
}
