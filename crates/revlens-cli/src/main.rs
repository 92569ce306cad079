mod annotate;
mod languages;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use revlens_core::{AppConfig, ConfigError};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "revlens")]
#[command(about = "Sentence-level sentiment and topic annotation for app-store reviews")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Annotate a cleaned review table and write the output tables
    Annotate {
        /// Input CSV with `id, app_name, country, cleaned_content` columns
        #[arg(long)]
        input: PathBuf,
        /// Directory for the output tables (overrides `REVLENS_OUTPUT_DIR`)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Rebuild notebook summaries and topic statistics from a structured table
    Summarize {
        /// A `reviews_sentiment_topics.csv` written by `annotate`
        #[arg(long)]
        input: PathBuf,
        /// Directory for the output tables (overrides `REVLENS_OUTPUT_DIR`)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Detect and resolve the language of each review, as CSV on stdout
    Detect {
        /// Input CSV with `country` and a text column
        #[arg(long)]
        input: PathBuf,
    },
    /// Resolve language or country codes to supported languages
    Resolve {
        /// Codes to resolve, e.g. `se mx pt`
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = revlens_core::load_app_config();
    init_tracing(config.as_ref().map_or("info", |c| c.log_level.as_str()));

    if let Err(err) = run(cli, config).await {
        tracing::error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            tracing::error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Result<AppConfig, ConfigError>) -> anyhow::Result<()> {
    let config = config.context("failed to load configuration")?;

    match cli.command {
        Commands::Annotate { input, output_dir } => {
            annotate::run_annotate(&config, &input, output_dir.as_deref()).await
        }
        Commands::Summarize { input, output_dir } => {
            annotate::run_summarize(&config, &input, output_dir.as_deref())
        }
        Commands::Detect { input } => languages::run_detect(&config, &input),
        Commands::Resolve { codes } => languages::run_resolve(&config, &codes),
    }
}

/// `RUST_LOG` wins; otherwise the configured level, falling back to `info`.
fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
