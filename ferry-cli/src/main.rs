//! Ferry CLI - Command line interface for repo-ferry
//!
//! Scrape repository metadata, replay it into another repository, and label
//! unlabeled issues with a language model.

mod commands;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ferry_core::config::CliOverrides;
use ferry_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{AnalyzeArgs, AutolabelArgs, PopulateArgs, ScrapeArgs};

/// repo-ferry: move issues, labels and history between GitHub repositories
#[derive(Parser, Debug)]
#[command(name = "ferry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository to scrape (owner/repo or URL)
    #[arg(long, global = true)]
    source: Option<String>,

    /// Repository to populate and label (owner/repo or URL)
    #[arg(long, global = true)]
    target: Option<String>,

    /// Directory holding the scraped JSON files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Language model to use (overrides config and env)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Show current configuration
    Config,

    /// Fetch metadata from the source repository into JSON files
    Scrape(ScrapeArgs),

    /// Recreate scraped labels or issues in the target repository
    Populate(PopulateArgs),

    /// Suggest and apply labels for unlabeled issues in the target repository
    Autolabel(AutolabelArgs),

    /// Describe the layout of a local checkout
    Analyze(AnalyzeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let config = Config::load_with_overrides(CliOverrides {
        source: cli.source.clone(),
        target: cli.target.clone(),
        data_dir: cli.data_dir.clone(),
        model: cli.model.clone(),
    })?;

    if cli.verbose {
        tracing::info!(
            source = ?config.repos.source,
            target = ?config.repos.target,
            data_dir = %config.paths.data_dir.display(),
            model = %config.llm.model,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("ferry {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Config) => print_config(&config),
        Some(Commands::Scrape(args)) => args.execute(&config).await?,
        Some(Commands::Populate(args)) => args.execute(&config).await?,
        Some(Commands::Autolabel(args)) => args.execute(&config).await?,
        Some(Commands::Analyze(args)) => args.execute(&config)?,
        None => {
            println!("repo-ferry - move repository metadata between GitHub repositories");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    println!("Ferry Configuration");
    println!("===================");
    println!();
    println!("Repositories:");
    println!("  source: {}", config.repos.source.as_deref().unwrap_or("(not set)"));
    println!("  target: {}", config.repos.target.as_deref().unwrap_or("(not set)"));
    println!();
    println!("Paths:");
    println!("  data_dir: {}", config.paths.data_dir.display());
    println!();
    println!("Language Model:");
    println!("  model: {}", config.llm.model);
    println!("  temperature: {}", config.llm.temperature);
    println!("  timeout: {}s", config.llm.timeout.as_secs());
    println!();
    println!("Labeling:");
    println!("  max_attempts: {}", config.labeling.max_attempts);
    println!("  retry_delay: {}s", config.labeling.retry_delay.as_secs());
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
