//! kaenguru-crawler main entry point
//!
//! Command-line interface for crawling the Känguru comic archive and
//! publishing the result to a gist.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use kaenguru_crawler::config::{self, Config};
use kaenguru_crawler::crawler::Coordinator;
use kaenguru_crawler::gist::{Gist, GistClient};
use kaenguru_crawler::output::{open_output, read_file_or_stdin};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// kaenguru-crawler: collects every Känguru comic into one JSON file
#[derive(Parser, Debug)]
#[command(name = "kaenguru-crawler")]
#[command(version)]
#[command(about = "Crawls the Känguru comic archive", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Append log output to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    logfile: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the archive and write all comics as JSON
    Crawl(CrawlArgs),

    /// Replace the comics file of a GitHub gist (token from GITHUB_TOKEN)
    UpdateGist(UpdateGistArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Seconds to wait for each page result
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Write the result to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output_file: Option<PathBuf>,

    /// Archive listing URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Maximum number of pages processed at the same time
    #[arg(long, value_name = "N")]
    max_concurrent_pages: Option<u32>,
}

#[derive(Args, Debug)]
struct UpdateGistArgs {
    /// ID of the gist to update
    #[arg(long, value_name = "ID")]
    gist_id: String,

    /// JSON file to upload, `-` reads stdin
    #[arg(short, long, value_name = "PATH", default_value = "-")]
    file: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, cli.logfile.as_deref())?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Crawl(args) => handle_crawl(config, args).await,
        Command::UpdateGist(args) => handle_update_gist(&config, args).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs never go to stdout, which carries the JSON result.
fn setup_logging(verbose: u8, quiet: bool, logfile: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kaenguru_crawler=info,warn"),
            1 => EnvFilter::new("kaenguru_crawler=debug,info"),
            2 => EnvFilter::new("kaenguru_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match logfile {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        tracing::info!("Loading configuration from: {}", path.display());
    }

    let config = config::load_config_or_default(path).context("Failed to load configuration")?;
    Ok(config)
}

/// Handles the crawl subcommand
async fn handle_crawl(mut config: Config, args: CrawlArgs) -> anyhow::Result<()> {
    if let Some(timeout) = args.timeout {
        config.crawler.timeout_seconds = timeout;
    }
    if let Some(base_url) = args.base_url {
        config.crawler.base_url = base_url;
    }
    if let Some(limit) = args.max_concurrent_pages {
        config.crawler.max_concurrent_pages = Some(limit);
    }
    if let Some(path) = args.output_file {
        config.output.path = Some(path.to_string_lossy().into_owned());
    }

    config::validate(&config).context("Invalid configuration")?;

    tracing::info!(
        "Crawling {} (timeout {}s per page)",
        config.crawler.base_url,
        config.crawler.timeout_seconds
    );

    let coordinator = Coordinator::new(&config.crawler)?;
    let comics = match coordinator.crawl_all().await {
        Ok(comics) => comics,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let path = config.output.path.as_deref().map(Path::new);
    let mut output = open_output(path).context("Failed to open output")?;
    output
        .write_comics(&comics)
        .context("Failed to write crawl result")?;

    tracing::info!("Wrote {} comics", comics.len());
    Ok(())
}

/// Handles the update-gist subcommand
async fn handle_update_gist(config: &Config, args: UpdateGistArgs) -> anyhow::Result<()> {
    let content = read_file_or_stdin(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file))?;

    let client = GistClient::from_env(&config.gist)?;
    let gist = Gist::from_config(&config.gist, content);
    let status = client.update(&args.gist_id, &gist).await?;

    tracing::info!("Gist update finished with status {}", status);
    Ok(())
}
