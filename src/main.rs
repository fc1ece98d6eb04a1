use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use rss_reader::config::Config;
use rss_reader::feed::{self, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "rss_reader", about = "Pure Rust command-line RSS reader.")]
struct Args {
    /// RSS URL
    source: String,

    /// Print result as JSON in stdout
    #[arg(long)]
    json: bool,

    /// Print labeled text even when the config file asks for JSON
    #[arg(long, conflicts_with = "json")]
    text: bool,

    /// Limit news topics if this parameter provided
    #[arg(long, value_name = "N")]
    limit: Option<NonZeroUsize>,

    /// Config file (default: ~/.config/rss_reader/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the rendered feed
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => Config::default(),
    };

    let client = reqwest::Client::builder()
        .user_agent(config.fetch.user_agent.clone())
        .build()
        .context("Failed to build HTTP client")?;

    let document = feed::fetch_document(&client, &args.source, &config.fetch)
        .await
        .with_context(|| format!("Failed to fetch feed from {}", args.source))?;

    let requested = match (args.json, args.text) {
        (true, _) => Some(OutputFormat::Json),
        (_, true) => Some(OutputFormat::Text),
        _ => None,
    };
    let format = config.output_format(requested);
    let limit = args.limit.or(config.limit);
    tracing::debug!(?format, limit = limit.map(NonZeroUsize::get), "Rendering feed");

    let lines = feed::render(&document, limit, format)
        .with_context(|| format!("Failed to read feed from {}", args.source))?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", lines.join("\n")).context("Failed to write to stdout")?;

    Ok(())
}
