//! Stream resolver CLI.
//!
//! Resolves one canonical catalog id and episode index to a playable URL,
//! printing the result or the kind-specific failure.

use anyhow::{Context, Result};
use clap::Parser;
use shared::Config;
use std::path::PathBuf;
use std::sync::Arc;
use stream_resolver::{CatalogClient, EpisodeResolver, RateGovernor, SecondaryClient};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Catalog (MAL) id of the anime to resolve
    #[arg(short, long)]
    mal_id: u32,

    /// Zero-based episode index
    #[arg(short, long, default_value_t = 0)]
    episode: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.logging.log_dir.clone(),
        component: "stream-resolver".to_string(),
        default_level: log_level,
        console: config.logging.console,
        file: config.logging.file,
        json_format: config.logging.json_format,
    })?;

    info!(config_file = %args.config.display(), "Stream resolver starting");

    // One governor per rate-limited upstream, shared by every catalog call
    let governor = Arc::new(RateGovernor::from_millis(
        config.catalog.min_request_interval_ms,
    ));

    let catalog = CatalogClient::new(
        config.catalog.base_url.clone(),
        governor,
        config.catalog.page_size,
    )?;
    let secondary = SecondaryClient::new(
        config.relay.base_url.clone(),
        config.relay.source.clone(),
    )?;

    let resolver = EpisodeResolver::new(catalog, secondary);

    match resolver.resolve(args.mal_id, args.episode).await {
        Ok((anime, target)) => {
            info!(
                mal_id = args.mal_id,
                title = %anime.canonical.title,
                matched = %anime.matched.candidate.title,
                match_kind = %anime.matched.kind,
                episodes = anime.episodes.len(),
                "Resolution complete"
            );
            println!("{}", target.url);
            if let Some(server) = target.server {
                println!("server: {server}");
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                mal_id = args.mal_id,
                episode = args.episode,
                kind = e.kind(),
                retryable = e.is_retryable(),
                error = %e,
                "Resolution failed"
            );
            Err(e.into())
        }
    }
}
