use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use df_core::Config;
use df_feed::OutputTarget;
use df_scrapers::{get_extractor, FeedManager, HttpFetcher, RunReport, ScraperArgs};
use tracing::{error, info, warn};

mod logging;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Builds an RSS 2.0 feed from a government announcement listing",
    long_about = None
)]
pub struct Cli {
    /// JSON configuration file; command-line options take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter such as `debug` or `df_scrapers=trace` (defaults to RUST_LOG, then info)
    #[arg(long)]
    log_level: Option<String>,

    /// Print the feed to stdout instead of writing the output file
    #[arg(long)]
    stdout: bool,

    #[command(flatten)]
    scraper: ScraperArgs,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    cli.scraper.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<(RunReport, OutputTarget)> {
    let config = load_config(&cli)?;

    let fetcher = Arc::new(HttpFetcher::new(&config)?);
    let extractor = get_extractor(&config.profile)?;
    info!("🦗 Using extractor profile {}", extractor.name());

    let target = if cli.stdout {
        OutputTarget::Stdout
    } else {
        OutputTarget::File(config.output.clone())
    };

    let manager = FeedManager::new(config, fetcher, extractor)?;
    let report = manager.run_and_publish(&target).await?;
    Ok((report, target))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref());

    match run(cli).await {
        Ok((report, target)) => {
            for skipped in &report.skipped {
                warn!("Skipped {}: {}", skipped.url, skipped.reason);
            }
            let destination = match &target {
                OutputTarget::File(path) => path.display().to_string(),
                OutputTarget::Stdout => "stdout".to_string(),
            };
            info!(
                "✅ Feed written to {} ({} items, {} of {} announcements skipped, {} duplicates dropped)",
                destination,
                report.document.len(),
                report.skipped.len(),
                report.listed,
                report.duplicates.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["duyuru-feed"]).unwrap();
        assert!(!cli.stdout);
        let config = load_config(&cli).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_url_and_output_flags() {
        let cli = Cli::try_parse_from([
            "duyuru-feed",
            "--url",
            "https://example.gov.tr/duyuru?page=2",
            "-o",
            "out/feed.xml",
            "-m",
            "10",
            "--timeout",
            "20s",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.listing_url, "https://example.gov.tr/duyuru?page=2");
        assert_eq!(config.output, PathBuf::from("out/feed.xml"));
        assert_eq!(config.max_items, 10);
        assert_eq!(config.request_timeout_secs, 20);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"listing_url": "https://example.gov.tr/a", "max_items": 3, "concurrency": 2}}"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from(["duyuru-feed", "--config", &path, "--max-items", "7"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.listing_url, "https://example.gov.tr/a");
        assert_eq!(config.max_items, 7);
        assert_eq!(config.concurrency, 2);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let cli = Cli::try_parse_from(["duyuru-feed", "--concurrency", "0"]).unwrap();
        assert!(load_config(&cli).is_err());

        let cli = Cli::try_parse_from(["duyuru-feed", "--url", "not a url"]).unwrap();
        assert!(load_config(&cli).is_err());

        assert!(Cli::try_parse_from(["duyuru-feed", "--timeout", "soon"]).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_listing_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("feed.xml");
        std::fs::write(&output, "previous").unwrap();

        // a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/duyuru?page=1", addr);
        let cli = Cli::try_parse_from([
            "duyuru-feed",
            "--url",
            url.as_str(),
            "--output",
            output.to_str().unwrap(),
            "--retries",
            "0",
        ])
        .unwrap();

        assert!(run(cli).await.is_err());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous");
    }
}
