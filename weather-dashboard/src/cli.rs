use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::{info, warn};
use weather_archive::{
    ArchiveStore, ArchiveWriter, Config, ContainerStatus, MemoryStore, OpenWeatherClient, S3Store,
    archive_batch, fetch_batch, parse_city_list,
};

use crate::render;

const DEFAULT_CITIES: &str = "Philadelphia, Seattle, New York";

/// Container name for `--dry-run` when no bucket is configured.
const DRY_RUN_CONTAINER: &str = "weather-dashboard-dry-run";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard with S3 archiving")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store API key and bucket settings in the config file.
    Configure,

    /// Fetch current weather for a list of cities and render the dashboard.
    Fetch {
        /// Comma-separated city names; prompts when absent.
        cities: Option<String>,

        /// Skip archiving observations.
        #[arg(long)]
        no_archive: bool,

        /// Archive into an in-memory store instead of S3.
        #[arg(long, conflicts_with = "no_archive")]
        dry_run: bool,

        /// Print rows as JSON instead of tables and charts.
        #[arg(long)]
        json: bool,
    },

    /// Print an archived record.
    Inspect {
        /// Object key, e.g. "weather-data/Seattle-20260105-140207.json".
        key: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Fetch { cities, no_archive, dry_run, json } => {
                let config = Config::load()?;
                let archive = archive_store(&config, no_archive, dry_run).await?;
                fetch(&config, cities, archive, json).await
            }
            Command::Inspect { key } => {
                let config = Config::load()?;
                let writer = ArchiveWriter::new(S3Store::from_config(&config).await?);
                let record = writer
                    .load(&key)
                    .await
                    .with_context(|| format!("Failed to load archived record '{key}'"))?;
                println!("{}", serde_json::to_string_pretty(&record)?);
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load_file()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    config.api_key = Some(api_key.trim().to_string()).filter(|k| !k.is_empty()).or(config.api_key);

    let bucket = Text::new("Archive bucket name:")
        .with_default(config.bucket.as_deref().unwrap_or("weather-dashboard-archive"))
        .prompt()?;
    config.bucket = Some(bucket.trim().to_string()).filter(|b| !b.is_empty());

    let region = Text::new("AWS region (blank for SDK default):")
        .with_default(config.region.as_deref().unwrap_or(""))
        .prompt()?;
    config.region = Some(region.trim().to_string()).filter(|r| !r.is_empty());

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn archive_store(
    config: &Config,
    no_archive: bool,
    dry_run: bool,
) -> anyhow::Result<Option<Box<dyn ArchiveStore>>> {
    if no_archive {
        return Ok(None);
    }

    let store: Box<dyn ArchiveStore> = if dry_run {
        Box::new(MemoryStore::new(config.bucket.as_deref().unwrap_or(DRY_RUN_CONTAINER)))
    } else {
        Box::new(S3Store::from_config(config).await?)
    };
    Ok(Some(store))
}

async fn fetch(
    config: &Config,
    cities: Option<String>,
    archive: Option<Box<dyn ArchiveStore>>,
    json: bool,
) -> anyhow::Result<()> {
    let input = match cities {
        Some(cities) => cities,
        None => Text::new("Enter cities (comma-separated)").with_default(DEFAULT_CITIES).prompt()?,
    };
    let cities = parse_city_list(&input);
    let client = OpenWeatherClient::from_config(config)?;

    let spinner = ProgressBar::new_spinner()
        .with_message(format!("Fetching weather for {} cities", cities.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let batch = fetch_batch(&client, &cities).await;
    spinner.finish_and_clear();

    if batch.is_empty() {
        bail!("Failed to fetch weather data for the cities provided.");
    }

    if let Some(store) = archive {
        let writer = ArchiveWriter::new(store);
        if writer.ensure_container_exists().await == ContainerStatus::Unavailable {
            warn!("archive bucket unavailable, writes will likely fail");
        }

        let summary = archive_batch(&writer, &batch.observations).await;
        info!(written = summary.written.len(), failed = summary.failures.len(), "archive finished");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&batch.rows)?);
    } else {
        print!("{}", render::dashboard(&batch.rows));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dry_run_works_without_bucket() {
        let store = archive_store(&Config::default(), false, true).await.unwrap();

        let store = store.expect("dry run should archive to memory");
        assert_eq!(store.container(), DRY_RUN_CONTAINER);
    }

    #[tokio::test]
    async fn dry_run_uses_configured_bucket() {
        let config = Config { bucket: Some("my-archive".into()), ..Config::default() };
        let store = archive_store(&config, false, true).await.unwrap().unwrap();

        assert_eq!(store.container(), "my-archive");
    }

    #[tokio::test]
    async fn no_archive_skips_store() {
        let store = archive_store(&Config::default(), true, false).await.unwrap();
        assert!(store.is_none());
    }
}
