use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use dailynews::config::Config;
use dailynews::feed::{build_client, collect_entries, load_feeds, Collection};
use dailynews::output::{write_digest, write_report, Digest};
use dailynews::util::{config_dir, expand_home};

#[derive(Parser, Debug)]
#[command(name = "dailynews", about = "Daily RSS/Atom digest and insight report")]
struct Args {
    /// Config file (defaults to ~/.config/dailynews/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch recent entries and write them as a JSON digest
    Fetch {
        /// Destination of the JSON digest
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Trailing window in hours (overrides the config)
        #[arg(long, value_name = "N")]
        window_hours: Option<u64>,

        /// Extra feed URLs, one per line
        #[arg(long, value_name = "FILE")]
        feeds_file: Option<PathBuf>,
    },

    /// Fetch recent entries and write the markdown insight report
    Report {
        /// Directory for the report (overrides the config)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Trailing window in hours (overrides the config)
        #[arg(long, value_name = "N")]
        window_hours: Option<u64>,

        /// Extra feed URLs, one per line
        #[arg(long, value_name = "FILE")]
        feeds_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries the result line
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Fetch {
            output,
            window_hours,
            feeds_file,
        } => {
            let window_hours = window_hours.unwrap_or(config.window_hours);
            let now = Utc::now();
            let (feeds, collection) =
                collect(&config, window_hours, feeds_file.as_deref(), now).await?;

            let output = expand_home(&output);
            let digest = Digest::new(now, window_hours, &feeds, &collection.entries);
            write_digest(&output, &digest)
                .with_context(|| format!("Failed to write digest to '{}'", output.display()))?;
            eprintln!(
                "Wrote {} entries to {}",
                digest.entries.len(),
                output.display()
            );
        }
        Command::Report {
            output_dir,
            window_hours,
            feeds_file,
        } => {
            let window_hours = window_hours.unwrap_or(config.window_hours);
            let report_options = config.report_options()?;
            let now = Utc::now();
            let (_, collection) =
                collect(&config, window_hours, feeds_file.as_deref(), now).await?;

            let output_dir = output_dir.unwrap_or_else(|| config.report.output_dir.clone());
            let output_dir = expand_home(&output_dir);
            match write_report(&output_dir, &collection.entries, now, &report_options)? {
                Some(path) => println!("Written {}", path.display()),
                None => println!(
                    "No new entries within the last {}h after filtering.",
                    window_hours
                ),
            }
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => expand_home(path),
        None => match config_dir() {
            Some(dir) => dir.join("config.toml"),
            None => {
                tracing::debug!("HOME not set, using default configuration");
                return Ok(Config::default());
            }
        },
    };
    Config::load(&path).with_context(|| format!("Failed to load config '{}'", path.display()))
}

/// Resolves the feed list and collects entries inside the window.
async fn collect(
    config: &Config,
    window_hours: u64,
    feeds_file: Option<&Path>,
    now: DateTime<Utc>,
) -> Result<(Vec<String>, Collection)> {
    let options = config.fetch_options(window_hours)?;
    let feeds = load_feeds(&config.feeds, feeds_file).await?;
    let client = build_client(&config.user_agent, options.timeout)
        .context("Failed to build HTTP client")?;

    tracing::info!(feeds = feeds.len(), window_hours = window_hours, "Collecting feeds");
    let collection = collect_entries(&client, &feeds, &options, now).await;

    let failed = collection.failures().count();
    if failed > 0 {
        tracing::warn!(
            failed = failed,
            total = feeds.len(),
            "Some feeds could not be collected"
        );
    }

    Ok((feeds, collection))
}
