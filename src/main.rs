//! Pricewatch CLI
//!
//! Run with: cargo run -- <METRIC_ID> [--morning-report]
//!
//! Without a mode flag one check cycle runs: fetch, compare with the last
//! sample, notify if the threshold is crossed, persist. Schedule it
//! externally (cron, systemd timer) and never overlap runs of one metric.
//!
//! Environment variables: see `pricewatch::config`.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use pricewatch::alerts::Notifier;
use pricewatch::config::AppConfig;
use pricewatch::monitor::{history_overview, import_log, MonitorRun, MorningReport};
use pricewatch::source::{build_source, synthetic};
use pricewatch::storage::{FileBackend, HistoryStore, PersistenceConfig, StateStore};

#[derive(Parser, Debug)]
#[command(version, about = "Threshold alerts for prices, FX rates and treasury yields")]
struct Args {
    /// Metric id from the config file
    metric: String,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Summarize yesterday and send a report instead of checking thresholds
    #[arg(long, conflicts_with_all = ["history_summary", "import_log"])]
    morning_report: bool,

    /// Print whole-history statistics for charting
    #[arg(long, conflicts_with = "import_log")]
    history_summary: bool,

    /// With --history-summary: use a synthetic series of this many days (1-365)
    #[arg(
        long,
        requires = "history_summary",
        value_parser = clap::value_parser!(u32).range(1..=synthetic::MAX_SYNTHETIC_DAYS as i64)
    )]
    synthetic_days: Option<u32>,

    /// Import points from a legacy log file into the history store
    #[arg(long, value_name = "PATH")]
    import_log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config_path = AppConfig::resolve_path(args.config.as_deref());
    let config = AppConfig::load(&config_path)?;

    init_logging(&config)?;

    let metric = config
        .metric(&args.metric)
        .ok_or_else(|| format!("metric {:?} is not configured", args.metric))?;

    let persistence = PersistenceConfig::new(&config.state_dir);
    let state = StateStore::new(FileBackend::new(persistence.clone())?);
    let history = HistoryStore::new(FileBackend::new(persistence)?);

    if let Some(path) = &args.import_log {
        let stats = import_log(metric, &history, path, Local)?;
        println!(
            "Imported {} points ({} malformed lines skipped)",
            stats.matched, stats.malformed
        );
        return Ok(());
    }

    let source = build_source(&metric.id, &metric.source, metric.timeout())?;

    if args.history_summary {
        let points = match args.synthetic_days {
            Some(days) => {
                let current = source.fetch().await?;
                let reference = current
                    .value
                    .get(metric.rule.series())
                    .ok_or("current sample has no value for the configured series")?;
                tracing::warn!(days, "Using synthetic history, not real data");
                synthetic::generate_history(reference, days, Utc::now(), &mut rand::thread_rng())
            }
            None => history.points(&metric.id, metric.rule.series())?,
        };
        print!("{}", history_overview(&points).render(metric));
        return Ok(());
    }

    let notifier = Notifier::new(config.notify.targets.clone())?;

    if args.morning_report {
        MorningReport::new(metric, source.as_ref(), &notifier, &state, &history)
            .execute(Local::now())
            .await?;
    } else {
        MonitorRun::new(metric, source.as_ref(), &notifier, &state, &history)
            .execute()
            .await?;
    }

    Ok(())
}

fn init_logging(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pricewatch=info".into())
    };

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter()),
        )
        .with(file_layer)
        .init();

    Ok(())
}
