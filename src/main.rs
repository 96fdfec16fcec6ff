use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use farewatch::config::{Settings, WatchConfig};
use farewatch::core::retry::TokioSleep;
use farewatch::runner::{monitor, sweep};
use farewatch::services::{Fetcher, SheetsClient, TopicPublisher};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "farewatch", about = "Airline seat-map price monitor and bulk fare sweep")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one monitoring cycle over the configured trips
    Monitor,
    /// Sweep a date range for daily offer prices, then report minimums
    Sweep {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Report minimum observed prices from the last sweep
    Min,
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "plain".to_string());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true);
    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    let cli = Cli::parse();

    // Configuration errors are fatal at startup; nothing runs partially.
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Monitor => run_monitor(&settings).await,
        Commands::Sweep { from, to } => run_sweep(&settings, from, to).await,
        Commands::Min => {
            if let Err(e) = sweep::report_min_prices(&settings.sweep.output_path) {
                error!("Unable to read price table: {}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn run_monitor(settings: &Settings) {
    let watch = match WatchConfig::from_path(&settings.monitor.watch_config_path) {
        Ok(watch) => watch,
        Err(e) => {
            error!("Failed to load watch config: {}", e);
            std::process::exit(1);
        }
    };
    info!("Loaded watch config with {} trip(s)", watch.trips.len());

    let fetcher = Fetcher::new();
    let notify = TopicPublisher::new(settings.notify.topic_url.clone());
    let sheets = SheetsClient::new(
        settings.sheets.base_url.clone(),
        settings.sheets.token.clone(),
    );

    let report = monitor::run_cycle(
        &watch,
        &fetcher,
        &notify,
        &sheets,
        &TokioSleep,
        Utc::now().naive_utc(),
    )
    .await;
    info!(
        "Cycle done: {} trip(s) checked, {} skipped, {} alert(s), {} row(s){}",
        report.trips_checked,
        report.trips_skipped,
        report.alerts_published,
        report.rows_buffered,
        if report.degraded_write {
            " (degraded write)"
        } else {
            ""
        }
    );
}

async fn run_sweep(settings: &Settings, from: NaiveDate, to: NaiveDate) {
    if to < from {
        error!("Invalid range: {} is before {}", to, from);
        std::process::exit(1);
    }
    let fetcher = Arc::new(Fetcher::new());
    match sweep::run_sweep(&settings.sweep, fetcher, Arc::new(TokioSleep), from, to).await {
        Ok(table) => {
            info!("Sweep complete: {} samples", table.len());
            if let Err(e) = sweep::report_min_prices(&settings.sweep.output_path) {
                error!("Unable to report minimum prices: {}", e);
            }
        }
        Err(e) => {
            error!("Sweep failed: {}", e);
            std::process::exit(1);
        }
    }
}
