mod display;
mod headless;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pulsewatch_core::config::{DEFAULT_DATA_URL, DEFAULT_ORIGIN};
use pulsewatch_core::{WatchConfig, aggregate, format_message};
use pulsewatch_host::{NotificationSink, Notifier, Scheduler, Watcher};
use pulsewatch_sync::DataSourceClient;

use crate::headless::{ConsoleSink, HeadlessClients};

#[derive(Parser)]
#[command(name = "pulsewatch", version, about = "Watch the statewise feed and notify on new data")]
struct Cli {
    /// Feed to poll.
    #[arg(long, env = "PULSEWATCH_DATA_URL", default_value = DEFAULT_DATA_URL, global = true)]
    data_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the feed until interrupted, printing a notification for each new publication.
    Watch {
        /// Milliseconds between polls.
        #[arg(
            long,
            env = "PULSEWATCH_INTERVAL_MS",
            default_value_t = 10_000,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        interval_ms: u64,

        /// Dashboard origin; notification clicks open `<origin>/`.
        #[arg(long, env = "PULSEWATCH_ORIGIN", default_value = DEFAULT_ORIGIN)]
        origin: String,
    },
    /// Probe and fetch the feed once and print the summary.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("pulsewatch v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Watch {
            interval_ms,
            origin,
        } => {
            let config = WatchConfig {
                data_url: cli.data_url,
                poll_interval: Duration::from_millis(interval_ms),
                origin,
            };
            watch(config).await
        }
        Command::Check => check(&cli.data_url).await,
    }
}

async fn watch(config: WatchConfig) -> anyhow::Result<()> {
    let source = Arc::new(DataSourceClient::new(config.data_url.clone()));
    let sink: Arc<dyn NotificationSink> = Arc::new(ConsoleSink::default());
    let notifier = Notifier::new(&config, Some(sink), Arc::new(HeadlessClients));
    let scheduler = Scheduler::new(&config, source.clone(), source, notifier);

    let watcher = Watcher::new(scheduler);
    watcher.on_activate();

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    watcher.shutdown();
    Ok(())
}

async fn check(data_url: &str) -> anyhow::Result<()> {
    let source = DataSourceClient::new(data_url);

    let modified = source
        .probe_modification_time()
        .await
        .context("probing feed modification time")?;
    let payload = source.fetch_snapshot().await.context("fetching feed")?;
    let snapshot = aggregate(payload.rows()).context("feed has no statewise rows")?;
    let message = format_message(&snapshot);

    let last_updated = payload
        .rows()
        .first()
        .map(|head| head.lastupdatedtime.as_str())
        .unwrap_or_default();
    print!(
        "{}",
        display::render_check(modified, last_updated, &snapshot, &message)
    );
    Ok(())
}
