mod config;
mod db;
mod error;
mod models;
mod notify;
mod processor;
mod schedule;

use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use config::AppConfig;
use db::PgAlertStore;
use models::alert::Channel;
use notify::delivery::DeliveryClient;
use processor::engine::{self, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Contractwekker alert engine...");

    // Init DB
    let pool = db::init_pool(&config.database_url).await?;
    info!("Connected to database");

    let store = PgAlertStore::new(pool);
    let notifier = DeliveryClient::new(&config)?;
    let engine_config = EngineConfig {
        batch_size: config.batch_size,
        max_batches: config.max_batches,
        base_url: config.base_url.clone(),
    };

    // One tick at a time: runs never overlap, which keeps due-selection and
    // the per-alert updates free of duplicate-send races.
    let mut ticker = tokio::time::interval(Duration::from_secs(config.run_interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut consecutive_failures: u32 = 0;

    loop {
        ticker.tick().await;

        if consecutive_failures >= config.max_consecutive_failures {
            warn!(
                "{} consecutive failed runs, cooling down for {} seconds",
                consecutive_failures, config.failure_cooldown_secs
            );
            tokio::time::sleep(Duration::from_secs(config.failure_cooldown_secs)).await;
            consecutive_failures = 0;
            info!("Cooldown over, resuming runs");
        }

        let as_of = Utc::now().date_naive();

        for channel in [Channel::Email, Channel::Push] {
            match engine::run_channel(&store, &notifier, channel, as_of, &engine_config).await {
                Ok(summary) => {
                    consecutive_failures = 0;
                    if summary.selected > 0 {
                        info!(
                            "{} run: {} sent, {} failed, {} skipped",
                            channel.as_str(),
                            summary.delivered,
                            summary.failed,
                            summary.skipped
                        );
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    error!(
                        channel = channel.as_str(),
                        error = %e,
                        "run aborted ({} / {})",
                        consecutive_failures,
                        config.max_consecutive_failures
                    );
                }
            }
        }
    }
}
