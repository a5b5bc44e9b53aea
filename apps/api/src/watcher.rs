//! Scheduled inventory jobs.
//!
//! Two timers, both feeding the notification worker:
//! - a periodic low-stock scan (default every 15 minutes)
//! - the daily inventory summary (default every 24 hours)
//!
//! The first tick of a tokio interval fires immediately; the summary
//! skips it so a server restart does not mail a spurious report.

use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::notifier::{NotificationJob, Notifier};

/// Spawn the inventory watcher timers.
pub fn spawn_watcher(config: &ApiConfig, notifier: Notifier) -> JoinHandle<()> {
    let scan_every = Duration::from_secs(config.stock_scan_interval_secs);
    let summary_every = Duration::from_secs(config.daily_summary_interval_secs);

    tokio::spawn(async move {
        info!(
            scan_secs = scan_every.as_secs(),
            summary_secs = summary_every.as_secs(),
            "Inventory watcher started"
        );

        let mut scan_timer = interval(scan_every);
        let mut summary_timer = interval(summary_every);

        // Swallow the immediate first summary tick.
        summary_timer.tick().await;

        loop {
            tokio::select! {
                _ = scan_timer.tick() => {
                    debug!("Scheduling low-stock scan");
                    notifier.enqueue(NotificationJob::LowStockScan);
                }

                _ = summary_timer.tick() => {
                    debug!("Scheduling daily inventory summary");
                    notifier.enqueue(NotificationJob::DailySummary);
                }
            }
        }
    })
}
