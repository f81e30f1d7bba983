//! Timers driving a mounted dashboard cache.

use super::{DashboardCache, RefreshOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Shortest timer period; `tokio::time::interval` panics on zero.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Runs the refresh timer and the countdown timer for a cache.
///
/// Dropping the poller stops both timers, including a refresh the refresh
/// timer is currently awaiting. Refreshes started elsewhere are unaffected.
pub struct DashboardPoller {
    refresh_task: JoinHandle<()>,
    countdown_task: JoinHandle<()>,
}

impl DashboardPoller {
    /// Refresh once now, then every refresh interval; tick the countdown
    /// every `countdown_tick`.
    pub fn spawn(cache: Arc<DashboardCache>, countdown_tick: Duration) -> Self {
        let interval = cache.refresh_interval().max(MIN_PERIOD);
        let countdown_tick = countdown_tick.max(MIN_PERIOD);

        let refresh_cache = cache.clone();
        let refresh_task = tokio::spawn(async move {
            let first_tick = Instant::now() + interval;
            log_outcome(&refresh_cache.refresh().await);

            let mut ticker = tokio::time::interval_at(first_tick, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                log_outcome(&refresh_cache.refresh().await);
            }
        });

        let countdown_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(countdown_tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                cache.tick_countdown();
            }
        });

        info!(?interval, "Dashboard polling started");
        Self {
            refresh_task,
            countdown_task,
        }
    }

    /// Stop both timers.
    pub fn shutdown(self) {
        drop(self);
    }

    pub fn is_running(&self) -> bool {
        !self.refresh_task.is_finished() && !self.countdown_task.is_finished()
    }
}

impl Drop for DashboardPoller {
    fn drop(&mut self) {
        self.refresh_task.abort();
        self.countdown_task.abort();
        debug!("Dashboard polling stopped");
    }
}

fn log_outcome(outcome: &RefreshOutcome) {
    match outcome {
        RefreshOutcome::Unauthenticated => debug!("Scheduled refresh skipped: not signed in"),
        RefreshOutcome::Stale => debug!("Scheduled refresh superseded"),
        RefreshOutcome::Committed { .. } | RefreshOutcome::Failed(_) => {}
    }
}
