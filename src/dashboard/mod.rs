//! Polling cache for the arbitrage dashboard.
//!
//! [`DashboardCache`] owns the two datasets and performs refresh cycles.
//! [`DashboardPoller`] mounts a cache: it refreshes once immediately, then on
//! every refresh interval, and recomputes the countdown every second.
//! Consumers read [`DashboardState`] snapshots through a watch channel.

mod cache;
mod poller;

pub use cache::{DashboardCache, RefreshOutcome};
pub use poller::DashboardPoller;

use crate::error::Result;
use crate::state::{ArbiPairRow, ArbiTrackRow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

/// Where arbitrage data comes from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArbitrageSource: Send + Sync {
    /// Fetch the pair table with the given bearer token.
    async fn fetch_pairs(&self, token: &str) -> Result<Vec<ArbiPairRow>>;

    /// Fetch the per-coin track table with the given bearer token.
    async fn fetch_track(&self, token: &str) -> Result<Vec<ArbiTrackRow>>;
}

/// Snapshot of the dashboard data.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub pair_rows: Vec<ArbiPairRow>,
    pub track_rows: Vec<ArbiTrackRow>,
    /// Last hard-failure message; cleared by the next commit.
    pub error: Option<String>,
    /// Start of the current countdown.
    pub last_refresh_time: Instant,
    /// Wall-clock time of the last commit, for display.
    pub last_refreshed_at: Option<DateTime<Utc>>,
    /// Whole seconds until the next scheduled refresh.
    pub time_until_next_refresh: u64,
    /// Set once the first refresh attempt completes. Never reset.
    pub initialized: bool,
}

impl DashboardState {
    /// Empty state whose countdown starts now.
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            pair_rows: Vec::new(),
            track_rows: Vec::new(),
            error: None,
            last_refresh_time: Instant::now(),
            last_refreshed_at: None,
            time_until_next_refresh: seconds_until_refresh(refresh_interval, Duration::ZERO),
            initialized: false,
        }
    }

    /// Nothing has been fetched yet.
    pub fn is_loading(&self) -> bool {
        !self.initialized
    }
}

/// `max(0, ceil((interval - elapsed) / 1s))`.
pub fn seconds_until_refresh(interval: Duration, elapsed: Duration) -> u64 {
    let remaining = interval.saturating_sub(elapsed);
    remaining.as_millis().div_ceil(1000) as u64
}
