//! The dashboard data cache and its refresh cycle.

use super::{ArbitrageSource, DashboardState, seconds_until_refresh};
use crate::auth::SessionKind;
use crate::storage::TokenStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Result of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New data was committed. `partial` is set when one endpoint failed
    /// and its dataset was emptied.
    Committed {
        pairs: usize,
        track: usize,
        partial: bool,
    },
    /// No session token, or the server rejected it. Nothing was committed.
    Unauthenticated,
    /// A newer refresh committed first; these results were dropped.
    Stale,
    /// Nothing reached the server. Data was kept and the error recorded.
    Failed(String),
}

/// Owns the arbitrage datasets and commits refresh results.
///
/// Every refresh takes a generation number when it starts. Results are
/// committed only if no later generation has committed, so overlapping
/// timer and manual refreshes resolve to the most recently started one.
pub struct DashboardCache {
    source: Arc<dyn ArbitrageSource>,
    tokens: TokenStore,
    refresh_interval: Duration,
    state: watch::Sender<DashboardState>,
    generation: AtomicU64,
    committed: AtomicU64,
}

impl DashboardCache {
    pub fn new(
        source: Arc<dyn ArbitrageSource>,
        tokens: TokenStore,
        refresh_interval: Duration,
    ) -> Self {
        let (state, _) = watch::channel(DashboardState::new(refresh_interval));
        Self {
            source,
            tokens,
            refresh_interval,
            state,
            generation: AtomicU64::new(0),
            committed: AtomicU64::new(0),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Recompute the countdown from the last refresh time.
    pub fn tick_countdown(&self) {
        let interval = self.refresh_interval;
        self.state.send_if_modified(|state| {
            let next = seconds_until_refresh(interval, state.last_refresh_time.elapsed());
            if next == state.time_until_next_refresh {
                false
            } else {
                state.time_until_next_refresh = next;
                true
            }
        });
    }

    /// Record `generation` as committed unless a newer one already is.
    fn claim(&self, generation: u64) -> bool {
        self.committed.fetch_max(generation, Ordering::SeqCst) < generation
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.committed.load(Ordering::SeqCst) > generation
    }

    /// Run one refresh cycle.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(token) = self.tokens.token(SessionKind::User) else {
            debug!("No session token, skipping dashboard refresh");
            return RefreshOutcome::Unauthenticated;
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Refreshing dashboard");

        let (pairs, track) = tokio::join!(
            self.source.fetch_pairs(&token),
            self.source.fetch_track(&token)
        );

        if is_rejected(&pairs) || is_rejected(&track) {
            warn!("Dashboard token rejected, clearing session");
            if let Err(e) = self.tokens.clear_session(SessionKind::User) {
                warn!("Failed to clear session: {}", e);
            }
            return RefreshOutcome::Unauthenticated;
        }

        if let (Err(pairs_err), Err(track_err)) = (&pairs, &track)
            && pairs_err.is_transport()
            && track_err.is_transport()
        {
            let message = pairs_err.to_string();
            // Failures never claim a generation, so an older refresh that
            // still succeeds can replace the banner with data.
            if self.is_superseded(generation) {
                return RefreshOutcome::Stale;
            }
            warn!("Dashboard refresh failed: {}", message);
            self.state.send_modify(|state| {
                state.error = Some(message.clone());
                state.initialized = true;
            });
            return RefreshOutcome::Failed(message);
        }

        let partial = pairs.is_err() || track.is_err();
        let pair_rows = pairs.unwrap_or_else(|e| {
            warn!("Arbitrage pairs fetch failed: {}", e);
            Vec::new()
        });
        let track_rows = track.unwrap_or_else(|e| {
            warn!("ArbiTrack fetch failed: {}", e);
            Vec::new()
        });

        if !self.claim(generation) {
            debug!(generation, "Discarding stale dashboard refresh");
            return RefreshOutcome::Stale;
        }

        let outcome = RefreshOutcome::Committed {
            pairs: pair_rows.len(),
            track: track_rows.len(),
            partial,
        };
        let countdown = seconds_until_refresh(self.refresh_interval, Duration::ZERO);

        self.state.send_modify(|state| {
            state.pair_rows = pair_rows;
            state.track_rows = track_rows;
            state.error = None;
            state.last_refresh_time = Instant::now();
            state.last_refreshed_at = Some(chrono::Utc::now());
            state.time_until_next_refresh = countdown;
            state.initialized = true;
        });

        info!(?outcome, "Dashboard refreshed");
        outcome
    }
}

fn is_rejected<T>(result: &crate::Result<T>) -> bool {
    matches!(result, Err(e) if e.is_unauthorized())
}
