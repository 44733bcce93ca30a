//! Periodic eviction of expired credentials.
//!
//! Two things expire on their own: pending signups (in memory) and refresh
//! token sessions (in `user_sessions`). Both are also rejected when used
//! after expiry; the sweep bounds what is kept for tokens nobody redeems.

use std::sync::Arc;
use std::time::Duration;

use beacon_core::pending_signup::PendingSignups;
use beacon_db::repositories::SessionRepo;
use beacon_db::DbPool;
use tokio_util::sync::CancellationToken;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// What one sweep removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    pub pending_signups: usize,
    pub sessions: u64,
}

/// Run a single sweep. A database failure is logged and counted as zero so
/// the in-memory sweep still happens.
pub async fn sweep_once(pending: &PendingSignups, pool: &DbPool) -> SweepOutcome {
    let pending_signups = pending.purge_expired();
    let sessions = match SessionRepo::purge_expired(pool).await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "Failed to purge expired sessions");
            0
        }
    };
    SweepOutcome {
        pending_signups,
        sessions,
    }
}

/// Run the sweep every `interval` until `cancel` is triggered.
pub async fn run(
    pending: Arc<PendingSignups>,
    pool: DbPool,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        otp_ttl_secs = pending.ttl().as_secs(),
        "Expiry sweeper started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Expiry sweeper stopping");
                break;
            }
            _ = ticker.tick() => {
                let outcome = sweep_once(&pending, &pool).await;
                if outcome.pending_signups > 0 || outcome.sessions > 0 {
                    tracing::info!(
                        pending_signups = outcome.pending_signups,
                        sessions = outcome.sessions,
                        "Purged expired credentials"
                    );
                } else {
                    tracing::debug!("Expiry sweep: nothing expired");
                }
            }
        }
    }
}
