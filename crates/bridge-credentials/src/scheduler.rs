//! JWT credential-refresh scheduler (spec.md §4.3).
//!
//! One logical timer per per-device session. Fires at `expiry - refresh_slack`,
//! invoking a `RefreshHandle` that performs the mint/disconnect/reconnect/
//! resubscribe sequence and reports the new expiry. Retries on failure up to
//! `max_retries` with exponential backoff; cancellable via `stop`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::CredentialResult;

/// Performs one credential refresh cycle for a device and reports the new
/// expiry. Implemented by the per-cloud processor that owns the MQTT
/// session being refreshed (`bridge-peers`); this crate only drives the
/// timer, it never touches MQTT or JWT signing directly.
#[async_trait]
pub trait RefreshHandle: Send + Sync {
    async fn refresh(&self) -> CredentialResult<DateTime<Utc>>;
}

/// Per-device JWT refresh timers, keyed by `ep_name`.
#[derive(Default)]
pub struct JwtRefreshScheduler {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl JwtRefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or replace) the refresh timer for `ep_name`.
    #[allow(clippy::too_many_arguments)]
    pub async fn spawn(
        &self,
        ep_name: impl Into<String>,
        handle: Arc<dyn RefreshHandle>,
        initial_expiry: DateTime<Utc>,
        refresh_slack: ChronoDuration,
        max_retries: u32,
        retry_wait: StdDuration,
    ) {
        let ep_name = ep_name.into();
        self.stop(&ep_name).await;

        let task_ep = ep_name.clone();
        let join = tokio::spawn(async move {
            run_loop(
                task_ep,
                handle,
                initial_expiry,
                refresh_slack,
                max_retries,
                retry_wait,
            )
            .await;
        });
        self.tasks.lock().await.insert(ep_name, join);
    }

    /// `stopJwTRefresherThread(ep)` — stop the timer before returning.
    /// Idempotent: stopping an already-stopped (or never-started) device
    /// is a no-op.
    pub async fn stop(&self, ep_name: &str) {
        if let Some(handle) = self.tasks.lock().await.remove(ep_name) {
            handle.abort();
        }
    }

    pub async fn stop_all(&self) {
        let mut tasks = self.tasks.lock().await;
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
    }

    pub async fn is_running(&self, ep_name: &str) -> bool {
        self.tasks.lock().await.contains_key(ep_name)
    }
}

async fn run_loop(
    ep_name: String,
    handle: Arc<dyn RefreshHandle>,
    initial_expiry: DateTime<Utc>,
    refresh_slack: ChronoDuration,
    max_retries: u32,
    retry_wait: StdDuration,
) {
    let mut expiry = initial_expiry;

    loop {
        let wake_at = expiry - refresh_slack;
        let wait = (wake_at - Utc::now())
            .to_std()
            .unwrap_or(StdDuration::ZERO);
        tokio::time::sleep(wait).await;

        let mut attempt: u32 = 0;
        loop {
            match handle.refresh().await {
                Ok(next_expiry) => {
                    expiry = next_expiry;
                    break;
                }
                Err(e) => {
                    attempt += 1;
                    tracing::warn!(ep = %ep_name, attempt, error = %e, "credential refresh failed");
                    if attempt >= max_retries {
                        tracing::error!(ep = %ep_name, "credential refresh exhausted retries, giving up");
                        return;
                    }
                    tokio::time::sleep(retry_wait * 2u32.pow(attempt.min(5))).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandle {
        calls: Arc<AtomicUsize>,
        next_expiry_millis: i64,
    }

    #[async_trait]
    impl RefreshHandle for CountingHandle {
        async fn refresh(&self) -> CredentialResult<DateTime<Utc>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Utc::now() + ChronoDuration::milliseconds(self.next_expiry_millis))
        }
    }

    struct AlwaysFailingHandle {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RefreshHandle for AlwaysFailingHandle {
        async fn refresh(&self) -> CredentialResult<DateTime<Utc>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(crate::error::CredentialError::Expired)
        }
    }

    #[tokio::test]
    async fn fires_repeatedly_until_stopped() {
        let scheduler = JwtRefreshScheduler::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = Arc::new(CountingHandle {
            calls: calls.clone(),
            next_expiry_millis: 15,
        });

        scheduler
            .spawn(
                "d1",
                handle,
                Utc::now() + ChronoDuration::milliseconds(10),
                ChronoDuration::zero(),
                5,
                StdDuration::from_millis(5),
            )
            .await;

        tokio::time::sleep(StdDuration::from_millis(60)).await;
        let fired = calls.load(Ordering::SeqCst);
        assert!(fired >= 2, "expected multiple refreshes, got {fired}");

        scheduler.stop("d1").await;
        assert!(!scheduler.is_running("d1").await);
        let after_stop = calls.load(Ordering::SeqCst);
        tokio::time::sleep(StdDuration::from_millis(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn stop_is_idempotent_for_unknown_device() {
        let scheduler = JwtRefreshScheduler::new();
        scheduler.stop("never-started").await;
    }

    #[tokio::test]
    async fn exhausting_retries_stops_the_task() {
        let scheduler = JwtRefreshScheduler::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = Arc::new(AlwaysFailingHandle {
            calls: calls.clone(),
        });

        scheduler
            .spawn(
                "d1",
                handle,
                Utc::now(),
                ChronoDuration::zero(),
                3,
                StdDuration::from_millis(2),
            )
            .await;

        tokio::time::sleep(StdDuration::from_millis(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
