//! Backend long-poll reader (spec.md §4.4) — a single unbounded loop that
//! pulls the next batch of registrations/notifications and hands it to a
//! `BackendEventHandler`. No added backoff: the backend's own long-poll hang
//! time is the rate limiter, not this reader.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_protocol::BackendEvent;
use reqwest::{Client, StatusCode};

use crate::config::LongPollConfig;
use crate::error::{LongPollError, LongPollResult};

#[async_trait]
pub trait BackendEventHandler: Send + Sync {
    async fn handle(&self, event: BackendEvent);
}

/// What a poll response tells the reader to do next.
#[derive(Debug, PartialEq, Eq)]
enum PollOutcome {
    Deliver,
    Skip,
}

fn classify_status(status: StatusCode) -> (PollOutcome, Option<&'static str>) {
    match status {
        StatusCode::OK => (PollOutcome::Deliver, None),
        StatusCode::BAD_REQUEST => (PollOutcome::Skip, Some("backend long-poll rejected the request (400)")),
        StatusCode::UNAUTHORIZED => (PollOutcome::Skip, Some("backend long-poll reported unauthorized (401)")),
        StatusCode::GONE => (
            PollOutcome::Skip,
            Some("backend long-poll session expired (410), resuming from scratch"),
        ),
        _ => (PollOutcome::Skip, Some("unexpected backend long-poll status")),
    }
}

pub struct LongPollReader {
    config: LongPollConfig,
    client: Client,
    handler: Arc<dyn BackendEventHandler>,
}

impl LongPollReader {
    pub fn new(config: LongPollConfig, handler: Arc<dyn BackendEventHandler>) -> LongPollResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.backend_timeout_secs))
            .build()?;
        Ok(Self { config, client, handler })
    }

    /// Runs until the process exits. Callers race this against a shutdown
    /// signal with `tokio::select!` rather than this method taking one
    /// itself (spec.md §4.4 names no cancellation path for the poll loop).
    pub async fn run(&self) {
        let url = format!("{}{}", self.config.backend_url, self.config.backend_poll_path);
        loop {
            match self.poll_once(&url).await {
                Ok(Some(event)) if !event.is_empty() => self.handler.handle(event).await,
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "long-poll request failed"),
            }
        }
    }

    async fn poll_once(&self, url: &str) -> LongPollResult<Option<BackendEvent>> {
        let mut request = self.client.get(url);
        if let Some(key) = &self.config.backend_api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        let (outcome, log_message) = classify_status(response.status());
        if let Some(message) = log_message {
            if response.status() == StatusCode::GONE {
                tracing::error!("{message}");
            } else {
                tracing::warn!("{message}");
            }
        }

        match outcome {
            PollOutcome::Deliver => response
                .json::<BackendEvent>()
                .await
                .map(Some)
                .map_err(|e| LongPollError::Decode(e.to_string())),
            PollOutcome::Skip => Ok(None),
        }
    }
}
