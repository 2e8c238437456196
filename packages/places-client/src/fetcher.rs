//! Rate-limited, retrying JSON fetcher shared by every stage.
//!
//! All requests pass through one semaphore, so at most `concurrency` calls are
//! in flight across the whole process. A permit is held for a single attempt
//! and released before any backoff sleep.
//!
//! Failures never escape: once retries are spent, or the upstream answers with
//! a non-retryable status, `fetch` returns `None` and callers treat that the
//! same as "no data".

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::retry::{RetryDecision, RetryPolicy};
use crate::transport::JsonTransport;

#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn JsonTransport>,
    gate: Arc<Semaphore>,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn JsonTransport>, concurrency: usize, policy: RetryPolicy) -> Self {
        Self {
            transport,
            gate: Arc::new(Semaphore::new(concurrency.max(1))),
            policy,
        }
    }

    /// Number of free admission slots right now.
    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }

    /// GET `url` with `params`; `None` when no usable payload was obtained.
    pub async fn fetch(&self, url: &str, params: &[(String, String)]) -> Option<Value> {
        let mut attempt = 0;

        loop {
            let outcome = {
                // Closed only if the semaphore is dropped, which cannot happen
                // while `self` holds an Arc to it.
                let _permit = self.gate.acquire().await.ok()?;
                debug!(url, attempt, "Requesting");
                self.transport.get_json(url, params).await
            };

            let err = match outcome {
                Ok(value) => return Some(value),
                Err(e) => e,
            };

            match self.policy.decide(attempt, &err) {
                RetryDecision::Retry(delay) => {
                    warn!(url, attempt, error = %err, "Request failed");
                    info!(url, delay_secs = delay.as_secs_f64(), "Retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::Abort => {
                    error!(url, attempt, error = %err, "Non-retryable request failure");
                    return None;
                }
                RetryDecision::Exhausted => {
                    error!(
                        url,
                        attempts = attempt + 1,
                        error = %err,
                        "Retries exhausted"
                    );
                    return None;
                }
            }
        }
    }
}
