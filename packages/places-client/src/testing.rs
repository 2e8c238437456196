//! Test doubles for the transport seam.
//!
//! `MockTransport` never touches the network. It answers either from a routing
//! closure or from a scripted queue, and records every request it sees.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{PlacesError, Result};
use crate::transport::JsonTransport;

/// A request observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl MockRequest {
    /// Value of the first query param named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

type Responder = Box<dyn Fn(&MockRequest) -> Result<Value> + Send + Sync>;

enum Mode {
    Route(Responder),
    Script(Mutex<VecDeque<Result<Value>>>),
}

pub struct MockTransport {
    mode: Mode,
    latency: Option<Duration>,
    calls: Arc<Mutex<Vec<MockRequest>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    /// Answer each request with `responder`.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&MockRequest) -> Result<Value> + Send + Sync + 'static,
    {
        Self::with_mode(Mode::Route(Box::new(responder)))
    }

    /// Answer requests with `replies` in order. Once the script runs out every
    /// further request fails with a network error.
    pub fn scripted(replies: Vec<Result<Value>>) -> Self {
        Self::with_mode(Mode::Script(Mutex::new(replies.into())))
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            latency: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Delay every response, to make overlapping requests observable.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<MockRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Requests whose URL starts with `prefix`.
    pub fn calls_to(&self, prefix: &str) -> Vec<MockRequest> {
        self.calls()
            .into_iter()
            .filter(|c| c.url.starts_with(prefix))
            .collect()
    }

    /// Highest number of requests observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn reply(&self, request: &MockRequest) -> Result<Value> {
        match &self.mode {
            Mode::Route(responder) => responder(request),
            Mode::Script(queue) => queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(PlacesError::Network("mock script exhausted".into()))),
        }
    }
}

#[async_trait]
impl JsonTransport for MockTransport {
    async fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value> {
        let request = MockRequest {
            url: url.to_string(),
            params: params.to_vec(),
        };
        self.calls.lock().unwrap().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let reply = self.reply(&request);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }
}
