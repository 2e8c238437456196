//! Transport seam: one JSON GET, no retries, no admission control.
//!
//! `HttpTransport` is the reqwest implementation; tests use
//! [`crate::testing::MockTransport`].

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::{PlacesError, Result};

/// Query string as ordered key/value pairs.
pub type QueryParams = Vec<(String, String)>;

/// Performs a single GET and decodes the body as JSON.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value>;
}

/// reqwest-backed transport with a per-request timeout.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pharmacy-collector/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlacesError::Config(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl JsonTransport for HttpTransport {
    async fn get_json(&self, url: &str, params: &[(String, String)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| PlacesError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::http(status.as_u16(), url));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| PlacesError::from_reqwest(url, e))
    }
}

/// Build owned query params from borrowed pairs.
pub fn params<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> QueryParams {
    pairs
        .iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect()
}
