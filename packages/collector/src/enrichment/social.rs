//! Social profile discovery through the custom web-search endpoint.

use places_client::WebSearchClient;
use std::sync::Arc;
use tracing::info;

use super::normalize::normalize_name;

/// Platforms the web search is restricted to.
pub const SOCIAL_SITES: [&str; 2] = ["facebook.com", "instagram.com"];

pub struct SocialLinkFinder {
    client: Option<Arc<WebSearchClient>>,
    max_results: usize,
}

impl SocialLinkFinder {
    pub fn new(client: Arc<WebSearchClient>, max_results: usize) -> Self {
        Self {
            client: Some(client),
            max_results,
        }
    }

    /// No search engine configured; every lookup yields no links.
    pub fn disabled() -> Self {
        Self {
            client: None,
            max_results: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// `"<normalized name>" <city> site:facebook.com OR site:instagram.com`
    pub fn query_for(name: &str, city: &str) -> String {
        let sites = SOCIAL_SITES
            .iter()
            .map(|s| format!("site:{s}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!("\"{}\" {} {}", normalize_name(name), city, sites)
    }

    pub async fn find(&self, name: &str, city: &str) -> Vec<String> {
        let Some(client) = &self.client else {
            return Vec::new();
        };

        let mut links = client
            .search(&Self::query_for(name, city), self.max_results)
            .await;
        links.truncate(self.max_results);

        if links.is_empty() {
            info!(name, "No social links found");
        } else {
            info!(name, ?links, "Social links found");
        }
        links
    }
}
