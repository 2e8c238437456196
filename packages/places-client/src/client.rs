//! Typed wrappers over the fetcher for each upstream endpoint.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::fetcher::Fetcher;
use crate::transport::{params, QueryParams};
use crate::types::{DetailsResponse, PlaceCandidate, TextSearchResponse, WebSearchResponse};

pub const PLACES_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
pub const PLACES_DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
pub const CUSTOM_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Fields requested from the details endpoint.
pub const DETAIL_FIELDS: &str =
    "name,formatted_address,rating,formatted_phone_number,types,geometry/location,user_ratings_total";

fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(url, error = %e, "Unexpected response shape");
            None
        }
    }
}

/// Client for the places text-search and details endpoints.
pub struct PlacesClient {
    fetcher: Fetcher,
    api_key: SecretString,
    place_type: String,
    search_url: String,
    details_url: String,
}

impl PlacesClient {
    pub fn new(fetcher: Fetcher, api_key: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_key: SecretString::from(api_key.into()),
            place_type: "pharmacy".to_string(),
            search_url: PLACES_SEARCH_URL.to_string(),
            details_url: PLACES_DETAILS_URL.to_string(),
        }
    }

    fn search_params(&self, query: &str) -> QueryParams {
        params(&[
            ("query", query),
            ("key", self.api_key.expose_secret()),
            ("type", self.place_type.as_str()),
            ("rankby", "prominence"),
        ])
    }

    /// First page of a free-text search. `None` when the fetch produced nothing.
    pub async fn text_search(&self, query: &str) -> Option<TextSearchResponse> {
        let value = self
            .fetcher
            .fetch(&self.search_url, &self.search_params(query))
            .await?;
        decode(&self.search_url, value)
    }

    /// Follow-up page for a pagination token.
    pub async fn next_page(&self, token: &str) -> Option<TextSearchResponse> {
        let query = params(&[("pagetoken", token), ("key", self.api_key.expose_secret())]);
        let value = self.fetcher.fetch(&self.search_url, &query).await?;
        decode(&self.search_url, value)
    }

    pub async fn details(&self, place_id: &str) -> Option<DetailsResponse> {
        let query = params(&[
            ("place_id", place_id),
            ("fields", DETAIL_FIELDS),
            ("key", self.api_key.expose_secret()),
        ]);
        let value = self.fetcher.fetch(&self.details_url, &query).await?;
        decode(&self.details_url, value)
    }
}

/// Parse raw search hits, skipping any without a usable `place_id`.
pub fn candidates(response: &TextSearchResponse) -> Vec<PlaceCandidate> {
    response
        .results
        .iter()
        .filter_map(|raw| match serde_json::from_value(raw.clone()) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                warn!(error = %e, "Skipping search result without place_id");
                None
            }
        })
        .collect()
}

/// Client for the custom web-search endpoint.
pub struct WebSearchClient {
    fetcher: Fetcher,
    api_key: SecretString,
    engine_id: String,
    url: String,
}

impl WebSearchClient {
    pub fn new(fetcher: Fetcher, api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            fetcher,
            api_key: SecretString::from(api_key.into()),
            engine_id: engine_id.into(),
            url: CUSTOM_SEARCH_URL.to_string(),
        }
    }

    /// Links of up to `num` hits for `query`. Empty when nothing came back.
    pub async fn search(&self, query: &str, num: usize) -> Vec<String> {
        let num = num.to_string();
        let query = params(&[
            ("key", self.api_key.expose_secret()),
            ("cx", self.engine_id.as_str()),
            ("q", query),
            ("num", num.as_str()),
        ]);

        let Some(value) = self.fetcher.fetch(&self.url, &query).await else {
            return Vec::new();
        };
        let Some(response) = decode::<WebSearchResponse>(&self.url, value) else {
            return Vec::new();
        };

        response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.link)
            .collect()
    }
}
