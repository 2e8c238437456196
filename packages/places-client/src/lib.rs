//! Client for the places search, place details and custom web-search APIs.
//!
//! Every request goes through a [`Fetcher`], which owns the process-wide
//! admission gate and the retry policy. Callers get `Option`s back: an absent
//! payload means "no data", whatever the underlying failure was.
//!
//! # Example
//!
//! ```rust,ignore
//! use places_client::{Fetcher, HttpTransport, PlacesClient, RetryPolicy};
//! use std::{sync::Arc, time::Duration};
//!
//! let transport = Arc::new(HttpTransport::new(Duration::from_secs(10))?);
//! let fetcher = Fetcher::new(transport, 20, RetryPolicy::default());
//! let places = PlacesClient::new(fetcher, api_key);
//!
//! if let Some(page) = places.text_search("farmácia em Pinheiros").await {
//!     for candidate in places_client::candidates(&page) {
//!         println!("{}", candidate.place_id);
//!     }
//! }
//! ```

pub mod client;
pub mod error;
pub mod fetcher;
pub mod retry;
pub mod testing;
pub mod transport;
pub mod types;

pub use client::{
    candidates, PlacesClient, WebSearchClient, CUSTOM_SEARCH_URL, DETAIL_FIELDS,
    PLACES_DETAILS_URL, PLACES_SEARCH_URL,
};
pub use error::{PlacesError, Result, RETRYABLE_STATUSES};
pub use fetcher::Fetcher;
pub use retry::{RetryDecision, RetryPolicy};
pub use transport::{params, HttpTransport, JsonTransport, QueryParams};
pub use types::{
    DetailsResponse, Geometry, Location, PlaceCandidate, PlaceDetails, PlaceTypes,
    TextSearchResponse, WebSearchItem, WebSearchResponse,
};
