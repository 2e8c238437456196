//! Detail fetch and enrichment for unseen places.
//!
//! Each id is fetched and enriched independently. A failure drops that place
//! (returns `None`) and never affects its siblings; the batch result has one
//! slot per id, in completion order.

pub mod address;
pub mod normalize;
pub mod record;
pub mod size;
pub mod social;

pub use address::{parse_address, AddressParts, NOT_AVAILABLE};
pub use normalize::normalize_name;
pub use record::{EnrichedRecord, CATEGORY};
pub use size::CompanySize;
pub use social::SocialLinkFinder;

use futures::stream::{self, StreamExt};
use places_client::PlacesClient;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

pub struct Enricher {
    places: Arc<PlacesClient>,
    social: SocialLinkFinder,
    fan_out: usize,
}

impl Enricher {
    pub fn new(places: Arc<PlacesClient>, social: SocialLinkFinder, fan_out: usize) -> Self {
        Self {
            places,
            social,
            fan_out: fan_out.max(1),
        }
    }

    /// Fetch details for one place and build its record.
    pub async fn enrich(&self, place_id: &str, city: &str) -> Option<EnrichedRecord> {
        let Some(response) = self.places.details(place_id).await else {
            warn!(place_id, "Details not found");
            return None;
        };
        let Some(details) = response.result else {
            warn!(place_id, "Details not found");
            return None;
        };

        if response.status.as_deref() != Some("OK") {
            warn!(
                place_id,
                status = response.status.as_deref().unwrap_or("<missing>"),
                "Unexpected details status"
            );
        }

        let name = details.name.as_deref().unwrap_or(NOT_AVAILABLE);
        info!(place_id, name, "Details collected");

        let social_links = if self.social.is_enabled() {
            self.social.find(name, city).await
        } else {
            Vec::new()
        };

        Some(EnrichedRecord::from_details(place_id, &details, social_links))
    }

    /// Enrich every id concurrently; waits for all of them.
    pub async fn enrich_all(&self, place_ids: &BTreeSet<String>, city: &str) -> Vec<Option<EnrichedRecord>> {
        stream::iter(place_ids.iter())
            .map(|id| self.enrich(id, city))
            .buffer_unordered(self.fan_out)
            .collect()
            .await
    }
}
