use places_client::PlaceDetails;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::address::{parse_address, NOT_AVAILABLE};
use super::size::CompanySize;

/// Every record collected here is a pharmacy.
pub const CATEGORY: &str = "Farmácia";

/// A fully enriched place, before coordinate validation.
///
/// Coordinates stay as the raw upstream JSON; the sink decides whether they
/// are usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnrichedRecord {
    #[serde(rename = "PlaceID")]
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub neighborhood: String,
    pub street: String,
    pub city: String,
    pub rating: f64,
    pub user_ratings_total: u64,
    pub phone: String,
    pub types: String,
    pub category: String,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    pub social_links: Vec<String>,
    pub company_size: CompanySize,
}

impl EnrichedRecord {
    pub fn from_details(place_id: &str, details: &PlaceDetails, social_links: Vec<String>) -> Self {
        let address = details.formatted_address.clone().unwrap_or_default();
        let parts = parse_address(&address);

        Self {
            place_id: place_id.to_string(),
            name: details
                .name
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            address,
            neighborhood: parts.neighborhood,
            street: parts.street,
            city: parts.locality,
            rating: details.rating.unwrap_or(0.0),
            user_ratings_total: details.user_ratings_total.unwrap_or(0),
            phone: details
                .formatted_phone_number
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            types: details
                .types
                .as_ref()
                .map(|t| t.display())
                .unwrap_or_default(),
            category: CATEGORY.to_string(),
            latitude: details.latitude().cloned(),
            longitude: details.longitude().cloned(),
            social_links,
            company_size: CompanySize::classify(details.user_ratings_total),
        }
    }
}
