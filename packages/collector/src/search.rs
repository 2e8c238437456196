//! Search stage: keyword × neighborhood text searches with one follow-up page.
//!
//! Accumulation is best-effort. Nothing here deduplicates; the same place
//! found by two keywords appears twice and the state tracker absorbs it.

use places_client::{candidates, PlaceCandidate, PlacesClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::areas::{Area, City};

pub struct SearchStage {
    places: Arc<PlacesClient>,
    keywords: Vec<String>,
    pagination_delay: Duration,
}

impl SearchStage {
    pub fn new(places: Arc<PlacesClient>, keywords: Vec<String>, pagination_delay: Duration) -> Self {
        Self {
            places,
            keywords,
            pagination_delay,
        }
    }

    pub fn query_for(keyword: &str, neighborhood: &str) -> String {
        format!("{keyword} em {neighborhood}")
    }

    /// Raw candidates for every keyword in one neighborhood, in request order.
    pub async fn search_area(&self, area: &Area) -> Vec<PlaceCandidate> {
        let mut found = Vec::new();

        for keyword in &self.keywords {
            info!(keyword = %keyword, neighborhood = %area.neighborhood, "Searching");

            let query = Self::query_for(keyword, &area.neighborhood);
            let Some(page) = self.places.text_search(&query).await else {
                continue;
            };

            if !page.is_expected_status() {
                warn!(
                    status = page.status.as_deref().unwrap_or("<missing>"),
                    keyword = %keyword,
                    neighborhood = %area.neighborhood,
                    "Unexpected search status"
                );
            }

            let first = candidates(&page);
            info!(
                count = first.len(),
                keyword = %keyword,
                neighborhood = %area.neighborhood,
                "Search results"
            );
            found.extend(first);

            let Some(token) = page.next_page_token.as_deref() else {
                continue;
            };

            tokio::time::sleep(self.pagination_delay).await;

            match self.places.next_page(token).await {
                Some(next) if next.is_ok() => {
                    let more = candidates(&next);
                    info!(
                        count = more.len(),
                        keyword = %keyword,
                        neighborhood = %area.neighborhood,
                        "Additional results from next page"
                    );
                    found.extend(more);
                }
                Some(next) => {
                    warn!(
                        status = next.status.as_deref().unwrap_or("<missing>"),
                        keyword = %keyword,
                        "Next page not usable"
                    );
                }
                None => {}
            }
        }

        found
    }

    /// Neighborhoods are searched one after another.
    pub async fn search_city(&self, city: &City) -> Vec<PlaceCandidate> {
        let mut found = Vec::new();
        for area in city.areas() {
            found.extend(self.search_area(&area).await);
        }
        found
    }
}
