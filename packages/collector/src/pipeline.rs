//! End-to-end driver: search, filter unseen, enrich, persist.
//!
//! Cities run one after another. Within a city the enrichment stage fans out,
//! and every outbound request shares a single admission gate.

use anyhow::{Context, Result};
use places_client::{
    Fetcher, HttpTransport, JsonTransport, PlacesClient, RetryPolicy, WebSearchClient,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::areas::City;
use crate::config::{CollectorSettings, Config};
use crate::enrichment::{Enricher, SocialLinkFinder};
use crate::search::SearchStage;
use crate::sink::write_city_extract;
use crate::state::{JsonFileBackend, ProcessedIds, StateBackend};

/// Counters for one city.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityReport {
    pub city: String,
    /// Raw search hits, repeats included.
    pub candidates: usize,
    pub new_ids: usize,
    pub enriched: usize,
    /// Ids whose details could not be fetched.
    pub dropped: usize,
    pub written: usize,
    pub duplicates: usize,
    pub invalid_coordinates: usize,
    /// No file was touched: nothing new was found, or none of it could be enriched.
    pub skipped: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub cities: Vec<CityReport>,
}

impl RunReport {
    pub fn total_written(&self) -> usize {
        self.cities.iter().map(|c| c.written).sum()
    }

    pub fn total_enriched(&self) -> usize {
        self.cities.iter().map(|c| c.enriched).sum()
    }
}

pub struct Collector {
    search: SearchStage,
    enricher: Enricher,
    state: ProcessedIds,
    output_dir: PathBuf,
}

impl Collector {
    /// Wire every stage over one transport and one admission gate.
    pub async fn build(
        transport: Arc<dyn JsonTransport>,
        config: &Config,
        settings: &CollectorSettings,
        backend: Arc<dyn StateBackend>,
    ) -> Result<Self> {
        let policy = RetryPolicy::new(settings.max_attempts, settings.backoff_base);
        let fetcher = Fetcher::new(transport, settings.concurrency, policy);

        let places = Arc::new(PlacesClient::new(
            fetcher.clone(),
            config.google_api_key.clone(),
        ));

        let social = match &config.custom_search_engine_id {
            Some(engine_id) => {
                let web = WebSearchClient::new(fetcher, config.google_api_key.clone(), engine_id);
                SocialLinkFinder::new(Arc::new(web), settings.social_results)
            }
            None => {
                warn!("CUSTOM_SEARCH_ENGINE_ID not set; social link discovery disabled");
                SocialLinkFinder::disabled()
            }
        };

        let state = ProcessedIds::load(backend)
            .await
            .context("Failed to load processed place ids")?;

        Ok(Self {
            search: SearchStage::new(
                places.clone(),
                settings.keywords.clone(),
                settings.pagination_delay,
            ),
            enricher: Enricher::new(places, social, settings.concurrency),
            state,
            output_dir: config.output_dir.clone(),
        })
    }

    /// Production wiring: HTTP transport and the JSON state file.
    pub async fn from_config(config: &Config, settings: &CollectorSettings) -> Result<Self> {
        let transport = HttpTransport::new(settings.request_timeout)
            .context("Failed to build HTTP transport")?;
        let backend = JsonFileBackend::new(config.state_file.clone());

        Self::build(Arc::new(transport), config, settings, Arc::new(backend)).await
    }

    pub async fn process_city(&self, city: &City) -> CityReport {
        let mut report = CityReport {
            city: city.name.clone(),
            ..Default::default()
        };

        info!(city = %city.name, neighborhoods = city.neighborhoods.len(), "Processing city");

        let found = self.search.search_city(city).await;
        report.candidates = found.len();

        let unseen = self.state.unseen(&found).await;
        report.new_ids = unseen.len();
        info!(
            city = %city.name,
            candidates = report.candidates,
            new = report.new_ids,
            "Search finished"
        );

        if unseen.is_empty() {
            info!(city = %city.name, "No new pharmacies");
            report.skipped = true;
            return report;
        }

        let records: Vec<_> = self
            .enricher
            .enrich_all(&unseen, &city.name)
            .await
            .into_iter()
            .flatten()
            .collect();
        report.enriched = records.len();
        report.dropped = report.new_ids - report.enriched;

        let enriched_ids = records.iter().map(|r| r.place_id.clone());
        if let Err(e) = self.state.record_and_flush(enriched_ids).await {
            error!(city = %city.name, error = %e, "Failed to save processed place ids");
        }

        // Keep the previous extract when every detail fetch failed
        if records.is_empty() {
            warn!(
                city = %city.name,
                dropped = report.dropped,
                "No pharmacies enriched; extract left unchanged"
            );
            report.skipped = true;
            return report;
        }

        match write_city_extract(&self.output_dir, &city.name, records).await {
            Ok(sink) => {
                report.written = sink.written;
                report.duplicates = sink.counts.duplicates;
                report.invalid_coordinates = sink.counts.invalid_coordinates;
            }
            Err(e) => error!(city = %city.name, error = %e, "Failed to write extract"),
        }

        report
    }

    pub async fn run(&self, cities: &[City]) -> RunReport {
        let mut report = RunReport::default();

        for city in cities {
            report.cities.push(self.process_city(city).await);
        }

        let total = report.total_written();
        if total == 0 {
            warn!("No pharmacies collected");
        } else {
            info!(total, cities = cities.len(), "Pharmacies collected");
        }

        report
    }
}
