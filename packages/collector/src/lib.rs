//! Pharmacy listing collector.
//!
//! Searches every (keyword, neighborhood) pair of each configured city,
//! skips places already handled by earlier runs, enriches the rest with
//! details and social links, and writes one JSON extract per city.

pub mod areas;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod extracts;
pub mod geo;
pub mod logging;
pub mod pipeline;
pub mod search;
pub mod sink;
pub mod state;

pub use areas::{default_cities, load_cities, City};
pub use config::{CollectorSettings, Config};
pub use enrichment::{CompanySize, EnrichedRecord};
pub use error::{SinkError, StateError};
pub use pipeline::{CityReport, Collector, RunReport};
pub use state::{JsonFileBackend, MemoryBackend, ProcessedIds, StateBackend};
