//! Per-city extract files.
//!
//! A city's file is replaced wholesale with the records enriched for it in
//! this run, after dropping duplicate (name, address) pairs and rows whose
//! coordinates are not numeric.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::enrichment::{normalize_name, CompanySize, EnrichedRecord};
use crate::error::{SinkError, SinkResult};

pub const EXTRACT_PREFIX: &str = "farmacias_";

/// One row of an extract file, in output column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtractRow {
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
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub social_links: Vec<String>,
    pub company_size: CompanySize,
}

impl ExtractRow {
    /// `None` when either coordinate is missing or not numeric.
    fn from_record(record: EnrichedRecord) -> Option<Self> {
        let latitude = coerce_coordinate(record.latitude.as_ref())?;
        let longitude = coerce_coordinate(record.longitude.as_ref())?;

        Some(Self {
            place_id: record.place_id,
            name: record.name,
            address: record.address,
            neighborhood: record.neighborhood,
            street: record.street,
            city: record.city,
            rating: record.rating,
            user_ratings_total: record.user_ratings_total,
            phone: record.phone,
            types: record.types,
            category: record.category,
            latitude,
            longitude,
            social_links: record.social_links,
            company_size: CompanySize::classify(Some(record.user_ratings_total)),
        })
    }
}

/// Numbers pass through, numeric strings are parsed, anything else is invalid.
pub fn coerce_coordinate(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Outcome of cleaning one city's records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedCounts {
    pub input: usize,
    pub duplicates: usize,
    pub invalid_coordinates: usize,
}

/// Dedup by (name, address), keeping the first by place id, then drop rows
/// without numeric coordinates.
pub fn prepare_rows(mut records: Vec<EnrichedRecord>) -> (Vec<ExtractRow>, PreparedCounts) {
    let mut counts = PreparedCounts {
        input: records.len(),
        ..Default::default()
    };

    // Fan-in order is arbitrary; sort so files are reproducible.
    records.sort_by(|a, b| a.place_id.cmp(&b.place_id));

    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert((record.name.clone(), record.address.clone())) {
            unique.push(record);
        } else {
            counts.duplicates += 1;
        }
    }

    let mut rows = Vec::with_capacity(unique.len());
    for record in unique {
        match ExtractRow::from_record(record) {
            Some(row) => rows.push(row),
            None => counts.invalid_coordinates += 1,
        }
    }

    (rows, counts)
}

/// `farmacias_<normalized city>.json`, spaces as underscores.
pub fn extract_file_name(city: &str) -> String {
    format!("{EXTRACT_PREFIX}{}.json", normalize_name(city)).replace(' ', "_")
}

/// Pretty JSON with 4-space indent; non-ASCII is written as UTF-8.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReport {
    pub path: PathBuf,
    pub written: usize,
    pub counts: PreparedCounts,
}

/// Clean `records` and overwrite the city's extract in `dir`.
pub async fn write_city_extract(
    dir: &Path,
    city: &str,
    records: Vec<EnrichedRecord>,
) -> SinkResult<SinkReport> {
    let (rows, counts) = prepare_rows(records);

    info!(
        city,
        rows = counts.input - counts.duplicates,
        duplicates = counts.duplicates,
        "Saving city extract"
    );
    info!(
        city,
        removed = counts.invalid_coordinates,
        "Removed pharmacies without valid coordinates"
    );

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| SinkError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

    let path = dir.join(extract_file_name(city));
    let body = to_pretty_json(&rows)?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|source| SinkError::Write {
            path: path.clone(),
            source,
        })?;

    info!(city, path = %path.display(), written = rows.len(), "Extract saved");

    Ok(SinkReport {
        path,
        written: rows.len(),
        counts,
    })
}
