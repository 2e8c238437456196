//! Reading extract files back, as the dashboard does, plus simple counts.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{error, info, warn};

use crate::enrichment::CompanySize;
use crate::error::{SinkError, SinkResult};
use crate::sink::{ExtractRow, EXTRACT_PREFIX};

#[derive(Debug, Clone)]
pub struct CityExtract {
    /// Lower-cased label derived from the file name.
    pub city: String,
    pub rows: Vec<ExtractRow>,
}

/// `farmacias_sao_paulo.json` → `sao paulo`.
pub fn city_from_file_name(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(".json")?;
    let rest = stem.strip_prefix(EXTRACT_PREFIX)?;
    if rest.is_empty() {
        return None;
    }
    Some(rest.replace('_', " ").to_lowercase())
}

/// Load every extract in `dir`, sorted by city. Unreadable or malformed files
/// are logged and skipped.
pub async fn load_extracts(dir: &Path) -> SinkResult<Vec<CityExtract>> {
    let read_dir_err = |source| SinkError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_dir_err)?;
    let mut extracts = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_dir_err)? {
        let path = entry.path();
        let Some(city) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(city_from_file_name)
        else {
            continue;
        };

        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read extract");
                continue;
            }
        };

        let rows = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                error!(path = %path.display(), "Extract is not a list of objects");
                continue;
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to decode extract");
                continue;
            }
        };

        if rows.is_empty() {
            warn!(path = %path.display(), "Extract is empty");
            continue;
        }

        let parsed: Vec<ExtractRow> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping malformed row");
                    None
                }
            })
            .collect();

        info!(path = %path.display(), rows = parsed.len(), "Extract loaded");
        extracts.push(CityExtract { city, rows: parsed });
    }

    if extracts.is_empty() {
        warn!(dir = %dir.display(), "No extract files found");
    }

    extracts.sort_by(|a, b| a.city.cmp(&b.city));
    Ok(extracts)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub total: usize,
    pub by_city: BTreeMap<String, usize>,
    pub by_size: BTreeMap<CompanySize, usize>,
    pub by_neighborhood: BTreeMap<String, usize>,
}

impl fmt::Display for ExtractSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total pharmacies: {}", self.total)?;

        writeln!(f, "\nBy city:")?;
        for (city, count) in &self.by_city {
            writeln!(f, "  {city}: {count}")?;
        }
        writeln!(f, "\nBy size:")?;
        for (size, count) in &self.by_size {
            writeln!(f, "  {size}: {count}")?;
        }
        writeln!(f, "\nBy neighborhood:")?;
        for (neighborhood, count) in &self.by_neighborhood {
            writeln!(f, "  {neighborhood}: {count}")?;
        }
        Ok(())
    }
}

pub fn summarize(extracts: &[CityExtract]) -> ExtractSummary {
    let mut summary = ExtractSummary::default();

    for extract in extracts {
        *summary.by_city.entry(extract.city.clone()).or_default() += extract.rows.len();
        for row in &extract.rows {
            summary.total += 1;
            *summary.by_size.entry(row.company_size).or_default() += 1;
            *summary
                .by_neighborhood
                .entry(row.neighborhood.clone())
                .or_default() += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: &str, neighborhood: &str, size: &str) -> Value {
        json!({
            "PlaceID": id,
            "Name": "X",
            "Address": "Rua",
            "Neighborhood": neighborhood,
            "Street": "Rua",
            "City": "N/A",
            "Rating": 4.0,
            "UserRatingsTotal": 10,
            "Phone": "N/A",
            "Types": "pharmacy",
            "Category": "Farmácia",
            "Latitude": -23.0,
            "Longitude": -46.0,
            "SocialLinks": [],
            "CompanySize": size
        })
    }

    #[test]
    fn test_city_from_file_name() {
        assert_eq!(
            city_from_file_name("farmacias_Sao_Paulo.json").as_deref(),
            Some("sao paulo")
        );
        assert_eq!(city_from_file_name("farmacias_.json"), None);
        assert_eq!(city_from_file_name("other.json"), None);
        assert_eq!(city_from_file_name("farmacias_x.csv"), None);
    }

    #[tokio::test]
    async fn test_load_and_summarize() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("farmacias_Campinas.json"),
            json!([row("a", "Cambuí", "Small"), row("b", "Centro", "Large")]).to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("farmacias_Sao_Paulo.json"),
            json!([row("c", "Moema", "Small")]).to_string(),
        )
        .unwrap();
        std::fs::write(dir.path().join("farmacias_Vazia.json"), "[]").unwrap();
        std::fs::write(dir.path().join("farmacias_Objeto.json"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let extracts = load_extracts(dir.path()).await.unwrap();
        let summary = summarize(&extracts);

        assert_eq!(extracts.len(), 2);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_city["campinas"], 2);
        assert_eq!(summary.by_city["sao paulo"], 1);
        assert_eq!(summary.by_size[&CompanySize::Small], 2);
        assert_eq!(summary.by_neighborhood["Moema"], 1);

        let printed = summary.to_string();
        assert!(printed.starts_with("Total pharmacies: 3\n"));
        assert!(printed.contains("\nBy neighborhood:\n  Cambuí: 1\n  Centro: 1\n  Moema: 1\n"));
        assert!(printed.contains("  Small: 2\n"));
    }

    #[tokio::test]
    async fn test_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_extracts(&dir.path().join("absent")).await.is_err());
    }
}
