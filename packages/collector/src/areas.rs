//! Search targets: cities and the neighborhoods queried inside each one.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    #[serde(rename = "city")]
    pub name: String,
    pub neighborhoods: Vec<String>,
}

/// A (city, neighborhood) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub city: String,
    pub neighborhood: String,
}

impl City {
    pub fn new(name: &str, neighborhoods: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            neighborhoods: neighborhoods.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn areas(&self) -> impl Iterator<Item = Area> + '_ {
        self.neighborhoods.iter().map(|n| Area {
            city: self.name.clone(),
            neighborhood: n.clone(),
        })
    }
}

pub fn default_cities() -> Vec<City> {
    vec![
        City::new(
            "São Paulo",
            &[
                "Jardim Paulista",
                "Pinheiros",
                "Vila Mariana",
                "Moema",
                "Brooklin",
                "Itaim Bibi",
                "Morumbi",
                "Vila Prudente",
                "Santana",
                "Brooklin Novo",
            ],
        ),
        City::new(
            "Campinas",
            &[
                "Cidade Universitária",
                "Jardim Paulista",
                "Barão Geraldo",
                "Parque Prado",
                "Nova Campinas",
                "Sousas",
                "Cambuí",
            ],
        ),
        City::new(
            "Ribeirão Preto",
            &[
                "Centro",
                "Jardim Universitário",
                "Jardim Catarina",
                "Jardim América",
                "Vila Formosa",
                "Jardim Petrópolis",
            ],
        ),
    ]
}

/// Load a city table from a JSON file. File order is processing order.
pub fn load_cities(path: &Path) -> Result<Vec<City>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read areas file {}", path.display()))?;
    parse_cities(&text).with_context(|| format!("Invalid areas file {}", path.display()))
}

pub fn parse_cities(text: &str) -> Result<Vec<City>> {
    let cities: Vec<City> = serde_json::from_str(text)?;
    for city in &cities {
        if city.neighborhoods.is_empty() {
            bail!("city '{}' has no neighborhoods", city.name);
        }
    }
    Ok(cities)
}
