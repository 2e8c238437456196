use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Response from the text-search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextSearchResponse {
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<Value>,
    pub next_page_token: Option<String>,
}

impl TextSearchResponse {
    /// `OK` or `ZERO_RESULTS`.
    pub fn is_expected_status(&self) -> bool {
        matches!(self.status.as_deref(), Some("OK") | Some("ZERO_RESULTS"))
    }

    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("OK")
    }
}

/// One raw search hit. Everything except the id and name is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

impl PlaceCandidate {
    pub fn new(place_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            name: Some(name.into()),
            raw: Map::new(),
        }
    }
}

/// Response from the details endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailsResponse {
    pub status: Option<String>,
    pub result: Option<PlaceDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: Option<f64>,
    pub formatted_phone_number: Option<String>,
    pub types: Option<PlaceTypes>,
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub user_ratings_total: Option<u64>,
}

/// Numbers and numeric strings; anything else reads as absent.
fn number_from(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(number_from(&Value::deserialize(deserializer)?))
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let count = number_from(&Value::deserialize(deserializer)?);
    Ok(count.filter(|n| *n >= 0.0).map(|n| n.round() as u64))
}

impl PlaceDetails {
    pub fn latitude(&self) -> Option<&Value> {
        self.location().and_then(|l| l.lat.as_ref())
    }

    pub fn longitude(&self) -> Option<&Value> {
        self.location().and_then(|l| l.lng.as_ref())
    }

    fn location(&self) -> Option<&Location> {
        self.geometry.as_ref().and_then(|g| g.location.as_ref())
    }
}

/// Type tags arrive as a list, but some payloads carry a single string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaceTypes {
    List(Vec<String>),
    Text(String),
}

impl PlaceTypes {
    /// Comma-joined for display.
    pub fn display(&self) -> String {
        match self {
            PlaceTypes::List(items) => items.join(", "),
            PlaceTypes::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: Option<Location>,
}

/// Coordinates are kept as raw JSON; numeric coercion happens at the sink.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: Option<Value>,
    pub lng: Option<Value>,
}

/// Response from the custom web-search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebSearchResponse {
    pub items: Option<Vec<WebSearchItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchItem {
    pub link: String,
}
