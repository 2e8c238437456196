/// Placeholder for fields the upstream did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Positional split of a formatted address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressParts {
    pub street: String,
    pub neighborhood: String,
    pub locality: String,
}

impl Default for AddressParts {
    fn default() -> Self {
        Self {
            street: NOT_AVAILABLE.to_string(),
            neighborhood: NOT_AVAILABLE.to_string(),
            locality: NOT_AVAILABLE.to_string(),
        }
    }
}

/// First three comma-separated segments are street, neighborhood, locality.
/// Missing segments stay "N/A".
///
/// `"Av. Paulista, 1000 - Bela Vista, São Paulo - SP, Brasil"` splits as
/// street `"Av. Paulista"`, neighborhood `"1000 - Bela Vista"`, locality
/// `"São Paulo - SP"`; the upstream format is taken as-is.
pub fn parse_address(formatted: &str) -> AddressParts {
    let mut parts = AddressParts::default();
    let mut segments = formatted.split(',').map(str::trim);

    let slots = [
        &mut parts.street,
        &mut parts.neighborhood,
        &mut parts.locality,
    ];
    for slot in slots {
        match segments.next() {
            Some(segment) => *slot = segment.to_string(),
            None => break,
        }
    }

    parts
}
