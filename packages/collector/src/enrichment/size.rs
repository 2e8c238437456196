use serde::{Deserialize, Serialize};
use std::fmt;

/// Size bucket inferred from the number of user reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompanySize {
    Small,
    Medium,
    Large,
}

pub const MEDIUM_MIN_REVIEWS: u64 = 20;
pub const LARGE_MIN_REVIEWS: u64 = 100;

impl CompanySize {
    pub fn classify(review_count: Option<u64>) -> Self {
        match review_count.unwrap_or(0) {
            n if n >= LARGE_MIN_REVIEWS => CompanySize::Large,
            n if n >= MEDIUM_MIN_REVIEWS => CompanySize::Medium,
            _ => CompanySize::Small,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanySize::Small => "Small",
            CompanySize::Medium => "Medium",
            CompanySize::Large => "Large",
        }
    }
}

impl fmt::Display for CompanySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
