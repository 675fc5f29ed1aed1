use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A coach as held in client state: the remote document plus the key it was
/// stored under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coach {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub description: String,
    pub hourly_rate: Decimal,
    pub areas: Vec<String>,
}

impl Coach {
    pub fn from_profile(id: impl Into<String>, profile: CoachProfile) -> Self {
        Self {
            id: id.into(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            description: profile.description,
            hourly_rate: profile.hourly_rate,
            areas: profile.areas,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_area(&self, area: &str) -> bool {
        self.areas.iter().any(|a| a == area)
    }
}

/// Wire form of a coach document, keyed externally by user id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoachProfile {
    pub first_name: String,
    pub last_name: String,
    pub description: String,
    pub hourly_rate: Decimal,
    pub areas: Vec<String>,
}
