use serde::{Deserialize, Serialize};

/// A contact card. Purely presentational, never synchronized anywhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Friend {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
}
