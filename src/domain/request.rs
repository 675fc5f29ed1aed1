use serde::{Deserialize, Serialize};

/// A contact request received by a coach, tagged with the key it was stored
/// under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactRequest {
    pub id: String,
    pub coach_id: String,
    pub user_email: String,
    pub message: String,
}

/// Wire form of a request document, keyed externally under the coach id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestMessage {
    pub user_email: String,
    pub message: String,
}
