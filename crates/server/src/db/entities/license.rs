use serde::{Deserialize, Serialize};

/// Third-party software license tracked for the fleet. Unrelated to the
/// application's own license gate (`system_license`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: i32,
    pub software_name: String,
    pub vendor: String,
    pub license_key: String,
    pub seats: i32,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
