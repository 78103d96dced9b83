use serde::{Deserialize, Serialize};

use crate::db::enums::SystemLicenseStatus;

/// The application's own license gate. `status` only records whether a key
/// was ever activated; Expired and ExceededLimit are derived on read from
/// `expires_at` and the current fleet size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub status: SystemLicenseStatus,
    pub license_key: Option<String>,
    pub max_computers: i32,
    pub activated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            status: SystemLicenseStatus::NotActivated,
            license_key: None,
            max_computers: 0,
            activated_at: None,
            expires_at: None,
        }
    }
}
