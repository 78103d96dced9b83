use serde::{Deserialize, Serialize};

use crate::db::entities::settings::{AiSettings, SmtpSettings};

/// `password` semantics: absent keeps the stored secret, "" clears it,
/// anything else replaces it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpSettingsPayload {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub sender_address: String,
    #[serde(default)]
    pub use_tls: bool,
}

/// SMTP settings with the secret reduced to a presence flag.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpSettingsResponse {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub has_password: bool,
    pub sender_address: String,
    pub use_tls: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<SmtpSettings> for SmtpSettingsResponse {
    fn from(s: SmtpSettings) -> Self {
        Self {
            host: s.host,
            port: s.port,
            username: s.username,
            has_password: !s.password.is_empty(),
            sender_address: s.sender_address,
            use_tls: s.use_tls,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettingsPayload {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettingsResponse {
    pub enabled: bool,
    pub base_url: String,
    pub has_api_key: bool,
    pub model: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<AiSettings> for AiSettingsResponse {
    fn from(s: AiSettings) -> Self {
        Self {
            enabled: s.enabled,
            base_url: s.base_url,
            has_api_key: !s.api_key.is_empty(),
            model: s.model,
            updated_at: s.updated_at,
        }
    }
}
