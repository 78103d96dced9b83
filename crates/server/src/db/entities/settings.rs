use serde::{Deserialize, Serialize};

/// Outbound mail configuration. `password` holds the AES-GCM ciphertext
/// (hex); an empty string means no password has been configured.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender_address: String,
    pub use_tls: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            username: String::new(),
            password: String::new(),
            sender_address: String::new(),
            use_tls: true,
            updated_at: chrono::Utc::now(),
        }
    }
}

/// Generative-AI provider configuration. `api_key` holds ciphertext (hex),
/// empty when unset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            updated_at: chrono::Utc::now(),
        }
    }
}
