use chrono::Utc;

use crate::db::entities::settings::{AiSettings, SmtpSettings};
use crate::db::store::Store;
use crate::notifications::encryption::{EncryptionError, EncryptionService};
use crate::web::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum SettingsServiceError {
    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),
    #[error("AI integration is not configured: {0}")]
    AiNotConfigured(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<SettingsServiceError> for AppError {
    fn from(err: SettingsServiceError) -> Self {
        match err {
            SettingsServiceError::Encryption(e) => AppError::InternalServerError(e.to_string()),
            SettingsServiceError::AiNotConfigured(s) => AppError::Conflict(s),
            SettingsServiceError::ValidationError(s) => AppError::InvalidInput(s),
        }
    }
}

/// Plaintext credentials handed to the AI client; never stored.
#[derive(Debug, Clone)]
pub struct AiCredentials {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

/// Returns settings as stored: secrets stay ciphertext. Redaction for API
/// responses happens in the route layer.
pub async fn get_smtp_settings(store: &Store) -> SmtpSettings {
    store.read().await.smtp_settings.clone()
}

/// `password`: `None` keeps the stored secret, `Some("")` clears it, any
/// other value is encrypted and replaces it.
#[allow(clippy::too_many_arguments)]
pub async fn update_smtp_settings(
    store: &Store,
    encryption: &EncryptionService,
    host: String,
    port: u16,
    username: String,
    password: Option<String>,
    sender_address: String,
    use_tls: bool,
) -> Result<SmtpSettings, SettingsServiceError> {
    let mut guard = store.write().await;
    let settings = &mut guard.smtp_settings;

    settings.host = host;
    settings.port = port;
    settings.username = username;
    settings.sender_address = sender_address;
    settings.use_tls = use_tls;
    match password {
        None => {}
        Some(p) if p.is_empty() => settings.password = String::new(),
        Some(p) => settings.password = encryption.encrypt_str(&p)?,
    }
    settings.updated_at = Utc::now();
    Ok(settings.clone())
}

pub async fn get_ai_settings(store: &Store) -> AiSettings {
    store.read().await.ai_settings.clone()
}

pub async fn update_ai_settings(
    store: &Store,
    encryption: &EncryptionService,
    enabled: bool,
    base_url: String,
    api_key: Option<String>,
    model: String,
) -> Result<AiSettings, SettingsServiceError> {
    if enabled && base_url.trim().is_empty() {
        return Err(SettingsServiceError::ValidationError(
            "baseUrl must not be empty when the AI integration is enabled.".to_string(),
        ));
    }

    let mut guard = store.write().await;
    let settings = &mut guard.ai_settings;

    settings.enabled = enabled;
    settings.base_url = base_url;
    settings.model = model;
    match api_key {
        None => {}
        Some(k) if k.is_empty() => settings.api_key = String::new(),
        Some(k) => settings.api_key = encryption.encrypt_str(&k)?,
    }
    settings.updated_at = Utc::now();
    Ok(settings.clone())
}

/// Decrypted credentials for an outbound AI call, or an error when the
/// integration is off or incomplete.
pub async fn ai_credentials(
    store: &Store,
    encryption: &EncryptionService,
) -> Result<AiCredentials, SettingsServiceError> {
    let settings = store.read().await.ai_settings.clone();
    if !settings.enabled {
        return Err(SettingsServiceError::AiNotConfigured(
            "The AI integration is disabled.".to_string(),
        ));
    }
    if settings.api_key.is_empty() {
        return Err(SettingsServiceError::AiNotConfigured(
            "No API key has been configured.".to_string(),
        ));
    }
    Ok(AiCredentials {
        base_url: settings.base_url,
        api_key: encryption.decrypt_str(&settings.api_key)?,
        model: settings.model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encryption() -> EncryptionService {
        let key =
            hex::decode("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f")
                .unwrap();
        EncryptionService::new(&key).unwrap()
    }

    #[tokio::test]
    async fn smtp_password_is_encrypted_at_rest_and_sticky() {
        let store = Store::new();
        let enc = encryption();

        let saved = update_smtp_settings(
            &store,
            &enc,
            "mail.example.com".to_string(),
            465,
            "alerts".to_string(),
            Some("hunter2".to_string()),
            "alerts@example.com".to_string(),
            true,
        )
        .await
        .unwrap();

        assert_ne!(saved.password, "hunter2");
        assert_eq!(enc.decrypt_str(&saved.password).unwrap(), "hunter2");

        // Updating without a password keeps the stored secret.
        let saved = update_smtp_settings(
            &store,
            &enc,
            "mail.example.com".to_string(),
            587,
            "alerts".to_string(),
            None,
            "alerts@example.com".to_string(),
            true,
        )
        .await
        .unwrap();
        assert_eq!(enc.decrypt_str(&saved.password).unwrap(), "hunter2");

        // An explicit empty password clears it.
        let saved = update_smtp_settings(
            &store,
            &enc,
            "mail.example.com".to_string(),
            587,
            "alerts".to_string(),
            Some(String::new()),
            "alerts@example.com".to_string(),
            true,
        )
        .await
        .unwrap();
        assert!(saved.password.is_empty());
    }

    #[tokio::test]
    async fn ai_credentials_require_enabled_integration_and_key() {
        let store = Store::new();
        let enc = encryption();

        assert!(matches!(
            ai_credentials(&store, &enc).await,
            Err(SettingsServiceError::AiNotConfigured(_))
        ));

        update_ai_settings(
            &store,
            &enc,
            true,
            "https://api.openai.com".to_string(),
            Some("sk-test-123".to_string()),
            "gpt-4o-mini".to_string(),
        )
        .await
        .unwrap();

        let creds = ai_credentials(&store, &enc).await.unwrap();
        assert_eq!(creds.api_key, "sk-test-123");
        assert_eq!(creds.model, "gpt-4o-mini");
    }
}
