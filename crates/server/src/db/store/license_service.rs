use chrono::{Duration, Utc};

use crate::db::entities::{license, system_license};
use crate::db::enums::SystemLicenseStatus;
use crate::db::store::{Store, StoreInner};
use crate::web::error::AppError;

/// Activation is a format check only; there is no cryptographic validation
/// behind it.
const LICENSE_KEY_GROUPS: usize = 5;
const LICENSE_KEY_GROUP_LEN: usize = 5;
const ACTIVATION_TERM_DAYS: i64 = 365;
const ACTIVATED_MAX_COMPUTERS: i32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum LicenseServiceError {
    #[error("License not found: {0}")]
    NotFound(i32),
    #[error("Invalid license key format")]
    InvalidKey,
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<LicenseServiceError> for AppError {
    fn from(err: LicenseServiceError) -> Self {
        match err {
            LicenseServiceError::NotFound(id) => {
                AppError::NotFound(format!("License with ID {id} not found"))
            }
            LicenseServiceError::InvalidKey => {
                AppError::InvalidInput("Invalid license key format".to_string())
            }
            LicenseServiceError::ValidationError(s) => AppError::InvalidInput(s),
        }
    }
}

pub async fn list_licenses(store: &Store) -> Result<Vec<license::Model>, LicenseServiceError> {
    let guard = store.read().await;
    let mut licenses: Vec<license::Model> = guard.licenses.values().cloned().collect();
    licenses.sort_by_key(|l| l.id);
    Ok(licenses)
}

pub async fn get_license(store: &Store, id: i32) -> Result<license::Model, LicenseServiceError> {
    let guard = store.read().await;
    guard
        .licenses
        .get(&id)
        .cloned()
        .ok_or(LicenseServiceError::NotFound(id))
}

#[allow(clippy::too_many_arguments)]
pub async fn create_license(
    store: &Store,
    software_name: String,
    vendor: String,
    license_key: String,
    seats: i32,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
    notes: Option<String>,
) -> Result<license::Model, LicenseServiceError> {
    if software_name.trim().is_empty() {
        return Err(LicenseServiceError::ValidationError(
            "Software name must not be empty.".to_string(),
        ));
    }
    if seats < 1 {
        return Err(LicenseServiceError::ValidationError(
            "Seat count must be at least 1.".to_string(),
        ));
    }

    let mut guard = store.write().await;
    let now = Utc::now();
    let id = guard.alloc_id();
    let model = license::Model {
        id,
        software_name,
        vendor,
        license_key,
        seats,
        expires_at,
        notes,
        created_at: now,
        updated_at: now,
    };
    guard.licenses.insert(id, model.clone());
    Ok(model)
}

#[allow(clippy::too_many_arguments)]
pub async fn update_license(
    store: &Store,
    id: i32,
    software_name: String,
    vendor: String,
    license_key: String,
    seats: i32,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
    notes: Option<String>,
) -> Result<license::Model, LicenseServiceError> {
    if software_name.trim().is_empty() {
        return Err(LicenseServiceError::ValidationError(
            "Software name must not be empty.".to_string(),
        ));
    }
    if seats < 1 {
        return Err(LicenseServiceError::ValidationError(
            "Seat count must be at least 1.".to_string(),
        ));
    }

    let mut guard = store.write().await;
    let model = guard
        .licenses
        .get_mut(&id)
        .ok_or(LicenseServiceError::NotFound(id))?;
    model.software_name = software_name;
    model.vendor = vendor;
    model.license_key = license_key;
    model.seats = seats;
    model.expires_at = expires_at;
    model.notes = notes;
    model.updated_at = Utc::now();
    Ok(model.clone())
}

pub async fn delete_license(store: &Store, id: i32) -> Result<(), LicenseServiceError> {
    let mut guard = store.write().await;
    if guard.licenses.remove(&id).is_none() {
        return Err(LicenseServiceError::NotFound(id));
    }
    Ok(())
}

/// The status the rest of the application acts on. Expiry and the fleet
/// limit are evaluated against the current clock and fleet size on every
/// read; the stored status only records whether a key was activated.
pub fn effective_system_status(inner: &StoreInner) -> SystemLicenseStatus {
    let lic = &inner.system_license;
    if lic.status == SystemLicenseStatus::NotActivated {
        return SystemLicenseStatus::NotActivated;
    }
    if let Some(expires_at) = lic.expires_at {
        if expires_at < Utc::now() {
            return SystemLicenseStatus::Expired;
        }
    }
    if lic.max_computers > 0 && inner.computers.len() as i32 > lic.max_computers {
        return SystemLicenseStatus::ExceededLimit;
    }
    SystemLicenseStatus::Valid
}

pub async fn get_system_license(store: &Store) -> system_license::Model {
    let guard = store.read().await;
    let mut model = guard.system_license.clone();
    model.status = effective_system_status(&guard);
    model
}

fn key_format_is_valid(key: &str) -> bool {
    let groups: Vec<&str> = key.split('-').collect();
    groups.len() == LICENSE_KEY_GROUPS
        && groups.iter().all(|g| {
            g.len() == LICENSE_KEY_GROUP_LEN
                && g.chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_lowercase())
        })
}

pub async fn activate_system_license(
    store: &Store,
    key: String,
) -> Result<system_license::Model, LicenseServiceError> {
    if !key_format_is_valid(&key) {
        return Err(LicenseServiceError::InvalidKey);
    }

    let mut guard = store.write().await;
    let now = Utc::now();
    guard.system_license = system_license::Model {
        status: SystemLicenseStatus::Valid,
        license_key: Some(key),
        max_computers: ACTIVATED_MAX_COMPUTERS,
        activated_at: Some(now),
        expires_at: Some(now + Duration::days(ACTIVATION_TERM_DAYS)),
    };

    let mut model = guard.system_license.clone();
    model.status = effective_system_status(&guard);
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::ComputerStatus;
    use crate::db::store::computer_service;

    const KEY: &str = "AB12C-DE34F-GH56J-KL78M-NP90Q";

    #[tokio::test]
    async fn fresh_store_is_not_activated() {
        let store = Store::new();
        let lic = get_system_license(&store).await;
        assert_eq!(lic.status, SystemLicenseStatus::NotActivated);
    }

    #[tokio::test]
    async fn activation_validates_key_format() {
        let store = Store::new();
        assert!(matches!(
            activate_system_license(&store, "not-a-key".to_string()).await,
            Err(LicenseServiceError::InvalidKey)
        ));
        assert!(matches!(
            activate_system_license(&store, "ab12c-de34f-gh56j-kl78m-np90q".to_string()).await,
            Err(LicenseServiceError::InvalidKey)
        ));

        let lic = activate_system_license(&store, KEY.to_string()).await.unwrap();
        assert_eq!(lic.status, SystemLicenseStatus::Valid);
        assert!(lic.expires_at.is_some());
    }

    #[tokio::test]
    async fn expiry_is_derived_on_read() {
        let store = Store::new();
        activate_system_license(&store, KEY.to_string()).await.unwrap();
        {
            let mut guard = store.write().await;
            guard.system_license.expires_at = Some(Utc::now() - Duration::days(1));
        }
        let lic = get_system_license(&store).await;
        assert_eq!(lic.status, SystemLicenseStatus::Expired);
    }

    #[tokio::test]
    async fn exceeding_the_fleet_limit_is_derived_on_read() {
        let store = Store::new();
        activate_system_license(&store, KEY.to_string()).await.unwrap();
        {
            let mut guard = store.write().await;
            guard.system_license.max_computers = 1;
        }
        for i in 0..2 {
            computer_service::create_computer(
                &store,
                format!("ws-{i}"),
                "Windows 11".to_string(),
                "10.0.0.5".to_string(),
                ComputerStatus::Online,
            )
            .await
            .unwrap();
        }
        let lic = get_system_license(&store).await;
        assert_eq!(lic.status, SystemLicenseStatus::ExceededLimit);
    }
}
