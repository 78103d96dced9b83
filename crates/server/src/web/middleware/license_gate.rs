use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::db::enums::SystemLicenseStatus;
use crate::db::store::license_service;
use crate::web::{AppError, AppState};

/// Mutating API calls require a Valid system license. Reads always pass,
/// and so does the system-license endpoint itself: activation must work on
/// an unlicensed install. This is a product gate, not a security boundary.
pub async fn license_gate(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let method = req.method();
    let read_only = method == Method::GET || method == Method::HEAD || method == Method::OPTIONS;
    let license_endpoint = req.uri().path().starts_with("/api/licenses/system");

    if !read_only && !license_endpoint {
        let status = {
            let guard = state.store.read().await;
            license_service::effective_system_status(&guard)
        };
        if status != SystemLicenseStatus::Valid {
            return Err(AppError::LicenseRestricted(format!(
                "This action requires a valid license (current status: {status})."
            )));
        }
    }

    Ok(next.run(req).await)
}
