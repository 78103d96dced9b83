use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use std::sync::Arc;

use crate::db::entities::{license, system_license};
use crate::db::store::license_service;
use crate::web::models::license_models::{ActivateLicenseRequest, LicensePayload};
use crate::web::{AppError, AppState};

pub fn license_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_license).get(list_licenses))
        // The application's own gate; its routes are exempt from the gate
        // itself so activation works on an unlicensed install.
        .route("/system", get(get_system_license))
        .route("/system/activate", post(activate_system_license))
        .route(
            "/{id}",
            get(get_license).put(update_license).delete(delete_license),
        )
}

async fn list_licenses(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<license::Model>>, AppError> {
    let licenses = license_service::list_licenses(&app_state.store).await?;
    Ok(Json(licenses))
}

async fn get_license(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<license::Model>, AppError> {
    let license = license_service::get_license(&app_state.store, id).await?;
    Ok(Json(license))
}

async fn create_license(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<LicensePayload>,
) -> Result<Json<license::Model>, AppError> {
    let license = license_service::create_license(
        &app_state.store,
        payload.software_name,
        payload.vendor,
        payload.license_key,
        payload.seats,
        payload.expires_at,
        payload.notes,
    )
    .await?;
    Ok(Json(license))
}

async fn update_license(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<LicensePayload>,
) -> Result<Json<license::Model>, AppError> {
    let license = license_service::update_license(
        &app_state.store,
        id,
        payload.software_name,
        payload.vendor,
        payload.license_key,
        payload.seats,
        payload.expires_at,
        payload.notes,
    )
    .await?;
    Ok(Json(license))
}

async fn delete_license(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<()>, AppError> {
    license_service::delete_license(&app_state.store, id).await?;
    Ok(Json(()))
}

async fn get_system_license(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<system_license::Model>, AppError> {
    let info = license_service::get_system_license(&app_state.store).await;
    Ok(Json(info))
}

async fn activate_system_license(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ActivateLicenseRequest>,
) -> Result<Json<system_license::Model>, AppError> {
    let info =
        license_service::activate_system_license(&app_state.store, payload.license_key).await?;
    Ok(Json(info))
}
