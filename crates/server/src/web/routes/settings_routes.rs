use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use std::sync::Arc;

use crate::db::store::settings_service;
use crate::web::models::settings_models::{
    AiSettingsPayload, AiSettingsResponse, SmtpSettingsPayload, SmtpSettingsResponse,
};
use crate::web::{AppError, AppState};

pub fn settings_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/smtp", get(get_smtp_settings).put(update_smtp_settings))
        .route("/ai", get(get_ai_settings).put(update_ai_settings))
}

async fn get_smtp_settings(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<SmtpSettingsResponse>, AppError> {
    let settings = settings_service::get_smtp_settings(&app_state.store).await;
    Ok(Json(settings.into()))
}

async fn update_smtp_settings(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<SmtpSettingsPayload>,
) -> Result<Json<SmtpSettingsResponse>, AppError> {
    let settings = settings_service::update_smtp_settings(
        &app_state.store,
        &app_state.encryption,
        payload.host,
        payload.port,
        payload.username,
        payload.password,
        payload.sender_address,
        payload.use_tls,
    )
    .await?;
    Ok(Json(settings.into()))
}

async fn get_ai_settings(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<AiSettingsResponse>, AppError> {
    let settings = settings_service::get_ai_settings(&app_state.store).await;
    Ok(Json(settings.into()))
}

async fn update_ai_settings(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<AiSettingsPayload>,
) -> Result<Json<AiSettingsResponse>, AppError> {
    let settings = settings_service::update_ai_settings(
        &app_state.store,
        &app_state.encryption,
        payload.enabled,
        payload.base_url,
        payload.api_key,
        payload.model,
    )
    .await?;
    Ok(Json(settings.into()))
}
