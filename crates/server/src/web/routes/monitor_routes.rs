use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::entities::{monitor, monitor_execution_log};
use crate::db::store::monitor_service;
use crate::web::models::monitor_models::MonitorPayload;
use crate::web::{AppError, AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub computer_id: Option<i32>,
}

pub fn monitor_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_monitor).get(list_monitors))
        .route(
            "/{id}",
            get(get_monitor).put(update_monitor).delete(delete_monitor),
        )
        .route("/{id}/logs", get(list_monitor_logs))
}

async fn list_monitors(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<monitor::Model>>, AppError> {
    let monitors = monitor_service::list_monitors(&app_state.store).await?;
    Ok(Json(monitors))
}

async fn get_monitor(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<monitor::Model>, AppError> {
    let monitor = monitor_service::get_monitor(&app_state.store, id).await?;
    Ok(Json(monitor))
}

async fn create_monitor(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<MonitorPayload>,
) -> Result<Json<monitor::Model>, AppError> {
    let monitor = monitor_service::create_monitor(
        &app_state.store,
        payload.name,
        payload.description,
        payload.script_type,
        payload.script_content,
        payload.default_interval_value,
        payload.default_interval_unit,
        payload.send_email_on_alert,
    )
    .await?;
    Ok(Json(monitor))
}

async fn update_monitor(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<MonitorPayload>,
) -> Result<Json<monitor::Model>, AppError> {
    let monitor = monitor_service::update_monitor(
        &app_state.store,
        id,
        payload.name,
        payload.description,
        payload.script_type,
        payload.script_content,
        payload.default_interval_value,
        payload.default_interval_unit,
        payload.send_email_on_alert,
    )
    .await?;
    Ok(Json(monitor))
}

async fn delete_monitor(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<()>, AppError> {
    monitor_service::delete_monitor(&app_state.store, id).await?;
    Ok(Json(()))
}

async fn list_monitor_logs(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(filter): Query<LogFilter>,
) -> Result<Json<Vec<monitor_execution_log::Model>>, AppError> {
    // Surface a 404 for unknown monitors instead of an empty history.
    monitor_service::get_monitor(&app_state.store, id).await?;
    let logs = monitor_service::list_logs(&app_state.store, Some(id), filter.computer_id).await;
    Ok(Json(logs))
}
