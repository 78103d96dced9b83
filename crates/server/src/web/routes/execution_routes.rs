use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::entities::procedure_execution;
use crate::db::store::execution_service;
use crate::web::{AppError, AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionFilter {
    pub procedure_id: Option<i32>,
    pub computer_id: Option<i32>,
}

pub fn execution_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_executions))
        .route("/{id}", get(get_execution))
}

async fn list_executions(
    State(app_state): State<Arc<AppState>>,
    Query(filter): Query<ExecutionFilter>,
) -> Result<Json<Vec<procedure_execution::Model>>, AppError> {
    let executions = execution_service::list_executions(
        &app_state.store,
        filter.procedure_id,
        filter.computer_id,
    )
    .await?;
    Ok(Json(executions))
}

async fn get_execution(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<procedure_execution::Model>, AppError> {
    let execution = execution_service::get_execution(&app_state.store, id).await?;
    Ok(Json(execution))
}
