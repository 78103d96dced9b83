use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use std::sync::Arc;

use crate::db::store::{procedure_service, settings_service};
use crate::services::ai_service::GeneratedScript;
use crate::web::models::ai_models::{GenerateScriptRequest, ImproveProcedureRequest};
use crate::web::{AppError, AppState};

pub fn ai_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate-script", post(generate_script))
        .route("/improve-procedure/{id}", post(improve_procedure))
}

async fn generate_script(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<GenerateScriptRequest>,
) -> Result<Json<GeneratedScript>, AppError> {
    if payload.description.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Description must not be empty.".to_string(),
        ));
    }

    let credentials =
        settings_service::ai_credentials(&app_state.store, &app_state.encryption).await?;
    let generated = app_state
        .ai_client
        .generate_script(&credentials, payload.script_type, &payload.description)
        .await?;
    Ok(Json(generated))
}

async fn improve_procedure(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<ImproveProcedureRequest>,
) -> Result<Json<GeneratedScript>, AppError> {
    if payload.instructions.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Instructions must not be empty.".to_string(),
        ));
    }

    let procedure = procedure_service::get_procedure(&app_state.store, id).await?;
    let credentials =
        settings_service::ai_credentials(&app_state.store, &app_state.encryption).await?;
    let generated = app_state
        .ai_client
        .improve_procedure(&credentials, &procedure, &payload.instructions)
        .await?;
    Ok(Json(generated))
}
