use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use std::sync::Arc;

use crate::db::entities::{procedure, procedure_execution};
use crate::db::store::procedure_service;
use crate::web::models::procedure_models::{ProcedurePayload, RunProcedureRequest};
use crate::web::{AppError, AppState};

pub fn procedure_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_procedure).get(list_procedures))
        .route(
            "/{id}",
            get(get_procedure).put(update_procedure).delete(delete_procedure),
        )
        .route("/{id}/run", post(run_procedure))
}

async fn list_procedures(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<procedure::Model>>, AppError> {
    let procedures = procedure_service::list_procedures(&app_state.store).await?;
    Ok(Json(procedures))
}

async fn get_procedure(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<procedure::Model>, AppError> {
    let procedure = procedure_service::get_procedure(&app_state.store, id).await?;
    Ok(Json(procedure))
}

async fn create_procedure(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ProcedurePayload>,
) -> Result<Json<procedure::Model>, AppError> {
    let procedure = procedure_service::create_procedure(
        &app_state.store,
        payload.name,
        payload.description,
        payload.kind,
    )
    .await?;
    Ok(Json(procedure))
}

async fn update_procedure(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<ProcedurePayload>,
) -> Result<Json<procedure::Model>, AppError> {
    let procedure = procedure_service::update_procedure(
        &app_state.store,
        id,
        payload.name,
        payload.description,
        payload.kind,
    )
    .await?;
    Ok(Json(procedure))
}

async fn delete_procedure(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<()>, AppError> {
    procedure_service::delete_procedure(&app_state.store, id).await?;
    Ok(Json(()))
}

/// Manual run against a single computer or every online member of a group.
async fn run_procedure(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<RunProcedureRequest>,
) -> Result<Json<Vec<procedure_execution::Model>>, AppError> {
    let executions = match (payload.computer_id, payload.group_id) {
        (Some(computer_id), None) => {
            vec![app_state.dispatcher.run_procedure(id, computer_id).await?]
        }
        (None, Some(group_id)) => {
            app_state
                .dispatcher
                .run_procedure_on_group(id, group_id)
                .await?
        }
        _ => {
            return Err(AppError::InvalidInput(
                "Provide either computerId or groupId, not both.".to_string(),
            ));
        }
    };
    Ok(Json(executions))
}
