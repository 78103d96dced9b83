use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use std::sync::Arc;
use tracing::warn;

use crate::db::entities::computer_group;
use crate::db::store::group_service;
use crate::web::models::group_models::GroupPayload;
use crate::web::{AppError, AppState};

pub fn group_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_group).get(list_groups))
        .route("/{id}", get(get_group).put(update_group).delete(delete_group))
}

async fn list_groups(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<computer_group::Model>>, AppError> {
    let groups = group_service::list_groups(&app_state.store).await?;
    Ok(Json(groups))
}

async fn get_group(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<computer_group::Model>, AppError> {
    let group = group_service::get_group(&app_state.store, id).await?;
    Ok(Json(group))
}

async fn create_group(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<GroupPayload>,
) -> Result<Json<computer_group::Model>, AppError> {
    let (group, added) = group_service::create_group(
        &app_state.store,
        payload.name,
        payload.description,
        payload.computer_ids,
        payload.associated_procedures,
        payload.associated_monitors,
    )
    .await?;
    fire_new_member_procedures(&app_state, &group, &added).await;
    Ok(Json(group))
}

async fn update_group(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<GroupPayload>,
) -> Result<Json<computer_group::Model>, AppError> {
    let (group, added) = group_service::update_group(
        &app_state.store,
        id,
        payload.name,
        payload.description,
        payload.computer_ids,
        payload.associated_procedures,
        payload.associated_monitors,
    )
    .await?;
    fire_new_member_procedures(&app_state, &group, &added).await;
    Ok(Json(group))
}

async fn delete_group(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<()>, AppError> {
    group_service::delete_group(&app_state.store, id).await?;
    Ok(Json(()))
}

/// The membership change has already been committed; a trigger failure must
/// not fail the request.
async fn fire_new_member_procedures(
    app_state: &AppState,
    group: &computer_group::Model,
    added: &[i32],
) {
    if let Err(e) = app_state
        .dispatcher
        .run_new_member_procedures(group, added)
        .await
    {
        warn!(group_id = group.id, error = %e, "Failed to fire run-on-new-member procedures.");
    }
}
