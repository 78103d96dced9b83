use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use std::sync::Arc;

use crate::db::entities::computer;
use crate::db::store::computer_service;
use crate::web::{AppError, AppState};
use crate::web::models::computer_models::{CreateComputerRequest, UpdateComputerRequest};

pub fn computer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_computer).get(list_computers))
        .route(
            "/{id}",
            get(get_computer).put(update_computer).delete(delete_computer),
        )
}

async fn list_computers(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<computer::Model>>, AppError> {
    let computers = computer_service::list_computers(&app_state.store).await?;
    Ok(Json(computers))
}

async fn get_computer(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<computer::Model>, AppError> {
    let computer = computer_service::get_computer(&app_state.store, id).await?;
    Ok(Json(computer))
}

async fn create_computer(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateComputerRequest>,
) -> Result<Json<computer::Model>, AppError> {
    let computer = computer_service::create_computer(
        &app_state.store,
        payload.name,
        payload.os,
        payload.ip_address,
        payload.status,
    )
    .await?;
    Ok(Json(computer))
}

async fn update_computer(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateComputerRequest>,
) -> Result<Json<computer::Model>, AppError> {
    let computer = computer_service::update_computer(
        &app_state.store,
        id,
        payload.name,
        payload.os,
        payload.ip_address,
        payload.status,
    )
    .await?;
    Ok(Json(computer))
}

async fn delete_computer(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<()>, AppError> {
    computer_service::delete_computer(&app_state.store, id).await?;
    Ok(Json(()))
}
