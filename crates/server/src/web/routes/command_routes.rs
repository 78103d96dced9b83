use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use std::sync::Arc;

use crate::db::entities::custom_command;
use crate::web::models::command_models::SendCommandRequest;
use crate::web::{AppError, AppState};

pub fn command_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(send_command).get(command_history))
}

async fn send_command(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<SendCommandRequest>,
) -> Result<Json<Vec<custom_command::Model>>, AppError> {
    let commands = match (payload.computer_id, payload.group_id) {
        (Some(computer_id), None) => {
            vec![
                app_state
                    .dispatcher
                    .send_command_to_computer(computer_id, payload.script_type, payload.content)
                    .await?,
            ]
        }
        (None, Some(group_id)) => {
            app_state
                .dispatcher
                .send_command_to_group(group_id, payload.script_type, payload.content)
                .await?
        }
        _ => {
            return Err(AppError::InvalidInput(
                "Provide either computerId or groupId, not both.".to_string(),
            ));
        }
    };
    Ok(Json(commands))
}

/// Fetching the history is what settles outstanding commands; there is no
/// timer behind them.
async fn command_history(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<custom_command::Model>>, AppError> {
    let commands = app_state.dispatcher.command_history().await;
    Ok(Json(commands))
}
