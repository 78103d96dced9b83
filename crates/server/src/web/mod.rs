pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::{Router, http::HeaderValue};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::db::store::Store;
use crate::server::config::ServerConfig;
use crate::server::dispatcher::ExecutionDispatcher;
use crate::server::result_broadcaster::ResultBroadcaster;
use crate::services::ai_service::AiClient;
use crate::notifications::encryption::EncryptionService;

pub use error::AppError;

pub struct AppState {
    pub store: Store,
    pub dispatcher: ExecutionDispatcher,
    pub ai_client: AiClient,
    pub encryption: Arc<EncryptionService>,
    pub result_broadcaster: Arc<ResultBroadcaster>,
    pub config: Arc<ServerConfig>,
}

pub fn create_axum_router(
    store: Store,
    dispatcher: ExecutionDispatcher,
    ai_client: AiClient,
    encryption: Arc<EncryptionService>,
    result_broadcaster: Arc<ResultBroadcaster>,
    config: Arc<ServerConfig>,
) -> Router {
    let cors = match config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            warn!(frontend_url = %config.frontend_url, error = %e, "Invalid frontend URL, CORS restricted to same origin.");
            CorsLayer::new()
        }
    };

    let app_state = Arc::new(AppState {
        store,
        dispatcher,
        ai_client,
        encryption,
        result_broadcaster,
        config,
    });

    let api = Router::new()
        .nest("/computers", routes::computer_routes::computer_routes())
        .nest("/groups", routes::group_routes::group_routes())
        .nest("/procedures", routes::procedure_routes::procedure_routes())
        .nest("/executions", routes::execution_routes::execution_routes())
        .nest("/monitors", routes::monitor_routes::monitor_routes())
        .nest("/commands", routes::command_routes::command_routes())
        .nest("/licenses", routes::license_routes::license_routes())
        .nest("/settings", routes::settings_routes::settings_routes())
        .nest("/ai", routes::ai_routes::ai_routes())
        .nest("/updates", routes::update_routes::update_routes());

    Router::new()
        .nest("/api", api)
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::license_gate::license_gate,
        ))
        .layer(cors)
        .with_state(app_state)
}
