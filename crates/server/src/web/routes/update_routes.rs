use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

use crate::server::result_broadcaster::UpdateMsg;
use crate::web::AppState;

pub fn update_routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(updates_ws))
}

async fn updates_ws(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rx = app_state.result_broadcaster.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, rx))
}

/// Forwards execution/command updates to the client until either side goes
/// away. Inbound frames are ignored; this channel is push-only.
async fn handle_socket(socket: WebSocket, mut rx: broadcast::Receiver<UpdateMsg>) {
    let (mut sender, mut receiver) = socket.split();
    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Ok(msg) => {
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Websocket client lagged behind the update stream.");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}
