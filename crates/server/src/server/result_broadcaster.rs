use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, error};
use uuid::Uuid;

use crate::db::enums::{CustomCommandStatus, ProcedureExecutionStatus};

/// JSON-serialized update messages pushed to dashboard websocket clients.
pub type UpdateMsg = String;

#[derive(Debug, Clone)]
pub struct ResultBroadcaster {
    updates_tx: broadcast::Sender<UpdateMsg>,
}

impl ResultBroadcaster {
    pub fn new(updates_tx: broadcast::Sender<UpdateMsg>) -> Self {
        Self { updates_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UpdateMsg> {
        self.updates_tx.subscribe()
    }

    fn send_message(&self, message_type: &str, payload: serde_json::Value) {
        let message_content = json!({
            "type": message_type,
            "payload": payload,
        });
        match serde_json::to_string(&message_content) {
            Ok(json_string) => {
                let receiver_count = self.updates_tx.receiver_count();
                if receiver_count == 0 {
                    debug!(
                        message_type = message_type,
                        "No active receivers, skipping broadcast."
                    );
                    return;
                }
                if let Err(e) = self.updates_tx.send(json_string) {
                    error!(
                        message_type = message_type,
                        error = %e,
                        "Failed to broadcast update to {} receivers.",
                        receiver_count
                    );
                } else {
                    debug!(
                        message_type = message_type,
                        "Broadcasted update to {} receivers.",
                        receiver_count
                    );
                }
            }
            Err(e) => {
                error!(
                    message_type = message_type,
                    error = %e,
                    "Failed to serialize update message."
                );
            }
        }
    }

    pub fn broadcast_execution_update(
        &self,
        execution_id: Uuid,
        procedure_id: i32,
        computer_id: i32,
        status: ProcedureExecutionStatus,
    ) {
        let payload = json!({
            "executionId": execution_id.to_string(),
            "procedureId": procedure_id,
            "computerId": computer_id,
            "status": status,
        });
        self.send_message("EXECUTION_UPDATE", payload);
    }

    pub fn broadcast_command_update(
        &self,
        command_id: Uuid,
        computer_id: i32,
        status: CustomCommandStatus,
    ) {
        let payload = json!({
            "commandId": command_id.to_string(),
            "computerId": computer_id,
            "status": status,
        });
        self.send_message("COMMAND_UPDATE", payload);
    }
}
