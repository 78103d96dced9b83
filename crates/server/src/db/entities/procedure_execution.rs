use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::enums::ProcedureExecutionStatus;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Uuid,
    pub procedure_id: i32,
    pub computer_id: i32,
    /// Snapshot of the computer name at creation time; survives renames and
    /// deletion of the computer's historical peers.
    pub computer_name: String,
    pub status: ProcedureExecutionStatus,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    /// Append-only.
    pub logs: String,
    pub output: String,
    pub run_as_user: bool,
}
