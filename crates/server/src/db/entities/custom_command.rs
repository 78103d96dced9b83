use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::entities::procedure::ScriptType;
use crate::db::enums::CustomCommandStatus;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Uuid,
    pub computer_id: i32,
    pub computer_name: String,
    /// Present when this record came out of a group fan-out.
    pub group_id: Option<i32>,
    pub script_type: ScriptType,
    pub content: String,
    pub status: CustomCommandStatus,
    pub sent_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub output: Option<String>,
}
