use serde::Deserialize;

use crate::db::entities::procedure::ScriptType;

/// One-off command aimed at a computer or a group; exactly one target must
/// be set.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCommandRequest {
    pub computer_id: Option<i32>,
    pub group_id: Option<i32>,
    pub script_type: ScriptType,
    pub content: String,
}
