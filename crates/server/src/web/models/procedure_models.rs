use serde::Deserialize;

use crate::db::entities::procedure::ProcedureKind;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedurePayload {
    pub name: String,
    pub description: Option<String>,
    pub kind: ProcedureKind,
}

/// Target of a manual run: exactly one of the two must be set.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunProcedureRequest {
    pub computer_id: Option<i32>,
    pub group_id: Option<i32>,
}
