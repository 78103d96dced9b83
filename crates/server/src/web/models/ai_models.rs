use serde::Deserialize;

use crate::db::entities::procedure::ScriptType;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateScriptRequest {
    pub description: String,
    pub script_type: ScriptType,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveProcedureRequest {
    pub instructions: String,
}
