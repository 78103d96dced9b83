use serde::Deserialize;

use crate::db::entities::computer_group::{AssociatedMonitorConfig, AssociatedProcedureConfig};

/// Full group payload; used for both create and update. Member order is
/// taken as given (it is user-reorderable and significant).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPayload {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub computer_ids: Vec<i32>,
    #[serde(default)]
    pub associated_procedures: Vec<AssociatedProcedureConfig>,
    #[serde(default)]
    pub associated_monitors: Vec<AssociatedMonitorConfig>,
}
