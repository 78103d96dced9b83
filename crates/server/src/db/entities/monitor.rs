use serde::{Deserialize, Serialize};

use crate::db::entities::computer_group::MonitorIntervalUnit;
use crate::db::entities::procedure::ScriptType;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub script_type: ScriptType,
    pub script_content: String,
    pub default_interval_value: u32,
    pub default_interval_unit: MonitorIntervalUnit,
    pub send_email_on_alert: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
