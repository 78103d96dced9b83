use serde::Deserialize;

use crate::db::entities::computer_group::MonitorIntervalUnit;
use crate::db::entities::procedure::ScriptType;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorPayload {
    pub name: String,
    pub description: Option<String>,
    pub script_type: ScriptType,
    pub script_content: String,
    pub default_interval_value: u32,
    pub default_interval_unit: MonitorIntervalUnit,
    #[serde(default)]
    pub send_email_on_alert: bool,
}
