use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Uuid,
    pub monitor_id: i32,
    pub computer_id: i32,
    pub computer_name: String,
    pub executed_at: chrono::DateTime<chrono::Utc>,
    pub is_alert: bool,
    pub output: String,
}
