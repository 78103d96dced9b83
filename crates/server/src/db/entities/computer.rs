use serde::{Deserialize, Serialize};

use crate::db::enums::ComputerStatus;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: i32,
    pub name: String,
    pub status: ComputerStatus,
    pub os: String,
    pub ip_address: String,
    pub last_seen: chrono::DateTime<chrono::Utc>,
    pub cpu_usage: Option<f64>,
    pub ram_usage: Option<f64>,
    pub disk_usage: Option<f64>,
    /// Inverse of group membership. Never written directly; kept in sync by
    /// the group membership routine on every group mutation.
    pub group_ids: Vec<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
