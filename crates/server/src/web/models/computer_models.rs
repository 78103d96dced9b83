use serde::Deserialize;

use crate::db::enums::ComputerStatus;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComputerRequest {
    pub name: String,
    pub os: String,
    pub ip_address: String,
    #[serde(default = "default_status")]
    pub status: ComputerStatus,
}

fn default_status() -> ComputerStatus {
    ComputerStatus::Offline
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComputerRequest {
    pub name: Option<String>,
    pub os: Option<String>,
    pub ip_address: Option<String>,
    pub status: Option<ComputerStatus>,
}
