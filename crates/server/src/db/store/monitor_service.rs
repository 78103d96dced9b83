use chrono::Utc;
use uuid::Uuid;

use crate::db::entities::computer_group::MonitorIntervalUnit;
use crate::db::entities::procedure::ScriptType;
use crate::db::entities::{monitor, monitor_execution_log};
use crate::db::store::Store;
use crate::web::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum MonitorServiceError {
    #[error("Monitor not found: {0}")]
    NotFound(i32),
    #[error("Computer not found: {0}")]
    ComputerNotFound(i32),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<MonitorServiceError> for AppError {
    fn from(err: MonitorServiceError) -> Self {
        match err {
            MonitorServiceError::NotFound(id) => {
                AppError::NotFound(format!("Monitor with ID {id} not found"))
            }
            MonitorServiceError::ComputerNotFound(id) => {
                AppError::NotFound(format!("Computer with ID {id} not found"))
            }
            MonitorServiceError::ValidationError(s) => AppError::InvalidInput(s),
        }
    }
}

pub async fn list_monitors(store: &Store) -> Result<Vec<monitor::Model>, MonitorServiceError> {
    let guard = store.read().await;
    let mut monitors: Vec<monitor::Model> = guard.monitors.values().cloned().collect();
    monitors.sort_by_key(|m| m.id);
    Ok(monitors)
}

pub async fn get_monitor(store: &Store, id: i32) -> Result<monitor::Model, MonitorServiceError> {
    let guard = store.read().await;
    guard
        .monitors
        .get(&id)
        .cloned()
        .ok_or(MonitorServiceError::NotFound(id))
}

#[allow(clippy::too_many_arguments)]
pub async fn create_monitor(
    store: &Store,
    name: String,
    description: Option<String>,
    script_type: ScriptType,
    script_content: String,
    default_interval_value: u32,
    default_interval_unit: MonitorIntervalUnit,
    send_email_on_alert: bool,
) -> Result<monitor::Model, MonitorServiceError> {
    if name.trim().is_empty() {
        return Err(MonitorServiceError::ValidationError(
            "Monitor name must not be empty.".to_string(),
        ));
    }
    if default_interval_value < 1 {
        return Err(MonitorServiceError::ValidationError(
            "defaultIntervalValue must be at least 1".to_string(),
        ));
    }

    let mut guard = store.write().await;
    let now = Utc::now();
    let id = guard.alloc_id();
    let model = monitor::Model {
        id,
        name,
        description,
        script_type,
        script_content,
        default_interval_value,
        default_interval_unit,
        send_email_on_alert,
        created_at: now,
        updated_at: now,
    };
    guard.monitors.insert(id, model.clone());
    Ok(model)
}

#[allow(clippy::too_many_arguments)]
pub async fn update_monitor(
    store: &Store,
    id: i32,
    name: String,
    description: Option<String>,
    script_type: ScriptType,
    script_content: String,
    default_interval_value: u32,
    default_interval_unit: MonitorIntervalUnit,
    send_email_on_alert: bool,
) -> Result<monitor::Model, MonitorServiceError> {
    if name.trim().is_empty() {
        return Err(MonitorServiceError::ValidationError(
            "Monitor name must not be empty.".to_string(),
        ));
    }
    if default_interval_value < 1 {
        return Err(MonitorServiceError::ValidationError(
            "defaultIntervalValue must be at least 1".to_string(),
        ));
    }

    let mut guard = store.write().await;
    let model = guard
        .monitors
        .get_mut(&id)
        .ok_or(MonitorServiceError::NotFound(id))?;
    model.name = name;
    model.description = description;
    model.script_type = script_type;
    model.script_content = script_content;
    model.default_interval_value = default_interval_value;
    model.default_interval_unit = default_interval_unit;
    model.send_email_on_alert = send_email_on_alert;
    model.updated_at = Utc::now();
    Ok(model.clone())
}

/// Removes the monitor, its group associations, and its execution logs.
pub async fn delete_monitor(store: &Store, id: i32) -> Result<(), MonitorServiceError> {
    let mut guard = store.write().await;
    let inner = &mut *guard;

    if inner.monitors.remove(&id).is_none() {
        return Err(MonitorServiceError::NotFound(id));
    }

    let now = Utc::now();
    for group in inner.groups.values_mut() {
        let before = group.associated_monitors.len();
        group.associated_monitors.retain(|cfg| cfg.monitor_id != id);
        if group.associated_monitors.len() != before {
            group.updated_at = now;
        }
    }
    inner.monitor_logs.retain(|_, log| log.monitor_id != id);
    Ok(())
}

/// Nothing in this codebase executes a monitor script; logs exist as seed
/// and imported history only.
pub async fn insert_log(
    store: &Store,
    monitor_id: i32,
    computer_id: i32,
    is_alert: bool,
    output: String,
) -> Result<monitor_execution_log::Model, MonitorServiceError> {
    let mut guard = store.write().await;
    let inner = &mut *guard;

    if !inner.monitors.contains_key(&monitor_id) {
        return Err(MonitorServiceError::NotFound(monitor_id));
    }
    let computer = inner
        .computers
        .get(&computer_id)
        .ok_or(MonitorServiceError::ComputerNotFound(computer_id))?;

    let model = monitor_execution_log::Model {
        id: Uuid::new_v4(),
        monitor_id,
        computer_id,
        computer_name: computer.name.clone(),
        executed_at: Utc::now(),
        is_alert,
        output,
    };
    inner.monitor_logs.insert(model.id, model.clone());
    Ok(model)
}

pub async fn list_logs(
    store: &Store,
    monitor_id: Option<i32>,
    computer_id: Option<i32>,
) -> Vec<monitor_execution_log::Model> {
    let guard = store.read().await;
    let mut logs: Vec<monitor_execution_log::Model> = guard
        .monitor_logs
        .values()
        .filter(|l| monitor_id.is_none_or(|mid| l.monitor_id == mid))
        .filter(|l| computer_id.is_none_or(|cid| l.computer_id == cid))
        .cloned()
        .collect();
    logs.sort_by(|a, b| b.executed_at.cmp(&a.executed_at));
    logs
}
