use chrono::{Duration, Utc};
use rand::Rng;
use tracing::info;

use crate::db::entities::computer;
use crate::db::enums::ComputerStatus;
use crate::db::store::Store;
use crate::web::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ComputerServiceError {
    #[error("Computer not found: {0}")]
    NotFound(i32),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ComputerServiceError> for AppError {
    fn from(err: ComputerServiceError) -> Self {
        match err {
            ComputerServiceError::NotFound(id) => {
                AppError::NotFound(format!("Computer with ID {id} not found"))
            }
            ComputerServiceError::ValidationError(s) => AppError::InvalidInput(s),
        }
    }
}

/// Online computers report fresh usage figures and a recent last_seen on
/// every read. The figures are never produced on the write path.
fn refresh_telemetry(model: &mut computer::Model) {
    let mut rng = rand::rng();
    model.cpu_usage = Some((rng.random_range(2.0..95.0_f64) * 10.0).round() / 10.0);
    model.ram_usage = Some((rng.random_range(10.0..90.0_f64) * 10.0).round() / 10.0);
    model.disk_usage = Some((rng.random_range(20.0..85.0_f64) * 10.0).round() / 10.0);
    model.last_seen = Utc::now() - Duration::seconds(rng.random_range(0..120));
}

pub async fn list_computers(store: &Store) -> Result<Vec<computer::Model>, ComputerServiceError> {
    let mut guard = store.write().await;
    let mut ids: Vec<i32> = guard.computers.keys().copied().collect();
    ids.sort_unstable();

    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let model = guard.computers.get_mut(&id).expect("id collected above");
        if model.status == ComputerStatus::Online {
            refresh_telemetry(model);
        }
        out.push(model.clone());
    }
    Ok(out)
}

pub async fn get_computer(store: &Store, id: i32) -> Result<computer::Model, ComputerServiceError> {
    let mut guard = store.write().await;
    let model = guard
        .computers
        .get_mut(&id)
        .ok_or(ComputerServiceError::NotFound(id))?;
    if model.status == ComputerStatus::Online {
        refresh_telemetry(model);
    }
    Ok(model.clone())
}

pub async fn create_computer(
    store: &Store,
    name: String,
    os: String,
    ip_address: String,
    status: ComputerStatus,
) -> Result<computer::Model, ComputerServiceError> {
    if name.trim().is_empty() {
        return Err(ComputerServiceError::ValidationError(
            "Computer name must not be empty.".to_string(),
        ));
    }

    let mut guard = store.write().await;
    let now = Utc::now();
    let id = guard.alloc_id();
    let model = computer::Model {
        id,
        name,
        status,
        os,
        ip_address,
        last_seen: now,
        cpu_usage: None,
        ram_usage: None,
        disk_usage: None,
        group_ids: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    guard.computers.insert(id, model.clone());
    Ok(model)
}

pub async fn update_computer(
    store: &Store,
    id: i32,
    name: Option<String>,
    os: Option<String>,
    ip_address: Option<String>,
    status: Option<ComputerStatus>,
) -> Result<computer::Model, ComputerServiceError> {
    if let Some(ref n) = name {
        if n.trim().is_empty() {
            return Err(ComputerServiceError::ValidationError(
                "Computer name must not be empty.".to_string(),
            ));
        }
    }

    let mut guard = store.write().await;
    let model = guard
        .computers
        .get_mut(&id)
        .ok_or(ComputerServiceError::NotFound(id))?;

    if let Some(n) = name {
        model.name = n;
    }
    if let Some(o) = os {
        model.os = o;
    }
    if let Some(ip) = ip_address {
        model.ip_address = ip;
    }
    if let Some(s) = status {
        model.status = s;
    }
    model.updated_at = Utc::now();
    Ok(model.clone())
}

/// Deleting a computer also strips it from every group's member list and
/// deletes its executions, monitor logs, and the custom commands targeted
/// at it.
pub async fn delete_computer(store: &Store, id: i32) -> Result<(), ComputerServiceError> {
    let mut guard = store.write().await;
    let inner = &mut *guard;

    if inner.computers.remove(&id).is_none() {
        return Err(ComputerServiceError::NotFound(id));
    }

    let now = Utc::now();
    for group in inner.groups.values_mut() {
        if group.computer_ids.contains(&id) {
            group.computer_ids.retain(|cid| *cid != id);
            group.updated_at = now;
        }
    }

    let executions_before = inner.executions.len();
    inner.executions.retain(|_, e| e.computer_id != id);
    let logs_before = inner.monitor_logs.len();
    inner.monitor_logs.retain(|_, l| l.computer_id != id);
    let commands_before = inner.commands.len();
    inner.commands.retain(|_, c| c.computer_id != id);

    info!(
        computer_id = id,
        removed_executions = executions_before - inner.executions.len(),
        removed_monitor_logs = logs_before - inner.monitor_logs.len(),
        removed_commands = commands_before - inner.commands.len(),
        "Deleted computer and its dependent records."
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::procedure::ScriptType;
    use crate::db::store::{command_service, group_service, monitor_service, procedure_service};
    use crate::db::entities::procedure::ProcedureKind;

    async fn online_computer(store: &Store, name: &str) -> computer::Model {
        create_computer(
            store,
            name.to_string(),
            "Windows 11".to_string(),
            "10.0.0.1".to_string(),
            ComputerStatus::Online,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn online_computers_get_fresh_telemetry_on_read() {
        let store = Store::new();
        let online = online_computer(&store, "ws-01").await;
        let offline = create_computer(
            &store,
            "ws-02".to_string(),
            "Windows 10".to_string(),
            "10.0.0.2".to_string(),
            ComputerStatus::Offline,
        )
        .await
        .unwrap();

        // Creation never produces usage figures.
        assert!(online.cpu_usage.is_none());

        let listed = list_computers(&store).await.unwrap();
        let online_read = listed.iter().find(|c| c.id == online.id).unwrap();
        let offline_read = listed.iter().find(|c| c.id == offline.id).unwrap();

        let cpu = online_read.cpu_usage.expect("online computer reports cpu");
        assert!((0.0..=100.0).contains(&cpu));
        assert!(online_read.ram_usage.is_some());
        assert!(online_read.disk_usage.is_some());
        assert!(offline_read.cpu_usage.is_none());
    }

    #[tokio::test]
    async fn delete_cascades_to_groups_and_dependent_records() {
        let store = Store::new();
        let c1 = online_computer(&store, "ws-01").await;
        let c2 = online_computer(&store, "ws-02").await;

        let (group, _) = group_service::create_group(
            &store,
            "Workstations".to_string(),
            None,
            vec![c1.id, c2.id],
            Vec::new(),
            Vec::new(),
        )
        .await
        .unwrap();

        let procedure = procedure_service::create_procedure(
            &store,
            "Cleanup".to_string(),
            None,
            ProcedureKind::CustomScript {
                script_type: ScriptType::Cmd,
                script_content: "del /q %TEMP%\\*".to_string(),
                run_as_user: false,
            },
        )
        .await
        .unwrap();

        // One execution and one command for the computer under test.
        {
            let mut guard = store.write().await;
            let inner = &mut *guard;
            let computer = inner.computers.get(&c1.id).unwrap().clone();
            let proc_model = inner.procedures.get(&procedure.id).unwrap().clone();
            crate::db::store::execution_service::insert_execution(inner, &proc_model, &computer);
        }
        command_service::create_for_computer(
            &store,
            c1.id,
            ScriptType::Cmd,
            "ipconfig /all".to_string(),
        )
        .await
        .unwrap();

        let monitor = monitor_service::create_monitor(
            &store,
            "Disk space".to_string(),
            None,
            ScriptType::PowerShell,
            "Get-PSDrive C".to_string(),
            15,
            crate::db::entities::computer_group::MonitorIntervalUnit::Minutes,
            false,
        )
        .await
        .unwrap();
        monitor_service::insert_log(&store, monitor.id, c1.id, false, "ok".to_string())
            .await
            .unwrap();

        delete_computer(&store, c1.id).await.unwrap();

        let guard = store.read().await;
        assert!(!guard.computers.contains_key(&c1.id));
        let g = guard.groups.get(&group.id).unwrap();
        assert_eq!(g.computer_ids, vec![c2.id]);
        assert!(guard.executions.values().all(|e| e.computer_id != c1.id));
        assert!(guard.monitor_logs.values().all(|l| l.computer_id != c1.id));
        assert!(guard.commands.values().all(|c| c.computer_id != c1.id));
    }

    #[tokio::test]
    async fn delete_unknown_computer_is_not_found() {
        let store = Store::new();
        assert!(matches!(
            delete_computer(&store, 404).await,
            Err(ComputerServiceError::NotFound(404))
        ));
    }
}
