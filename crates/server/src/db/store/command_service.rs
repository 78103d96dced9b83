use chrono::Utc;
use uuid::Uuid;

use crate::db::entities::custom_command;
use crate::db::entities::procedure::ScriptType;
use crate::db::enums::{ComputerStatus, CustomCommandStatus};
use crate::db::store::Store;
use crate::web::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum CommandServiceError {
    #[error("Computer not found: {0}")]
    ComputerNotFound(i32),
    #[error("Group not found: {0}")]
    GroupNotFound(i32),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<CommandServiceError> for AppError {
    fn from(err: CommandServiceError) -> Self {
        match err {
            CommandServiceError::ComputerNotFound(id) => {
                AppError::NotFound(format!("Computer with ID {id} not found"))
            }
            CommandServiceError::GroupNotFound(id) => {
                AppError::NotFound(format!("Group with ID {id} not found"))
            }
            CommandServiceError::ValidationError(s) => AppError::InvalidInput(s),
        }
    }
}

fn new_command(
    computer_id: i32,
    computer_name: String,
    group_id: Option<i32>,
    script_type: ScriptType,
    content: String,
) -> custom_command::Model {
    custom_command::Model {
        id: Uuid::new_v4(),
        computer_id,
        computer_name,
        group_id,
        script_type,
        content,
        status: CustomCommandStatus::Pending,
        sent_at: Utc::now(),
        completed_at: None,
        output: None,
    }
}

pub async fn create_for_computer(
    store: &Store,
    computer_id: i32,
    script_type: ScriptType,
    content: String,
) -> Result<custom_command::Model, CommandServiceError> {
    if content.trim().is_empty() {
        return Err(CommandServiceError::ValidationError(
            "Command content must not be empty.".to_string(),
        ));
    }

    let mut guard = store.write().await;
    let computer = guard
        .computers
        .get(&computer_id)
        .ok_or(CommandServiceError::ComputerNotFound(computer_id))?;
    let model = new_command(computer_id, computer.name.clone(), None, script_type, content);
    guard.commands.insert(model.id, model.clone());
    Ok(model)
}

/// Fans the command out to every **Online** member of the group, one record
/// per computer. Offline and errored members are skipped entirely.
pub async fn create_for_group(
    store: &Store,
    group_id: i32,
    script_type: ScriptType,
    content: String,
) -> Result<Vec<custom_command::Model>, CommandServiceError> {
    if content.trim().is_empty() {
        return Err(CommandServiceError::ValidationError(
            "Command content must not be empty.".to_string(),
        ));
    }

    let mut guard = store.write().await;
    let inner = &mut *guard;
    let group = inner
        .groups
        .get(&group_id)
        .ok_or(CommandServiceError::GroupNotFound(group_id))?;

    let targets: Vec<(i32, String)> = group
        .computer_ids
        .iter()
        .filter_map(|cid| inner.computers.get(cid))
        .filter(|c| c.status == ComputerStatus::Online)
        .map(|c| (c.id, c.name.clone()))
        .collect();

    let mut created = Vec::with_capacity(targets.len());
    for (cid, cname) in targets {
        let model = new_command(cid, cname, Some(group_id), script_type, content.clone());
        inner.commands.insert(model.id, model.clone());
        created.push(model);
    }
    Ok(created)
}

/// Marks freshly dispatched Pending records as Sent. Records that already
/// moved on are left alone.
pub async fn mark_sent(store: &Store, ids: &[Uuid]) -> Vec<custom_command::Model> {
    let mut guard = store.write().await;
    let mut updated = Vec::new();
    for id in ids {
        if let Some(model) = guard.commands.get_mut(id) {
            if model.status == CustomCommandStatus::Pending {
                model.status = CustomCommandStatus::Sent;
                updated.push(model.clone());
            }
        }
    }
    updated
}

/// Settles non-terminal records opportunistically: called when history is
/// fetched, never from a timer. Sent records get an outcome from `decide`;
/// Pending records were never dispatched (offline target) and fail as
/// unreachable.
pub async fn settle_pending(
    store: &Store,
    mut decide: impl FnMut() -> CustomCommandStatus,
) -> Vec<custom_command::Model> {
    let mut guard = store.write().await;
    let mut settled = Vec::new();
    for model in guard.commands.values_mut() {
        if model.status.is_terminal() {
            continue;
        }
        let now = Utc::now();
        match model.status {
            CustomCommandStatus::Sent => {
                let outcome = decide();
                debug_assert!(outcome.is_terminal());
                model.status = outcome;
                model.output = Some(match outcome {
                    CustomCommandStatus::Success => "Command completed with exit code 0.".to_string(),
                    _ => "Command exited with a non-zero exit code.".to_string(),
                });
            }
            CustomCommandStatus::Pending => {
                model.status = CustomCommandStatus::Failed;
                model.output = Some("Agent unreachable; command was never delivered.".to_string());
            }
            _ => unreachable!("terminal statuses are filtered above"),
        }
        model.completed_at = Some(now);
        settled.push(model.clone());
    }
    settled
}

pub async fn list_commands(store: &Store) -> Vec<custom_command::Model> {
    let guard = store.read().await;
    let mut commands: Vec<custom_command::Model> = guard.commands.values().cloned().collect();
    commands.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{computer_service, group_service};

    async fn computer(store: &Store, name: &str, status: ComputerStatus) -> i32 {
        computer_service::create_computer(
            store,
            name.to_string(),
            "Windows 11".to_string(),
            "10.0.0.3".to_string(),
            status,
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn group_commands_fan_out_to_online_members_only() {
        let store = Store::new();
        let online_a = computer(&store, "on-a", ComputerStatus::Online).await;
        let online_b = computer(&store, "on-b", ComputerStatus::Online).await;
        let offline = computer(&store, "off", ComputerStatus::Offline).await;
        let errored = computer(&store, "err", ComputerStatus::Error).await;

        let (group, _) = group_service::create_group(
            &store,
            "Mixed".to_string(),
            None,
            vec![online_a, offline, online_b, errored],
            Vec::new(),
            Vec::new(),
        )
        .await
        .unwrap();

        let created = create_for_group(
            &store,
            group.id,
            ScriptType::PowerShell,
            "Get-Process".to_string(),
        )
        .await
        .unwrap();

        let mut targeted: Vec<i32> = created.iter().map(|c| c.computer_id).collect();
        targeted.sort_unstable();
        let mut expected = vec![online_a, online_b];
        expected.sort_unstable();
        assert_eq!(targeted, expected);
        assert!(created.iter().all(|c| c.status == CustomCommandStatus::Pending));
        assert!(created.iter().all(|c| c.group_id == Some(group.id)));
    }

    #[tokio::test]
    async fn settle_flips_sent_via_decide_and_fails_undelivered() {
        let store = Store::new();
        let online = computer(&store, "on", ComputerStatus::Online).await;
        let offline = computer(&store, "off", ComputerStatus::Offline).await;

        let delivered = create_for_computer(
            &store,
            online,
            ScriptType::Cmd,
            "hostname".to_string(),
        )
        .await
        .unwrap();
        let undelivered = create_for_computer(
            &store,
            offline,
            ScriptType::Cmd,
            "hostname".to_string(),
        )
        .await
        .unwrap();

        mark_sent(&store, &[delivered.id]).await;

        let settled = settle_pending(&store, || CustomCommandStatus::Success).await;
        assert_eq!(settled.len(), 2);

        let commands = list_commands(&store).await;
        let delivered = commands.iter().find(|c| c.id == delivered.id).unwrap();
        assert_eq!(delivered.status, CustomCommandStatus::Success);
        assert!(delivered.completed_at.is_some());

        let undelivered = commands.iter().find(|c| c.id == undelivered.id).unwrap();
        assert_eq!(undelivered.status, CustomCommandStatus::Failed);
        assert!(undelivered
            .output
            .as_deref()
            .unwrap()
            .contains("unreachable"));

        // A second fetch settles nothing further.
        let settled = settle_pending(&store, || CustomCommandStatus::Failed).await;
        assert!(settled.is_empty());
    }
}
