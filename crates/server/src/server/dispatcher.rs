use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::db::entities::computer_group;
use crate::db::entities::custom_command;
use crate::db::entities::procedure::ScriptType;
use crate::db::entities::procedure_execution;
use crate::db::enums::{ComputerStatus, ProcedureExecutionStatus};
use crate::db::store::{command_service, execution_service, Store};
use crate::server::result_broadcaster::ResultBroadcaster;
use crate::server::runner::ExecutionRunner;
use crate::web::error::AppError;

const SUCCESS_OUTPUT: &str = "Script completed successfully with exit code 0.";
const FAILED_OUTPUT: &str = "Script exited with a non-zero exit code.";

#[derive(Debug, thiserror::Error)]
pub enum DispatcherError {
    #[error("Procedure not found: {0}")]
    ProcedureNotFound(i32),
    #[error("Computer not found: {0}")]
    ComputerNotFound(i32),
    #[error("Group not found: {0}")]
    GroupNotFound(i32),
    #[error("Command error: {0}")]
    Command(#[from] command_service::CommandServiceError),
}

impl From<DispatcherError> for AppError {
    fn from(err: DispatcherError) -> Self {
        match err {
            DispatcherError::ProcedureNotFound(id) => {
                AppError::NotFound(format!("Procedure with ID {id} not found"))
            }
            DispatcherError::ComputerNotFound(id) => {
                AppError::NotFound(format!("Computer with ID {id} not found"))
            }
            DispatcherError::GroupNotFound(id) => {
                AppError::NotFound(format!("Group with ID {id} not found"))
            }
            DispatcherError::Command(e) => e.into(),
        }
    }
}

/// Creates execution and command records and drives them to their terminal
/// state through the configured [`ExecutionRunner`]. The only component
/// that resolves outcomes.
#[derive(Clone)]
pub struct ExecutionDispatcher {
    store: Store,
    runner: Arc<dyn ExecutionRunner>,
    result_broadcaster: Arc<ResultBroadcaster>,
}

impl ExecutionDispatcher {
    pub fn new(
        store: Store,
        runner: Arc<dyn ExecutionRunner>,
        result_broadcaster: Arc<ResultBroadcaster>,
    ) -> Self {
        Self {
            store,
            runner,
            result_broadcaster,
        }
    }

    /// Creates a Pending execution and spawns its resolve task. The record
    /// flips to Success or Failed exactly once after the runner's delay; it
    /// never rests at Pending.
    pub async fn run_procedure(
        &self,
        procedure_id: i32,
        computer_id: i32,
    ) -> Result<procedure_execution::Model, DispatcherError> {
        let execution = {
            let mut guard = self.store.write().await;
            let inner = &mut *guard;
            let procedure = inner
                .procedures
                .get(&procedure_id)
                .ok_or(DispatcherError::ProcedureNotFound(procedure_id))?
                .clone();
            let computer = inner
                .computers
                .get(&computer_id)
                .ok_or(DispatcherError::ComputerNotFound(computer_id))?
                .clone();
            execution_service::insert_execution(inner, &procedure, &computer)
        };

        info!(
            execution_id = %execution.id,
            procedure_id,
            computer_id,
            "Created execution, scheduling resolution."
        );
        self.result_broadcaster.broadcast_execution_update(
            execution.id,
            procedure_id,
            computer_id,
            execution.status,
        );
        self.spawn_resolve(execution.id, procedure_id, computer_id);
        Ok(execution)
    }

    fn spawn_resolve(&self, execution_id: Uuid, procedure_id: i32, computer_id: i32) {
        let resolved = self.runner.resolve_execution();
        let store = self.store.clone();
        let broadcaster = self.result_broadcaster.clone();
        tokio::spawn(async move {
            tokio::time::sleep(resolved.delay).await;
            let output = match resolved.status {
                ProcedureExecutionStatus::Success => SUCCESS_OUTPUT,
                _ => FAILED_OUTPUT,
            };
            if let Some(updated) =
                execution_service::complete_execution(&store, execution_id, resolved.status, output.to_string())
                    .await
            {
                broadcaster.broadcast_execution_update(
                    updated.id,
                    procedure_id,
                    computer_id,
                    updated.status,
                );
            }
        });
    }

    /// Runs a procedure on every Online member of a group.
    pub async fn run_procedure_on_group(
        &self,
        procedure_id: i32,
        group_id: i32,
    ) -> Result<Vec<procedure_execution::Model>, DispatcherError> {
        let targets: Vec<i32> = {
            let guard = self.store.read().await;
            if !guard.procedures.contains_key(&procedure_id) {
                return Err(DispatcherError::ProcedureNotFound(procedure_id));
            }
            let group = guard
                .groups
                .get(&group_id)
                .ok_or(DispatcherError::GroupNotFound(group_id))?;
            group
                .computer_ids
                .iter()
                .filter_map(|cid| guard.computers.get(cid))
                .filter(|c| c.status == ComputerStatus::Online)
                .map(|c| c.id)
                .collect()
        };

        let mut executions = Vec::with_capacity(targets.len());
        for computer_id in targets {
            executions.push(self.run_procedure(procedure_id, computer_id).await?);
        }
        Ok(executions)
    }

    /// Fires every run-on-new-member procedure of the group for the members
    /// that just joined. Only Online computers are targeted; an Offline
    /// joiner produces nothing.
    pub async fn run_new_member_procedures(
        &self,
        group: &computer_group::Model,
        new_member_ids: &[i32],
    ) -> Result<Vec<procedure_execution::Model>, DispatcherError> {
        let flagged: Vec<i32> = group
            .associated_procedures
            .iter()
            .filter(|cfg| cfg.run_on_new_member)
            .map(|cfg| cfg.procedure_id)
            .collect();
        if flagged.is_empty() || new_member_ids.is_empty() {
            return Ok(Vec::new());
        }

        let online_members: Vec<i32> = {
            let guard = self.store.read().await;
            new_member_ids
                .iter()
                .filter_map(|cid| guard.computers.get(cid))
                .filter(|c| c.status == ComputerStatus::Online)
                .map(|c| c.id)
                .collect()
        };

        let mut executions = Vec::new();
        for computer_id in online_members {
            for procedure_id in &flagged {
                executions.push(self.run_procedure(*procedure_id, computer_id).await?);
            }
        }
        Ok(executions)
    }

    /// Sends an ad-hoc command to one computer. The record is marked Sent
    /// when the target is Online; an Offline target keeps it Pending until
    /// settlement fails it as unreachable.
    pub async fn send_command_to_computer(
        &self,
        computer_id: i32,
        script_type: ScriptType,
        content: String,
    ) -> Result<custom_command::Model, DispatcherError> {
        let created =
            command_service::create_for_computer(&self.store, computer_id, script_type, content)
                .await?;
        Ok(self.dispatch_created(vec![created]).await.remove(0))
    }

    /// Fans a command out to every Online member of a group.
    pub async fn send_command_to_group(
        &self,
        group_id: i32,
        script_type: ScriptType,
        content: String,
    ) -> Result<Vec<custom_command::Model>, DispatcherError> {
        let created =
            command_service::create_for_group(&self.store, group_id, script_type, content).await?;
        Ok(self.dispatch_created(created).await)
    }

    async fn dispatch_created(
        &self,
        created: Vec<custom_command::Model>,
    ) -> Vec<custom_command::Model> {
        let deliverable: Vec<Uuid> = {
            let guard = self.store.read().await;
            created
                .iter()
                .filter(|cmd| {
                    guard
                        .computers
                        .get(&cmd.computer_id)
                        .map(|c| c.status == ComputerStatus::Online)
                        .unwrap_or(false)
                })
                .map(|cmd| cmd.id)
                .collect()
        };

        let sent = command_service::mark_sent(&self.store, &deliverable).await;
        for cmd in &sent {
            self.result_broadcaster
                .broadcast_command_update(cmd.id, cmd.computer_id, cmd.status);
        }

        // Return the records in creation order with the Sent transitions
        // folded in.
        let sent_ids: std::collections::HashMap<Uuid, custom_command::Model> =
            sent.into_iter().map(|c| (c.id, c)).collect();
        created
            .into_iter()
            .map(|c| sent_ids.get(&c.id).cloned().unwrap_or(c))
            .collect()
    }

    /// Command history with opportunistic settlement: every non-terminal
    /// record is driven to its terminal state before the list is returned.
    pub async fn command_history(&self) -> Vec<custom_command::Model> {
        let runner = self.runner.clone();
        let settled =
            command_service::settle_pending(&self.store, move || runner.settle_command()).await;
        for cmd in &settled {
            self.result_broadcaster
                .broadcast_command_update(cmd.id, cmd.computer_id, cmd.status);
        }
        command_service::list_commands(&self.store).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::computer_group::{AssociatedProcedureConfig, ScheduleConfig};
    use crate::db::entities::procedure::ProcedureKind;
    use crate::db::enums::CustomCommandStatus;
    use crate::db::store::{computer_service, group_service, procedure_service};
    use crate::server::runner::FixedRunner;
    use std::time::Duration;
    use tokio::sync::broadcast;

    fn dispatcher(store: &Store, runner: FixedRunner) -> ExecutionDispatcher {
        let (tx, _rx) = broadcast::channel(16);
        ExecutionDispatcher::new(
            store.clone(),
            Arc::new(runner),
            Arc::new(ResultBroadcaster::new(tx)),
        )
    }

    async fn computer(store: &Store, name: &str, status: ComputerStatus) -> i32 {
        computer_service::create_computer(
            store,
            name.to_string(),
            "Windows 11".to_string(),
            "10.0.0.7".to_string(),
            status,
        )
        .await
        .unwrap()
        .id
    }

    async fn custom_procedure(store: &Store, name: &str) -> i32 {
        procedure_service::create_procedure(
            store,
            name.to_string(),
            None,
            ProcedureKind::CustomScript {
                script_type: ScriptType::Cmd,
                script_content: "echo run".to_string(),
                run_as_user: false,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn execution_flips_exactly_once_to_a_terminal_state() {
        let store = Store::new();
        let d = dispatcher(&store, FixedRunner::succeeding());
        let cid = computer(&store, "ws", ComputerStatus::Online).await;
        let pid = custom_procedure(&store, "Echo").await;

        let execution = d.run_procedure(pid, cid).await.unwrap();
        assert_eq!(execution.status, ProcedureExecutionStatus::Pending);
        assert!(execution.end_time.is_none());

        tokio::time::sleep(Duration::from_millis(100)).await;

        let resolved = execution_service::get_execution(&store, execution.id)
            .await
            .unwrap();
        assert_eq!(resolved.status, ProcedureExecutionStatus::Success);
        assert!(resolved.end_time.is_some());
        assert!(resolved.output.contains("exit code 0"));
        assert!(resolved.logs.contains(&resolved.output));

        // A second completion attempt is a no-op: the flip happened.
        let again = execution_service::complete_execution(
            &store,
            execution.id,
            ProcedureExecutionStatus::Failed,
            "late".to_string(),
        )
        .await;
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn failing_runner_produces_failed_execution() {
        let store = Store::new();
        let d = dispatcher(&store, FixedRunner::failing());
        let cid = computer(&store, "ws", ComputerStatus::Online).await;
        let pid = custom_procedure(&store, "Echo").await;

        let execution = d.run_procedure(pid, cid).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let resolved = execution_service::get_execution(&store, execution.id)
            .await
            .unwrap();
        assert_eq!(resolved.status, ProcedureExecutionStatus::Failed);
        assert!(resolved.output.contains("non-zero"));
    }

    #[tokio::test]
    async fn new_online_member_triggers_one_execution_per_flagged_procedure() {
        let store = Store::new();
        let d = dispatcher(&store, FixedRunner::succeeding());
        let online = computer(&store, "on", ComputerStatus::Online).await;
        let flagged = custom_procedure(&store, "Onboard").await;
        let unflagged = custom_procedure(&store, "Cleanup").await;

        let (group, added) = group_service::create_group(
            &store,
            "Onboarding".to_string(),
            None,
            vec![online],
            vec![
                AssociatedProcedureConfig {
                    procedure_id: flagged,
                    run_on_new_member: true,
                    schedule: ScheduleConfig::Disabled,
                },
                AssociatedProcedureConfig {
                    procedure_id: unflagged,
                    run_on_new_member: false,
                    schedule: ScheduleConfig::Disabled,
                },
            ],
            Vec::new(),
        )
        .await
        .unwrap();

        let executions = d.run_new_member_procedures(&group, &added).await.unwrap();
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].procedure_id, flagged);
        assert_eq!(executions[0].computer_id, online);
        assert_eq!(executions[0].status, ProcedureExecutionStatus::Pending);
    }

    #[tokio::test]
    async fn new_offline_member_triggers_nothing() {
        let store = Store::new();
        let d = dispatcher(&store, FixedRunner::succeeding());
        let offline = computer(&store, "off", ComputerStatus::Offline).await;
        let flagged = custom_procedure(&store, "Onboard").await;

        let (group, added) = group_service::create_group(
            &store,
            "Onboarding".to_string(),
            None,
            vec![offline],
            vec![AssociatedProcedureConfig {
                procedure_id: flagged,
                run_on_new_member: true,
                schedule: ScheduleConfig::Disabled,
            }],
            Vec::new(),
        )
        .await
        .unwrap();

        let executions = d.run_new_member_procedures(&group, &added).await.unwrap();
        assert!(executions.is_empty());
        let all = execution_service::list_executions(&store, None, None)
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn group_run_targets_online_members_only() {
        let store = Store::new();
        let d = dispatcher(&store, FixedRunner::succeeding());
        let online = computer(&store, "on", ComputerStatus::Online).await;
        let offline = computer(&store, "off", ComputerStatus::Offline).await;
        let pid = custom_procedure(&store, "Echo").await;

        let (group, _) = group_service::create_group(
            &store,
            "Mixed".to_string(),
            None,
            vec![online, offline],
            Vec::new(),
            Vec::new(),
        )
        .await
        .unwrap();

        let executions = d.run_procedure_on_group(pid, group.id).await.unwrap();
        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].computer_id, online);
    }

    #[tokio::test]
    async fn commands_are_marked_sent_and_settle_on_fetch() {
        let store = Store::new();
        let d = dispatcher(&store, FixedRunner::succeeding());
        let online = computer(&store, "on", ComputerStatus::Online).await;
        let offline = computer(&store, "off", ComputerStatus::Offline).await;

        let sent = d
            .send_command_to_computer(online, ScriptType::Cmd, "hostname".to_string())
            .await
            .unwrap();
        assert_eq!(sent.status, CustomCommandStatus::Sent);

        let stuck = d
            .send_command_to_computer(offline, ScriptType::Cmd, "hostname".to_string())
            .await
            .unwrap();
        assert_eq!(stuck.status, CustomCommandStatus::Pending);

        let history = d.command_history().await;
        let sent = history.iter().find(|c| c.id == sent.id).unwrap();
        assert_eq!(sent.status, CustomCommandStatus::Success);
        let stuck = history.iter().find(|c| c.id == stuck.id).unwrap();
        assert_eq!(stuck.status, CustomCommandStatus::Failed);
    }
}
