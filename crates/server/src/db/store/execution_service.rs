use chrono::Utc;
use uuid::Uuid;

use crate::db::entities::{computer, procedure, procedure_execution};
use crate::db::enums::ProcedureExecutionStatus;
use crate::db::store::{Store, StoreInner};
use crate::web::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ExecutionServiceError {
    #[error("Execution not found: {0}")]
    NotFound(Uuid),
}

impl From<ExecutionServiceError> for AppError {
    fn from(err: ExecutionServiceError) -> Self {
        match err {
            ExecutionServiceError::NotFound(id) => {
                AppError::NotFound(format!("Execution {id} not found"))
            }
        }
    }
}

/// Creates a Pending record under the caller's write guard. The computer
/// name is snapshotted here; later renames or deletions of other records do
/// not touch it.
pub fn insert_execution(
    inner: &mut StoreInner,
    procedure: &procedure::Model,
    computer: &computer::Model,
) -> procedure_execution::Model {
    let now = Utc::now();
    let model = procedure_execution::Model {
        id: Uuid::new_v4(),
        procedure_id: procedure.id,
        computer_id: computer.id,
        computer_name: computer.name.clone(),
        status: ProcedureExecutionStatus::Pending,
        start_time: now,
        end_time: None,
        logs: format!(
            "[{}] Queued procedure '{}' on {}\n",
            now.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            procedure.name,
            computer.name
        ),
        output: String::new(),
        run_as_user: procedure.run_as_user,
    };
    inner.executions.insert(model.id, model.clone());
    model
}

pub async fn list_executions(
    store: &Store,
    procedure_id: Option<i32>,
    computer_id: Option<i32>,
) -> Result<Vec<procedure_execution::Model>, ExecutionServiceError> {
    let guard = store.read().await;
    let mut executions: Vec<procedure_execution::Model> = guard
        .executions
        .values()
        .filter(|e| procedure_id.is_none_or(|pid| e.procedure_id == pid))
        .filter(|e| computer_id.is_none_or(|cid| e.computer_id == cid))
        .cloned()
        .collect();
    executions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    Ok(executions)
}

pub async fn get_execution(
    store: &Store,
    id: Uuid,
) -> Result<procedure_execution::Model, ExecutionServiceError> {
    let guard = store.read().await;
    guard
        .executions
        .get(&id)
        .cloned()
        .ok_or(ExecutionServiceError::NotFound(id))
}

/// Flips a Pending execution to its terminal status, appending the outcome
/// to the log. Returns `None` when the record is already terminal or gone,
/// so a resolve task that lost a race (or outlived a cascade delete) is a
/// no-op: the Pending→terminal transition happens at most once.
pub async fn complete_execution(
    store: &Store,
    id: Uuid,
    status: ProcedureExecutionStatus,
    output: String,
) -> Option<procedure_execution::Model> {
    let mut guard = store.write().await;
    let model = guard.executions.get_mut(&id)?;
    if model.status != ProcedureExecutionStatus::Pending {
        return None;
    }

    let now = Utc::now();
    model.status = status;
    model.end_time = Some(now);
    model.logs.push_str(&format!(
        "[{}] {}\n",
        now.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
        output
    ));
    model.output = output;
    Some(model.clone())
}
