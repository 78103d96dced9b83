use chrono::Utc;

use crate::db::entities::procedure::{
    self, ProcedureKind, ScriptType, SoftwareUpdateMode,
};
use crate::db::store::Store;
use crate::web::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ProcedureServiceError {
    #[error("Procedure not found: {0}")]
    NotFound(i32),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ProcedureServiceError> for AppError {
    fn from(err: ProcedureServiceError) -> Self {
        match err {
            ProcedureServiceError::NotFound(id) => {
                AppError::NotFound(format!("Procedure with ID {id} not found"))
            }
            ProcedureServiceError::ValidationError(s) => AppError::InvalidInput(s),
        }
    }
}

/// Folds payload defaults into a canonical shape before compilation:
/// a SoftwareUpdate covering everything carries no package list.
fn normalize_kind(kind: ProcedureKind) -> ProcedureKind {
    match kind {
        ProcedureKind::SoftwareUpdate {
            mode: SoftwareUpdateMode::All,
            ..
        } => ProcedureKind::SoftwareUpdate {
            mode: SoftwareUpdateMode::All,
            specific_software: String::new(),
        },
        other => other,
    }
}

/// Stand-in for the agent-side script compiler: derives the executable
/// script (type, body, run-as) from the procedure payload. System-managed
/// payloads always compile to PowerShell running as the system account.
pub(crate) fn compile_script(kind: &ProcedureKind) -> (ScriptType, String, bool) {
    match kind {
        ProcedureKind::CustomScript {
            script_type,
            script_content,
            run_as_user,
        } => (*script_type, script_content.clone(), *run_as_user),
        ProcedureKind::WindowsUpdate { scope } => {
            let mut categories = Vec::new();
            if scope.security_updates {
                categories.push("'Security Updates'");
            }
            if scope.feature_updates {
                categories.push("'Feature Packs'");
            }
            if scope.driver_updates {
                categories.push("'Drivers'");
            }
            let category_arg = if categories.is_empty() {
                String::new()
            } else {
                format!(" -Category {}", categories.join(","))
            };
            let body = format!(
                "Import-Module PSWindowsUpdate\nGet-WindowsUpdate -AcceptAll -Install{category_arg} -IgnoreReboot\n"
            );
            (ScriptType::PowerShell, body, false)
        }
        ProcedureKind::SoftwareUpdate {
            mode,
            specific_software,
        } => {
            let body = match mode {
                SoftwareUpdateMode::All => {
                    "winget upgrade --all --silent --accept-package-agreements\n".to_string()
                }
                SoftwareUpdateMode::Specific => {
                    let packages: Vec<String> = specific_software
                        .split(',')
                        .map(|p| p.trim())
                        .filter(|p| !p.is_empty())
                        .map(|p| format!("\"{p}\""))
                        .collect();
                    format!(
                        "$packages = @({})\nforeach ($p in $packages) {{\n    winget upgrade --id $p --silent --accept-package-agreements\n}}\n",
                        packages.join(",")
                    )
                }
            };
            (ScriptType::PowerShell, body, false)
        }
    }
}

pub async fn list_procedures(store: &Store) -> Result<Vec<procedure::Model>, ProcedureServiceError> {
    let guard = store.read().await;
    let mut procedures: Vec<procedure::Model> = guard.procedures.values().cloned().collect();
    procedures.sort_by_key(|p| p.id);
    Ok(procedures)
}

pub async fn get_procedure(
    store: &Store,
    id: i32,
) -> Result<procedure::Model, ProcedureServiceError> {
    let guard = store.read().await;
    guard
        .procedures
        .get(&id)
        .cloned()
        .ok_or(ProcedureServiceError::NotFound(id))
}

pub async fn create_procedure(
    store: &Store,
    name: String,
    description: Option<String>,
    kind: ProcedureKind,
) -> Result<procedure::Model, ProcedureServiceError> {
    if name.trim().is_empty() {
        return Err(ProcedureServiceError::ValidationError(
            "Procedure name must not be empty.".to_string(),
        ));
    }

    let kind = normalize_kind(kind);
    let (script_type, script_content, run_as_user) = compile_script(&kind);

    let mut guard = store.write().await;
    let now = Utc::now();
    let id = guard.alloc_id();
    let model = procedure::Model {
        id,
        name,
        description,
        kind,
        script_type,
        script_content,
        run_as_user,
        created_at: now,
        updated_at: now,
    };
    guard.procedures.insert(id, model.clone());
    Ok(model)
}

/// Replaces the payload wholesale and recompiles the script; the previous
/// kind leaves nothing behind.
pub async fn update_procedure(
    store: &Store,
    id: i32,
    name: String,
    description: Option<String>,
    kind: ProcedureKind,
) -> Result<procedure::Model, ProcedureServiceError> {
    if name.trim().is_empty() {
        return Err(ProcedureServiceError::ValidationError(
            "Procedure name must not be empty.".to_string(),
        ));
    }

    let kind = normalize_kind(kind);
    let (script_type, script_content, run_as_user) = compile_script(&kind);

    let mut guard = store.write().await;
    let model = guard
        .procedures
        .get_mut(&id)
        .ok_or(ProcedureServiceError::NotFound(id))?;
    model.name = name;
    model.description = description;
    model.kind = kind;
    model.script_type = script_type;
    model.script_content = script_content;
    model.run_as_user = run_as_user;
    model.updated_at = Utc::now();
    Ok(model.clone())
}

/// Removes the procedure and every group association referencing it.
/// Historical executions keep their denormalised snapshot and stay.
pub async fn delete_procedure(store: &Store, id: i32) -> Result<(), ProcedureServiceError> {
    let mut guard = store.write().await;
    let inner = &mut *guard;

    if inner.procedures.remove(&id).is_none() {
        return Err(ProcedureServiceError::NotFound(id));
    }

    let now = Utc::now();
    for group in inner.groups.values_mut() {
        let before = group.associated_procedures.len();
        group
            .associated_procedures
            .retain(|cfg| cfg.procedure_id != id);
        if group.associated_procedures.len() != before {
            group.updated_at = now;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::procedure::WindowsUpdateScope;

    #[tokio::test]
    async fn windows_update_always_compiles_to_system_powershell() {
        let store = Store::new();
        let model = create_procedure(
            &store,
            "Patch Tuesday".to_string(),
            Some("Monthly OS patching".to_string()),
            ProcedureKind::WindowsUpdate {
                scope: WindowsUpdateScope {
                    security_updates: true,
                    feature_updates: false,
                    driver_updates: true,
                },
            },
        )
        .await
        .unwrap();

        assert_eq!(model.script_type, ScriptType::PowerShell);
        assert!(!model.run_as_user);
        assert!(model.script_content.contains("Get-WindowsUpdate"));
        assert!(model.script_content.contains("'Security Updates'"));
        assert!(model.script_content.contains("'Drivers'"));
        assert!(!model.script_content.contains("'Feature Packs'"));
    }

    #[tokio::test]
    async fn software_update_all_clears_specific_list() {
        let store = Store::new();
        let model = create_procedure(
            &store,
            "Update everything".to_string(),
            None,
            ProcedureKind::SoftwareUpdate {
                mode: SoftwareUpdateMode::All,
                specific_software: "7zip, firefox".to_string(),
            },
        )
        .await
        .unwrap();

        match &model.kind {
            ProcedureKind::SoftwareUpdate {
                mode,
                specific_software,
            } => {
                assert_eq!(*mode, SoftwareUpdateMode::All);
                assert_eq!(specific_software, "");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
        assert!(model.script_content.contains("winget upgrade --all"));
    }

    #[tokio::test]
    async fn specific_software_update_compiles_package_loop() {
        let store = Store::new();
        let model = create_procedure(
            &store,
            "Update browsers".to_string(),
            None,
            ProcedureKind::SoftwareUpdate {
                mode: SoftwareUpdateMode::Specific,
                specific_software: "Mozilla.Firefox, Google.Chrome".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(model.script_content.contains("\"Mozilla.Firefox\""));
        assert!(model.script_content.contains("\"Google.Chrome\""));
    }

    #[tokio::test]
    async fn changing_kind_leaves_no_stale_payload() {
        let store = Store::new();
        let created = create_procedure(
            &store,
            "Maintenance".to_string(),
            None,
            ProcedureKind::CustomScript {
                script_type: ScriptType::Python,
                script_content: "print('hello')".to_string(),
                run_as_user: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(created.script_type, ScriptType::Python);
        assert!(created.run_as_user);

        let updated = update_procedure(
            &store,
            created.id,
            "Maintenance".to_string(),
            None,
            ProcedureKind::WindowsUpdate {
                scope: WindowsUpdateScope {
                    security_updates: true,
                    feature_updates: true,
                    driver_updates: false,
                },
            },
        )
        .await
        .unwrap();

        assert!(matches!(updated.kind, ProcedureKind::WindowsUpdate { .. }));
        assert_eq!(updated.script_type, ScriptType::PowerShell);
        assert!(!updated.run_as_user);
        assert!(!updated.script_content.contains("print"));
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn delete_strips_group_associations() {
        use crate::db::entities::computer_group::ScheduleConfig;
        use crate::db::store::group_service;

        let store = Store::new();
        let procedure = create_procedure(
            &store,
            "Reboot".to_string(),
            None,
            ProcedureKind::CustomScript {
                script_type: ScriptType::Cmd,
                script_content: "shutdown /r /t 0".to_string(),
                run_as_user: false,
            },
        )
        .await
        .unwrap();

        let (group, _) = group_service::create_group(
            &store,
            "Lab".to_string(),
            None,
            Vec::new(),
            vec![crate::db::entities::computer_group::AssociatedProcedureConfig {
                procedure_id: procedure.id,
                run_on_new_member: false,
                schedule: ScheduleConfig::Disabled,
            }],
            Vec::new(),
        )
        .await
        .unwrap();

        delete_procedure(&store, procedure.id).await.unwrap();

        let guard = store.read().await;
        assert!(guard
            .groups
            .get(&group.id)
            .unwrap()
            .associated_procedures
            .is_empty());
    }
}
