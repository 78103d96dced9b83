use std::collections::HashSet;

use chrono::Utc;

use crate::db::entities::computer_group::{
    self, AssociatedMonitorConfig, AssociatedProcedureConfig,
};
use crate::db::store::{Store, StoreInner};
use crate::web::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum GroupServiceError {
    #[error("Group not found: {0}")]
    NotFound(i32),
    #[error("Unknown computer ID in member list: {0}")]
    UnknownComputer(i32),
    #[error("Unknown procedure ID in association list: {0}")]
    UnknownProcedure(i32),
    #[error("Unknown monitor ID in association list: {0}")]
    UnknownMonitor(i32),
    #[error("Procedure {0} is associated more than once")]
    DuplicateProcedureConfig(i32),
    #[error("Monitor {0} is associated more than once")]
    DuplicateMonitorConfig(i32),
    #[error("Invalid schedule for procedure {procedure_id}: {reason}")]
    InvalidSchedule { procedure_id: i32, reason: String },
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<GroupServiceError> for AppError {
    fn from(err: GroupServiceError) -> Self {
        match err {
            GroupServiceError::NotFound(id) => {
                AppError::NotFound(format!("Group with ID {id} not found"))
            }
            GroupServiceError::DuplicateProcedureConfig(_)
            | GroupServiceError::DuplicateMonitorConfig(_) => AppError::Conflict(err.to_string()),
            GroupServiceError::UnknownComputer(_)
            | GroupServiceError::UnknownProcedure(_)
            | GroupServiceError::UnknownMonitor(_)
            | GroupServiceError::InvalidSchedule { .. }
            | GroupServiceError::ValidationError(_) => AppError::InvalidInput(err.to_string()),
        }
    }
}

fn validate_payload(
    inner: &StoreInner,
    name: &str,
    computer_ids: &[i32],
    associated_procedures: &[AssociatedProcedureConfig],
    associated_monitors: &[AssociatedMonitorConfig],
) -> Result<(), GroupServiceError> {
    if name.trim().is_empty() {
        return Err(GroupServiceError::ValidationError(
            "Group name must not be empty.".to_string(),
        ));
    }

    for cid in computer_ids {
        if !inner.computers.contains_key(cid) {
            return Err(GroupServiceError::UnknownComputer(*cid));
        }
    }

    let mut seen_procedures = HashSet::new();
    for cfg in associated_procedures {
        if !inner.procedures.contains_key(&cfg.procedure_id) {
            return Err(GroupServiceError::UnknownProcedure(cfg.procedure_id));
        }
        // At most one config per procedure per group.
        if !seen_procedures.insert(cfg.procedure_id) {
            return Err(GroupServiceError::DuplicateProcedureConfig(cfg.procedure_id));
        }
        cfg.schedule
            .validate()
            .map_err(|reason| GroupServiceError::InvalidSchedule {
                procedure_id: cfg.procedure_id,
                reason,
            })?;
    }

    let mut seen_monitors = HashSet::new();
    for cfg in associated_monitors {
        if !inner.monitors.contains_key(&cfg.monitor_id) {
            return Err(GroupServiceError::UnknownMonitor(cfg.monitor_id));
        }
        if !seen_monitors.insert(cfg.monitor_id) {
            return Err(GroupServiceError::DuplicateMonitorConfig(cfg.monitor_id));
        }
        if cfg.interval_value < 1 {
            return Err(GroupServiceError::ValidationError(format!(
                "Monitor {} interval must be at least 1",
                cfg.monitor_id
            )));
        }
    }

    Ok(())
}

/// The single synchronization point for the member relation. Writes the
/// deduplicated, order-preserving member list into the group and mirrors
/// the change into each computer's `group_ids` back-reference. Returns the
/// ids that are new to the group, in list order.
fn apply_membership(inner: &mut StoreInner, group_id: i32, requested: &[i32]) -> Vec<i32> {
    let mut deduped = Vec::with_capacity(requested.len());
    let mut seen = HashSet::new();
    for cid in requested {
        if seen.insert(*cid) {
            deduped.push(*cid);
        }
    }

    let group = inner
        .groups
        .get_mut(&group_id)
        .expect("caller verified the group exists");
    let previous: HashSet<i32> = group.computer_ids.iter().copied().collect();
    let current: HashSet<i32> = deduped.iter().copied().collect();

    let added: Vec<i32> = deduped
        .iter()
        .copied()
        .filter(|cid| !previous.contains(cid))
        .collect();
    let removed: Vec<i32> = previous
        .iter()
        .copied()
        .filter(|cid| !current.contains(cid))
        .collect();

    group.computer_ids = deduped;

    for cid in &added {
        if let Some(computer) = inner.computers.get_mut(cid) {
            if !computer.group_ids.contains(&group_id) {
                computer.group_ids.push(group_id);
            }
        }
    }
    for cid in &removed {
        if let Some(computer) = inner.computers.get_mut(cid) {
            computer.group_ids.retain(|gid| *gid != group_id);
        }
    }

    added
}

pub async fn list_groups(store: &Store) -> Result<Vec<computer_group::Model>, GroupServiceError> {
    let guard = store.read().await;
    let mut groups: Vec<computer_group::Model> = guard.groups.values().cloned().collect();
    groups.sort_by_key(|g| g.id);
    Ok(groups)
}

pub async fn get_group(store: &Store, id: i32) -> Result<computer_group::Model, GroupServiceError> {
    let guard = store.read().await;
    guard
        .groups
        .get(&id)
        .cloned()
        .ok_or(GroupServiceError::NotFound(id))
}

/// Returns the created group together with the member ids that joined it,
/// so the caller can fire run-on-new-member procedures.
pub async fn create_group(
    store: &Store,
    name: String,
    description: Option<String>,
    computer_ids: Vec<i32>,
    associated_procedures: Vec<AssociatedProcedureConfig>,
    associated_monitors: Vec<AssociatedMonitorConfig>,
) -> Result<(computer_group::Model, Vec<i32>), GroupServiceError> {
    let mut guard = store.write().await;
    let inner = &mut *guard;

    validate_payload(
        inner,
        &name,
        &computer_ids,
        &associated_procedures,
        &associated_monitors,
    )?;

    let now = Utc::now();
    let id = inner.alloc_id();
    inner.groups.insert(
        id,
        computer_group::Model {
            id,
            name,
            description,
            computer_ids: Vec::new(),
            associated_procedures,
            associated_monitors,
            created_at: now,
            updated_at: now,
        },
    );
    let added = apply_membership(inner, id, &computer_ids);

    let group = inner.groups.get(&id).cloned().expect("inserted above");
    Ok((group, added))
}

/// Full update: name, description, membership (including reorder) and both
/// association lists. Returns the updated group and the newly added member
/// ids.
pub async fn update_group(
    store: &Store,
    id: i32,
    name: String,
    description: Option<String>,
    computer_ids: Vec<i32>,
    associated_procedures: Vec<AssociatedProcedureConfig>,
    associated_monitors: Vec<AssociatedMonitorConfig>,
) -> Result<(computer_group::Model, Vec<i32>), GroupServiceError> {
    let mut guard = store.write().await;
    let inner = &mut *guard;

    if !inner.groups.contains_key(&id) {
        return Err(GroupServiceError::NotFound(id));
    }
    validate_payload(
        inner,
        &name,
        &computer_ids,
        &associated_procedures,
        &associated_monitors,
    )?;

    let added = apply_membership(inner, id, &computer_ids);

    let group = inner.groups.get_mut(&id).expect("checked above");
    group.name = name;
    group.description = description;
    group.associated_procedures = associated_procedures;
    group.associated_monitors = associated_monitors;
    group.updated_at = Utc::now();

    Ok((group.clone(), added))
}

pub async fn delete_group(store: &Store, id: i32) -> Result<(), GroupServiceError> {
    let mut guard = store.write().await;
    let inner = &mut *guard;

    let group = inner
        .groups
        .remove(&id)
        .ok_or(GroupServiceError::NotFound(id))?;

    for cid in &group.computer_ids {
        if let Some(computer) = inner.computers.get_mut(cid) {
            computer.group_ids.retain(|gid| *gid != id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::computer_group::ScheduleConfig;
    use crate::db::enums::ComputerStatus;
    use crate::db::store::{computer_service, procedure_service};
    use crate::db::entities::procedure::{ProcedureKind, ScriptType};

    async fn computer(store: &Store, name: &str, status: ComputerStatus) -> i32 {
        computer_service::create_computer(
            store,
            name.to_string(),
            "Windows 11".to_string(),
            "10.0.0.9".to_string(),
            status,
        )
        .await
        .unwrap()
        .id
    }

    async fn procedure(store: &Store, name: &str) -> i32 {
        procedure_service::create_procedure(
            store,
            name.to_string(),
            None,
            ProcedureKind::CustomScript {
                script_type: ScriptType::Cmd,
                script_content: "echo hi".to_string(),
                run_as_user: false,
            },
        )
        .await
        .unwrap()
        .id
    }

    /// For every group G and computer c: c in G.computer_ids iff G.id in
    /// c.group_ids.
    async fn assert_membership_consistent(store: &Store) {
        let guard = store.read().await;
        for group in guard.groups.values() {
            for cid in &group.computer_ids {
                let computer = guard.computers.get(cid).expect("member exists");
                assert!(
                    computer.group_ids.contains(&group.id),
                    "computer {cid} missing back-reference to group {}",
                    group.id
                );
            }
        }
        for computer in guard.computers.values() {
            for gid in &computer.group_ids {
                let group = guard.groups.get(gid).expect("group exists");
                assert!(
                    group.computer_ids.contains(&computer.id),
                    "group {gid} missing member {}",
                    computer.id
                );
            }
        }
    }

    #[tokio::test]
    async fn membership_stays_bidirectional_through_mutations() {
        let store = Store::new();
        let c1 = computer(&store, "ws-01", ComputerStatus::Online).await;
        let c2 = computer(&store, "ws-02", ComputerStatus::Offline).await;

        let (group, added) = create_group(
            &store,
            "Office".to_string(),
            None,
            vec![c1],
            Vec::new(),
            Vec::new(),
        )
        .await
        .unwrap();
        assert_eq!(added, vec![c1]);
        assert_membership_consistent(&store).await;

        // Swap membership: c1 out, c2 in.
        let (_, added) = update_group(
            &store,
            group.id,
            "Office".to_string(),
            None,
            vec![c2],
            Vec::new(),
            Vec::new(),
        )
        .await
        .unwrap();
        assert_eq!(added, vec![c2]);
        assert_membership_consistent(&store).await;

        let c1_model = computer_service::get_computer(&store, c1).await.unwrap();
        assert!(c1_model.group_ids.is_empty());

        delete_group(&store, group.id).await.unwrap();
        assert_membership_consistent(&store).await;
        let c2_model = computer_service::get_computer(&store, c2).await.unwrap();
        assert!(c2_model.group_ids.is_empty());
    }

    #[tokio::test]
    async fn member_list_is_deduplicated_but_order_preserving() {
        let store = Store::new();
        let c1 = computer(&store, "a", ComputerStatus::Online).await;
        let c2 = computer(&store, "b", ComputerStatus::Online).await;
        let c3 = computer(&store, "c", ComputerStatus::Online).await;

        let (group, _) = create_group(
            &store,
            "Ordered".to_string(),
            None,
            vec![c3, c1, c3, c2, c1],
            Vec::new(),
            Vec::new(),
        )
        .await
        .unwrap();
        assert_eq!(group.computer_ids, vec![c3, c1, c2]);

        // Reorder without changing the set: nothing is newly added.
        let (group, added) = update_group(
            &store,
            group.id,
            "Ordered".to_string(),
            None,
            vec![c1, c2, c3],
            Vec::new(),
            Vec::new(),
        )
        .await
        .unwrap();
        assert!(added.is_empty());
        assert_eq!(group.computer_ids, vec![c1, c2, c3]);
        assert_membership_consistent(&store).await;
    }

    #[tokio::test]
    async fn duplicate_procedure_association_is_rejected() {
        let store = Store::new();
        let p1 = procedure(&store, "Reboot").await;

        let config = AssociatedProcedureConfig {
            procedure_id: p1,
            run_on_new_member: false,
            schedule: ScheduleConfig::Disabled,
        };
        let err = create_group(
            &store,
            "Dupes".to_string(),
            None,
            Vec::new(),
            vec![config.clone(), config],
            Vec::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GroupServiceError::DuplicateProcedureConfig(id) if id == p1));
    }

    #[tokio::test]
    async fn invalid_schedule_and_unknown_references_are_rejected() {
        let store = Store::new();
        let p1 = procedure(&store, "Reboot").await;

        let err = create_group(
            &store,
            "Bad schedule".to_string(),
            None,
            Vec::new(),
            vec![AssociatedProcedureConfig {
                procedure_id: p1,
                run_on_new_member: false,
                schedule: ScheduleConfig::Weekly {
                    time: "08:00".to_string(),
                    day_of_week: 9,
                },
            }],
            Vec::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GroupServiceError::InvalidSchedule { .. }));

        let err = create_group(
            &store,
            "Ghost member".to_string(),
            None,
            vec![999],
            Vec::new(),
            Vec::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GroupServiceError::UnknownComputer(999)));

        let err = create_group(
            &store,
            "Ghost procedure".to_string(),
            None,
            Vec::new(),
            vec![AssociatedProcedureConfig {
                procedure_id: 999,
                run_on_new_member: false,
                schedule: ScheduleConfig::Disabled,
            }],
            Vec::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GroupServiceError::UnknownProcedure(999)));
    }
}
