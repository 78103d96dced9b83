pub mod command_service;
pub mod computer_service;
pub mod execution_service;
pub mod group_service;
pub mod license_service;
pub mod monitor_service;
pub mod procedure_service;
pub mod seed;
pub mod settings_service;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::db::entities::settings::{AiSettings, SmtpSettings};
use crate::db::entities::{
    computer, computer_group, custom_command, license, monitor, monitor_execution_log, procedure,
    procedure_execution, system_license,
};

/// Everything the dashboard serves, in process memory. There is no
/// persistence: the store is rebuilt (and optionally re-seeded) on every
/// start.
#[derive(Debug, Default)]
pub struct StoreInner {
    next_id: i32,
    pub computers: HashMap<i32, computer::Model>,
    pub groups: HashMap<i32, computer_group::Model>,
    pub procedures: HashMap<i32, procedure::Model>,
    pub executions: HashMap<Uuid, procedure_execution::Model>,
    pub monitors: HashMap<i32, monitor::Model>,
    pub monitor_logs: HashMap<Uuid, monitor_execution_log::Model>,
    pub commands: HashMap<Uuid, custom_command::Model>,
    pub licenses: HashMap<i32, license::Model>,
    pub smtp_settings: SmtpSettings,
    pub ai_settings: AiSettings,
    pub system_license: system_license::Model,
}

impl StoreInner {
    /// Ids are shared across catalog entity families; gaps are fine.
    pub fn alloc_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Cheap-to-clone handle over the shared state. A single lock guards the
/// whole store: mutations that span collections (membership sync, cascading
/// deletes) happen under one write guard and are never observed half-done.
#[derive(Clone, Debug)]
pub struct Store {
    inner: Arc<RwLock<StoreInner>>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().await
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
