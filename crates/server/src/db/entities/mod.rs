pub mod computer;
pub mod computer_group;
pub mod custom_command;
pub mod license;
pub mod monitor;
pub mod monitor_execution_log;
pub mod procedure;
pub mod procedure_execution;
pub mod settings;
pub mod system_license;

// Prelude module for easy importing of all entities and their related types
pub mod prelude {
    pub use super::computer::Model as ComputerModel;

    pub use super::computer_group::Model as ComputerGroupModel;

    pub use super::procedure::Model as ProcedureModel;

    pub use super::procedure_execution::Model as ProcedureExecutionModel;

    pub use super::monitor::Model as MonitorModel;

    pub use super::monitor_execution_log::Model as MonitorExecutionLogModel;

    pub use super::custom_command::Model as CustomCommandModel;

    pub use super::license::Model as LicenseModel;

    pub use super::system_license::Model as SystemLicenseModel;

    pub use super::settings::{AiSettings, SmtpSettings};
}
