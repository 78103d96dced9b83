pub mod ai_models;
pub mod command_models;
pub mod computer_models;
pub mod group_models;
pub mod license_models;
pub mod monitor_models;
pub mod procedure_models;
pub mod settings_models;
