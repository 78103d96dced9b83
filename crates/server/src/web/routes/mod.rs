pub mod ai_routes;
pub mod command_routes;
pub mod computer_routes;
pub mod execution_routes;
pub mod group_routes;
pub mod license_routes;
pub mod monitor_routes;
pub mod procedure_routes;
pub mod settings_routes;
pub mod update_routes;
