use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    #[serde(default = "default_settings_key")]
    pub settings_encryption_key: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    listen_addr: Option<String>,
    frontend_url: Option<String>,
    settings_encryption_key: Option<String>,
    log_dir: Option<String>,
    seed_demo_data: Option<bool>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_seed_demo_data() -> bool {
    true
}

fn default_settings_key() -> String {
    // This key is for development convenience.
    // It's crucial to override this in production via environment variables.
    "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f".to_string()
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialServerConfig = if let Some(path_str) = config_path {
            let path = Path::new(path_str);
            if path.exists() {
                let contents = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))?
            } else {
                PartialServerConfig::default()
            }
        } else {
            PartialServerConfig::default()
        };

        // 2. Load from environment variables
        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        // 3. Merge: environment overrides file
        let final_config = ServerConfig {
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            frontend_url: env_config
                .frontend_url
                .or(file_config.frontend_url)
                .unwrap_or_else(default_frontend_url),
            settings_encryption_key: env_config
                .settings_encryption_key
                .or(file_config.settings_encryption_key)
                .unwrap_or_else(default_settings_key),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            seed_demo_data: env_config
                .seed_demo_data
                .or(file_config.seed_demo_data)
                .unwrap_or_else(default_seed_demo_data),
        };

        Ok(final_config)
    }
}
