use serde::{Deserialize, Serialize};

fn default_manager_name() -> String {
    guestbook::DEFAULT_FIELD_MANAGER.to_string()
}

fn default_shutdown_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Namespace to watch, all namespaces when unset.
    pub namespace: Option<String>,
    /// Field manager name used for server-side apply.
    #[serde(default = "default_manager_name")]
    pub name: String,
    /// Maximum number of concurrent reconciliations, 0 is unbounded.
    #[serde(default)]
    pub concurrency: u16,
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Result<Config, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("GUESTBOOK").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
