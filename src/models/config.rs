//! Configuration model loaded from external sources.

use std::env;
use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const APP_DIR: &str = "atc-portal";

fn default_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> usize {
    20
}

#[derive(Clone, Debug, Deserialize)]
/// Settings the client needs to reach the platform.
pub struct ClientConfig {
    pub backend_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Where the session tokens are persisted; the platform config dir when unset.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    /// Known ICAO codes offered by the airport search.
    #[serde(default)]
    pub airports: Vec<String>,
}

impl ClientConfig {
    /// Loads `config/default.yaml`, the `APP_ENV` profile and `APP_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        // Select config profile (defaults to `local`).
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());
        Self::load_from("config", &app_env)
    }

    pub fn load_from(dir: &str, app_env: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(&format!("{dir}/default")))
            .add_source(File::with_name(&format!("{dir}/{app_env}")).required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }

    /// Resolved token file location, `None` when no config dir exists.
    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_file
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DIR).join("session.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_from_profile_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.yaml"),
            "backend_url: https://api.example.org\ntoken_file: /tmp/session.json\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("test.yaml"), "page_size: 50\n").unwrap();

        let config = ClientConfig::load_from(dir.path().to_str().unwrap(), "test").unwrap();

        assert_eq!(config.backend_url, "https://api.example.org");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.token_path(), Some(PathBuf::from("/tmp/session.json")));
        assert!(config.airports.is_empty());
    }

    #[test]
    fn missing_default_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ClientConfig::load_from(dir.path().to_str().unwrap(), "local").is_err());
    }
}
