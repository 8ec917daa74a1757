use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/chat.json";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_DATABASE_PATH: &str = "data/widget.db";
/// Roughly what a browser grants one origin for local storage.
pub const DEFAULT_STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// A persona the user can pick in the role selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOption {
    /// Sent to the server as `ai_role`.
    pub key: String,
    pub name: String,
}

impl RoleOption {
    fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    pub database_path: PathBuf,
    pub streaming: bool,
    pub default_role: String,
    pub roles: Vec<RoleOption>,
    pub storage_quota_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            streaming: true,
            default_role: "helpful_assistant".to_string(),
            roles: vec![
                RoleOption::new("helpful_assistant", "Helpful Assistant"),
                RoleOption::new("code_expert", "Code Expert"),
                RoleOption::new("creative_writer", "Creative Writer"),
                RoleOption::new("teacher", "Teacher"),
            ],
            storage_quota_bytes: DEFAULT_STORAGE_QUOTA_BYTES,
        }
    }
}

impl AppConfig {
    /// Display name for `key`, falling back to the key itself.
    pub fn role_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.roles
            .iter()
            .find(|role| role.key == key)
            .map(|role| role.name.as_str())
            .unwrap_or(key)
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let config = load_config("does/not/exist.json");
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert!(config.streaming);
        assert_eq!(config.role_name("code_expert"), "Code Expert");
        assert_eq!(config.role_name("pirate"), "pirate");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.json");
        fs::write(
            &path,
            r#"{"server_url": "http://chat.local:8080", "streaming": false}"#,
        )
        .unwrap();

        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.server_url, "http://chat.local:8080");
        assert!(!config.streaming);
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.roles.len(), 4);
    }

    #[test]
    fn unparsable_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.json");
        fs::write(&path, "not json").unwrap();

        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.default_role, "helpful_assistant");
    }
}
