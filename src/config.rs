//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCOREBOARD_CONFIG_PATH";

const DEFAULT_SCOREBOARD_PATH: &str = "scoreboard.json";
const DEFAULT_VISITS_PATH: &str = "visitors.log";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "1234";
const DEFAULT_GEOLOCATION_BASE_URL: &str = "http://ip-api.com";
const DEFAULT_GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// JSON document holding the scoreboard.
    pub scoreboard_path: PathBuf,
    /// Append-only visitor log.
    pub visits_path: PathBuf,
    /// Operator identity accepted by the admin login form.
    pub admin_username: String,
    pub admin_password: String,
    /// Age after which an admin session stops being accepted.
    pub session_ttl: Duration,
    /// Base URL of the ip-api compatible geolocation service.
    pub geolocation_base_url: String,
    /// Upper bound for a single geolocation lookup.
    pub geolocation_timeout: Duration,
    /// When set, `/declare_winner` accepts requests without an admin session.
    pub public_winner_declaration: bool,
    /// Keep the scoreboard in memory instead of on disk.
    pub in_memory: bool,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        scoreboard = %app_config.scoreboard_path.display(),
                        in_memory = app_config.in_memory,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Whether the submitted credentials match the configured operator identity.
    pub fn accepts_credentials(&self, username: &str, password: &str) -> bool {
        self.admin_username == username && self.admin_password == password
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    scoreboard_path: Option<PathBuf>,
    visits_path: Option<PathBuf>,
    admin_username: Option<String>,
    admin_password: Option<String>,
    session_ttl_secs: Option<u64>,
    geolocation_base_url: Option<String>,
    geolocation_timeout_ms: Option<u64>,
    public_winner_declaration: bool,
    in_memory: bool,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            scoreboard_path: value
                .scoreboard_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCOREBOARD_PATH)),
            visits_path: value
                .visits_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_VISITS_PATH)),
            admin_username: value
                .admin_username
                .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string()),
            admin_password: value
                .admin_password
                .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
            session_ttl: value
                .session_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SESSION_TTL),
            geolocation_base_url: value
                .geolocation_base_url
                .unwrap_or_else(|| DEFAULT_GEOLOCATION_BASE_URL.to_string()),
            geolocation_timeout: value
                .geolocation_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_GEOLOCATION_TIMEOUT),
            public_winner_declaration: value.public_winner_declaration,
            in_memory: value.in_memory,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_a_fresh_install() {
        let config = AppConfig::default();
        assert_eq!(config.scoreboard_path, PathBuf::from("scoreboard.json"));
        assert_eq!(config.visits_path, PathBuf::from("visitors.log"));
        assert!(config.accepts_credentials("admin", "1234"));
        assert!(!config.public_winner_declaration);
        assert_eq!(config.geolocation_timeout, Duration::from_secs(3));
        assert_eq!(config.session_ttl, Duration::from_secs(43_200));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"admin_password":"s3cret","geolocation_timeout_ms":250,"session_ttl_secs":60,"in_memory":true}"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);
        assert!(config.accepts_credentials("admin", "s3cret"));
        assert!(!config.accepts_credentials("admin", "1234"));
        assert_eq!(config.geolocation_timeout, Duration::from_millis(250));
        assert_eq!(config.session_ttl, Duration::from_secs(60));
        assert!(config.in_memory);
        assert_eq!(config.geolocation_base_url, "http://ip-api.com");
    }
}
