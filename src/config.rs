use serde::Deserialize;

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    backend::http::ClientSettings,
    controller::{ControllerSettings, Policy},
    models::User,
};

pub const CONFIG_PATH_VAR: &str = "NOTES_APP_CONFIG";
pub const ACCESS_TOKEN_VAR: &str = "NOTES_APP_ACCESS_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    #[default]
    Remote,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub policy: Policy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub mode: BackendMode,
    /// Connection descriptor of the deployment, used in remote mode
    #[serde(default = "default_outputs_path")]
    pub outputs_path: PathBuf,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,
    /// Username signed in when running in memory mode
    #[serde(default = "default_memory_user")]
    pub memory_user: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(with = "humantime_serde", default = "default_url_expiry")]
    pub url_expiry: Duration,
}

const fn default_port() -> u16 {
    8000
}
fn default_outputs_path() -> PathBuf {
    PathBuf::from("backend_outputs.json")
}
const fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}
fn default_memory_user() -> String {
    "local-user".into()
}
fn default_key_prefix() -> String {
    "public/".into()
}
const fn default_url_expiry() -> Duration {
    Duration::from_secs(60)
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::default(),
            outputs_path: default_outputs_path(),
            access_token: None,
            request_timeout: default_request_timeout(),
            memory_user: default_memory_user(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            url_expiry: default_url_expiry(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            backend: BackendConfig::default(),
            storage: StorageConfig::default(),
            policy: Policy::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            access_token: self.backend.access_token.clone(),
            request_timeout: self.backend.request_timeout,
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            key_prefix: self.storage.key_prefix.clone(),
            url_expiry: self.storage.url_expiry,
            policy: self.policy,
        }
    }

    pub fn memory_user(&self) -> User {
        User {
            username: self.backend.memory_user.clone(),
            login_id: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    lookup(var)
        .map(|value| {
            value.parse::<T>().map_err(|e| ConfigError::Env {
                var,
                message: e.to_string(),
            })
        })
        .transpose()
}

fn load_from_env(lookup: &impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    if let Some(port) = parse_var(lookup, "NOTES_APP_PORT")? {
        config.port = port;
    }
    if let Some(mode) = lookup("NOTES_APP_BACKEND_MODE") {
        config.backend.mode = match mode.as_str() {
            "remote" => BackendMode::Remote,
            "memory" => BackendMode::Memory,
            other => {
                return Err(ConfigError::Env {
                    var: "NOTES_APP_BACKEND_MODE",
                    message: format!("expected 'remote' or 'memory', got '{other}'"),
                });
            }
        };
    }
    if let Some(path) = lookup("NOTES_APP_BACKEND_OUTPUTS") {
        config.backend.outputs_path = PathBuf::from(path);
    }
    if let Some(expiry) = lookup("NOTES_APP_URL_EXPIRY") {
        config.storage.url_expiry =
            humantime::parse_duration(&expiry).map_err(|e| ConfigError::Env {
                var: "NOTES_APP_URL_EXPIRY",
                message: e.to_string(),
            })?;
    }

    Ok(config)
}

/// Resolve the configuration the way the binary does, with `lookup` standing in
/// for the process environment and relative fallbacks taken from `dir`.
///
/// Order: the file named by `NOTES_APP_CONFIG`, `config.yaml`,
/// `config.example.yaml`, then environment variables alone. The access token
/// variable overrides whatever the file says.
pub fn load_config_with(
    lookup: impl Fn(&str) -> Option<String>,
    dir: &Path,
) -> Result<Config, ConfigError> {
    let mut config = load_layers(&lookup, dir)?;

    if let Some(token) = lookup(ACCESS_TOKEN_VAR) {
        config.backend.access_token = Some(token);
    }

    Ok(config)
}

fn load_layers(
    lookup: &impl Fn(&str) -> Option<String>,
    dir: &Path,
) -> Result<Config, ConfigError> {
    let config_path =
        lookup(CONFIG_PATH_VAR).map_or_else(|| dir.join("config.yaml"), PathBuf::from);

    // Try env path
    if config_path.exists() {
        return Config::from_file(&config_path);
    }

    // Fallback to config.yaml
    let default_path = dir.join("config.yaml");
    if default_path.exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to '{}'",
            config_path.display(),
            default_path.display()
        );
        return Config::from_file(&default_path);
    }

    // Fallback to config.example.yaml
    let example_path = dir.join("config.example.yaml");
    if example_path.exists() {
        tracing::warn!(
            "Config file '{}' not found, falling back to '{}'\
             \n This file should not be used and should be replaced with actual data",
            config_path.display(),
            example_path.display()
        );
        return Config::from_file(&example_path);
    }

    tracing::info!(
        "No config file found, attempting to load configuration from environment variables"
    );
    load_from_env(lookup)
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_with(|var| env::var(var).ok(), Path::new("."))
}
