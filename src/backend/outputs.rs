use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use std::{fs, path::Path};

use super::BackendError;

/// Connection descriptor for a backend deployment.
///
/// The platform owns this shape. Only the endpoints the façade needs are read;
/// everything else is kept in `extra` so the file round-trips untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendOutputs {
    #[serde(default)]
    pub version: Option<String>,
    pub auth: AuthOutputs,
    pub data: DataOutputs,
    pub storage: StorageOutputs,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthOutputs {
    pub url: String,
    #[serde(default)]
    pub user_pool_id: Option<String>,
    #[serde(default)]
    pub user_pool_client_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataOutputs {
    pub url: String,
    #[serde(default)]
    pub default_authorization_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageOutputs {
    pub url: String,
    pub bucket_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BackendOutputs {
    pub fn from_json(contents: &str) -> Result<Self, BackendError> {
        serde_json::from_str(contents)
            .map_err(|e| BackendError::Config(format!("malformed backend outputs: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            BackendError::Config(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUTS: &str = r#"{
        "version": "1",
        "auth": {
            "url": "https://auth.example.com",
            "user_pool_id": "pool-1",
            "user_pool_client_id": "client-1",
            "aws_region": "eu-west-1"
        },
        "data": {
            "url": "https://data.example.com/graphql",
            "default_authorization_type": "AMAZON_COGNITO_USER_POOLS"
        },
        "storage": {
            "url": "https://storage.example.com",
            "bucket_name": "notes-bucket"
        },
        "custom": { "feature": true }
    }"#;

    #[test]
    fn parses_known_sections_and_keeps_the_rest() {
        let outputs = BackendOutputs::from_json(OUTPUTS).unwrap();

        assert_eq!(outputs.version.as_deref(), Some("1"));
        assert_eq!(outputs.storage.bucket_name, "notes-bucket");
        assert_eq!(outputs.auth.user_pool_id.as_deref(), Some("pool-1"));
        assert_eq!(outputs.auth.extra["aws_region"], "eu-west-1");
        assert_eq!(outputs.extra["custom"]["feature"], true);
    }

    #[test]
    fn missing_section_is_a_config_error() {
        let result = BackendOutputs::from_json(r#"{"auth": {"url": "x"}}"#);
        assert!(matches!(result, Err(BackendError::Config(_))));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = BackendOutputs::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(BackendError::Config(msg)) if msg.contains("absent.json")));
    }
}
