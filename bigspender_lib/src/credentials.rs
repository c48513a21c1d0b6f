//! Locates the API key: an environment variable first, then a JSON config file.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SpendError;

/// Environment variable checked before the config file.
pub const DEFAULT_API_KEY_VAR: &str = "API_KEY";

/// Config file read when the environment variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Static key exchanged for bearer tokens. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank input, which is treated as not configured.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Contents of the local config file. Only `api_key` is needed; the
/// connection overrides are optional.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
}

impl ConfigFile {
    /// Reads and decodes the file. A missing file is `Ok(None)`.
    pub fn read(path: &Path) -> Result<Option<Self>, SpendError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SpendError::ConfigurationInvalid {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| SpendError::ConfigurationInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

/// Where to look for the API key.
#[derive(Debug, Clone)]
pub struct CredentialSource {
    pub env_var: String,
    pub config_path: PathBuf,
}

/// The API key plus whatever connection overrides the config file holds.
#[derive(Debug)]
pub struct Credentials {
    pub key: ApiKey,
    pub config: ConfigFile,
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_API_KEY_VAR.to_string(),
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }
}

impl CredentialSource {
    pub fn load(&self) -> Result<Credentials, SpendError> {
        self.load_with(|name| std::env::var(name).ok())
    }

    /// Same as [`load`](Self::load) with an injectable environment lookup.
    ///
    /// The config file is read once. When the key comes from the
    /// environment the file is optional, and an unreadable one is skipped.
    pub fn load_with<F>(&self, lookup: F) -> Result<Credentials, SpendError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(&self.env_var).and_then(ApiKey::new) {
            tracing::debug!("Using API key from ${}", self.env_var);
            let config = match ConfigFile::read(&self.config_path) {
                Ok(file) => file.unwrap_or_default(),
                Err(e) => {
                    tracing::warn!("Ignoring config file overrides: {}", e);
                    ConfigFile::default()
                }
            };
            return Ok(Credentials { key, config });
        }

        let mut config = ConfigFile::read(&self.config_path)?.ok_or_else(|| {
            SpendError::ConfigurationMissing(format!(
                "${} is not set and {} does not exist",
                self.env_var,
                self.config_path.display()
            ))
        })?;

        let key = config.api_key.take().and_then(ApiKey::new).ok_or_else(|| {
            SpendError::ConfigurationMissing(format!(
                "${} is not set and {} has no api_key",
                self.env_var,
                self.config_path.display()
            ))
        })?;
        tracing::debug!("Using API key from {}", self.config_path.display());
        Ok(Credentials { key, config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn source_for(path: &Path) -> CredentialSource {
        CredentialSource {
            env_var: "BIGSPENDER_TEST_KEY".to_string(),
            config_path: path.to_path_buf(),
        }
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn environment_wins_over_file() {
        let file = write_config(r#"{"api_key": "from-file"}"#);
        let creds = source_for(file.path())
            .load_with(|_| Some("from-env".to_string()))
            .unwrap();
        assert_eq!(creds.key.expose(), "from-env");
    }

    #[test]
    fn falls_back_to_config_file() {
        let file = write_config(r#"{"api_key": "from-file", "base_url": "http://localhost"}"#);
        let creds = source_for(file.path()).load_with(|_| None).unwrap();
        assert_eq!(creds.key.expose(), "from-file");
        assert_eq!(creds.config.base_url.as_deref(), Some("http://localhost"));
    }

    #[test]
    fn blank_env_value_falls_back_to_file() {
        let file = write_config(r#"{"api_key": "from-file"}"#);
        let creds = source_for(file.path())
            .load_with(|_| Some("   ".to_string()))
            .unwrap();
        assert_eq!(creds.key.expose(), "from-file");
    }

    #[test]
    fn missing_everywhere_is_configuration_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = source_for(&dir.path().join("config.json"))
            .load_with(|_| None)
            .unwrap_err();
        assert!(matches!(err, SpendError::ConfigurationMissing(_)));
    }

    #[test]
    fn file_without_key_is_configuration_missing() {
        let file = write_config(r#"{"base_url": "http://localhost"}"#);
        let err = source_for(file.path()).load_with(|_| None).unwrap_err();
        assert!(matches!(err, SpendError::ConfigurationMissing(_)));
    }

    #[test]
    fn malformed_file_is_configuration_invalid() {
        let file = write_config("{api_key: nope");
        let err = source_for(file.path()).load_with(|_| None).unwrap_err();
        assert!(matches!(err, SpendError::ConfigurationInvalid { .. }));
    }

    #[test]
    fn malformed_file_is_ignored_when_key_is_in_environment() {
        let file = write_config("{not json");
        let creds = source_for(file.path())
            .load_with(|_| Some("from-env".to_string()))
            .unwrap();
        assert_eq!(creds.key.expose(), "from-env");
        assert_eq!(creds.config.base_url, None);
        assert_eq!(creds.config.api_version, None);
    }

    #[test]
    fn environment_key_keeps_file_overrides() {
        let file = write_config(r#"{"api_key": "from-file", "api_version": "3.0"}"#);
        let creds = source_for(file.path())
            .load_with(|_| Some("from-env".to_string()))
            .unwrap();
        assert_eq!(creds.key.expose(), "from-env");
        assert_eq!(creds.config.api_version.as_deref(), Some("3.0"));
    }

    #[test]
    fn config_file_overrides_are_optional() {
        let file = write_config(r#"{"api_key": "k", "api_version": "3.0"}"#);
        let conf = ConfigFile::read(file.path()).unwrap().unwrap();
        assert_eq!(conf.api_version.as_deref(), Some("3.0"));
        assert_eq!(conf.base_url, None);
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("secret").unwrap();
        assert_eq!(format!("{:?}", key), "ApiKey(<redacted>)");
    }
}
