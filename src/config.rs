//! Configuration handling for the TUI

use crate::lookup::DEFAULT_BASE_URL;
use crate::state::forms::OrderingPolicy;
use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// User configuration for the TUI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SignupConfig {
    /// ViaCEP base address
    pub viacep_url: Option<String>,
    /// Timeout for lookup and store requests, in seconds
    pub request_timeout_secs: Option<u64>,
    /// Which overlapping postal lookup wins
    pub autofill_ordering: Option<OrderingPolicy>,
    /// Show lookup failures in the status bar
    pub report_lookup_failures: Option<bool>,
    /// Firestore project id; records stay local when unset
    pub firestore_project: Option<String>,
    /// Firestore web API key
    pub firestore_api_key: Option<String>,
    /// Directory for local records and the log file
    pub data_dir: Option<PathBuf>,
}

impl SignupConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("br", "cadastro", "signup-tui")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the user config file, then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from a file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: SignupConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Override values from `SIGNUP_*` variables looked up through `var`
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("SIGNUP_VIACEP_URL") {
            self.viacep_url = Some(url);
        }
        if let Some(project) = var("SIGNUP_FIRESTORE_PROJECT") {
            self.firestore_project = Some(project);
        }
        if let Some(key) = var("SIGNUP_FIRESTORE_API_KEY") {
            self.firestore_api_key = Some(key);
        }
        if let Some(dir) = var("SIGNUP_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn viacep_url(&self) -> &str {
        self.viacep_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn ordering(&self) -> OrderingPolicy {
        self.autofill_ordering.unwrap_or_default()
    }

    pub fn report_lookup_failures(&self) -> bool {
        self.report_lookup_failures.unwrap_or(true)
    }

    /// Data directory, falling back to the platform data dir
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| anyhow!("no home directory to keep records in"))
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("signup-tui.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = SignupConfig::default();
        assert_eq!(config.viacep_url(), "https://viacep.com.br");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.ordering(), OrderingPolicy::LatestIssued);
        assert!(config.report_lookup_failures());
        assert!(config.firestore_project.is_none());
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let parsed: SignupConfig = serde_json::from_str("{}").unwrap();
        assert!(parsed.viacep_url.is_none());
    }

    #[test]
    fn test_deserialize_ordering_policy() {
        let parsed: SignupConfig =
            serde_json::from_str(r#"{"autofill_ordering": "arrival"}"#).unwrap();
        assert_eq!(parsed.ordering(), OrderingPolicy::Arrival);
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        let json = r#"{"request_timeout_secs": 3, "unknown_field": "value"}"#;
        let parsed: SignupConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = SignupConfig::load_from(&dir.path().join("nope.json")).unwrap();
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"firestore_project": "peladas", "report_lookup_failures": false}"#,
        )
        .unwrap();

        let config = SignupConfig::load_from(&path).unwrap();
        assert_eq!(config.firestore_project.as_deref(), Some("peladas"));
        assert!(!config.report_lookup_failures());
    }

    #[test]
    fn test_load_from_invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(SignupConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SIGNUP_VIACEP_URL", "http://localhost:9000"),
            ("SIGNUP_FIRESTORE_PROJECT", "peladas"),
            ("SIGNUP_DATA_DIR", "/tmp/signup"),
        ]
        .into_iter()
        .collect();

        let mut config = SignupConfig {
            viacep_url: Some("https://example.invalid".to_string()),
            firestore_api_key: Some("kept".to_string()),
            ..Default::default()
        };
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.viacep_url(), "http://localhost:9000");
        assert_eq!(config.firestore_project.as_deref(), Some("peladas"));
        assert_eq!(config.firestore_api_key.as_deref(), Some("kept"));
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/signup"));
        assert_eq!(
            config.log_path().unwrap(),
            PathBuf::from("/tmp/signup/signup-tui.log")
        );
    }
}
