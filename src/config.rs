//! Configuration Management
//!
//! Handles persistent configuration storage for rescall.

use crate::cloud::auth::token_from_env;
use crate::cloud::http::ApiClient;
use crate::cloud::manager::HttpManager;
use crate::resource::{ManagerRegistry, ResourceKind};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable overriding the configured endpoint
pub const ENDPOINT_ENV_VAR: &str = "RESCALL_ENDPOINT";

/// User configuration
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API base URL
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Bearer token
    #[serde(default)]
    pub token: Option<String>,
    /// Resource tag -> REST collection keyword, overriding the built-in ones
    #[serde(default)]
    pub resources: BTreeMap<String, String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rescall").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get effective endpoint (CLI > env > config)
    pub fn effective_endpoint(&self, cli: Option<String>) -> Option<String> {
        cli.or_else(|| std::env::var(ENDPOINT_ENV_VAR).ok())
            .or_else(|| self.endpoint.clone())
            .filter(|e| !e.trim().is_empty())
    }

    /// Get effective token (CLI > env > config)
    pub fn effective_token(&self, cli: Option<String>) -> Option<String> {
        cli.or_else(token_from_env).or_else(|| self.token.clone())
    }

    /// REST collection keyword for a resource kind
    pub fn keyword_for(&self, kind: ResourceKind) -> String {
        self.resources
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(kind.as_str()))
            .map(|(_, keyword)| keyword.clone())
            .unwrap_or_else(|| kind.default_keyword().to_string())
    }

    /// Register an HTTP manager for every resource kind under `endpoint`
    pub fn build_registry(&self, api: &ApiClient, endpoint: &str) -> Result<ManagerRegistry> {
        for tag in self.resources.keys() {
            if tag.parse::<ResourceKind>().is_err() {
                tracing::warn!("Ignoring unknown resource '{}' in config", tag);
            }
        }

        let mut registry = ManagerRegistry::new();
        for kind in ResourceKind::ALL {
            let manager = HttpManager::new(api.clone(), endpoint, self.keyword_for(kind))?;
            registry.register(kind, Arc::new(manager));
        }
        Ok(registry)
    }
}

// Security: keep the token out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("resources", &self.resources)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json"));
        assert!(config.endpoint.is_none());
        assert!(config.resources.is_empty());
    }

    #[test]
    fn test_invalid_file_yields_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let config = Config::load_from(file.path());
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_load_and_keyword_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"endpoint": "http://cloud.local/api", "resources": {{"vm": "guests"}}}}"#
        )
        .unwrap();

        let config = Config::load_from(file.path());
        assert_eq!(config.endpoint.as_deref(), Some("http://cloud.local/api"));
        assert_eq!(config.keyword_for(ResourceKind::Vm), "guests");
        assert_eq!(config.keyword_for(ResourceKind::Eip), "elasticips");
    }

    #[test]
    fn test_cli_endpoint_wins() {
        let config = Config {
            endpoint: Some("http://from-config".into()),
            ..Config::default()
        };
        assert_eq!(
            config.effective_endpoint(Some("http://from-cli".into())).as_deref(),
            Some("http://from-cli")
        );
    }

    #[test]
    fn test_build_registry_covers_every_kind() {
        let config = Config::default();
        let registry = config
            .build_registry(&ApiClient::new().unwrap(), "http://cloud.local/api")
            .unwrap();
        assert_eq!(registry.registered(), ResourceKind::ALL.to_vec());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config {
            token: Some("s3cr3t".into()),
            ..Config::default()
        };
        assert!(!format!("{:?}", config).contains("s3cr3t"));
    }
}
