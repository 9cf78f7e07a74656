//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{DiscoveryError, Result};

pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;

/// What to do when a caller names a request type with no registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownRequestTypePolicy {
    /// Log a warning and return no report.
    #[default]
    Ignore,
    /// Raise a validation fault.
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub engine_guid: String,
    pub engine_name: String,
    pub server_name: String,
    pub max_page_size: usize,
    pub unknown_request_type: UnknownRequestTypePolicy,
    /// Users allowed to call the engine. Empty means everyone.
    pub authorized_users: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_guid: "discovery-engine".to_string(),
            engine_name: "discovery-engine".to_string(),
            server_name: "discovery-server".to_string(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            unknown_request_type: UnknownRequestTypePolicy::default(),
            authorized_users: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn new(engine_guid: &str, engine_name: &str) -> Self {
        Self {
            engine_guid: engine_guid.to_string(),
            engine_name: engine_name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_server_name(mut self, server_name: &str) -> Self {
        self.server_name = server_name.to_string();
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    pub fn with_unknown_request_type(mut self, policy: UnknownRequestTypePolicy) -> Self {
        self.unknown_request_type = policy;
        self
    }

    pub fn with_authorized_users(mut self, users: &[&str]) -> Self {
        self.authorized_users = users.iter().map(|u| u.to_string()).collect();
        self
    }

    /// Parse and validate a JSON configuration document. Missing keys take
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.engine_guid.trim().is_empty() {
            return Err(DiscoveryError::Configuration("engine_guid must not be empty".to_string()));
        }
        if self.max_page_size == 0 {
            return Err(DiscoveryError::Configuration(
                "max_page_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_authorized(&self, user_id: &str) -> bool {
        self.authorized_users.is_empty() || self.authorized_users.iter().any(|u| u == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = EngineConfig::from_json_str(r#"{"engine_guid": "e-1", "max_page_size": 2}"#).unwrap();
        assert_eq!(config.engine_guid, "e-1");
        assert_eq!(config.max_page_size, 2);
        assert_eq!(config.unknown_request_type, UnknownRequestTypePolicy::Ignore);
        assert!(config.is_authorized("anyone"));
    }

    #[test]
    fn test_policy_parses_snake_case() {
        let config = EngineConfig::from_json_str(r#"{"unknown_request_type": "reject"}"#).unwrap();
        assert_eq!(config.unknown_request_type, UnknownRequestTypePolicy::Reject);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = EngineConfig::from_json_str(r#"{"max_page_size": 0}"#).unwrap_err();
        assert!(matches!(err, DiscoveryError::Configuration(_)));
    }

    #[test]
    fn test_authorized_users() {
        let config = EngineConfig::default().with_authorized_users(&["alice"]);
        assert!(config.is_authorized("alice"));
        assert!(!config.is_authorized("bob"));
    }
}
