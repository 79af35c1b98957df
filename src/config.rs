//! Provider configuration.
//!
//! The host sends the provider block as JSON at configure time. Values there
//! are combined with the process environment into a [`ResolvedConfig`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProviderError;

/// API root used when neither configuration nor environment names one.
pub const DEFAULT_ENDPOINT: &str = "https://api.incident.io";

/// Environment variable that overrides the configured endpoint.
pub const ENDPOINT_ENV: &str = "INCIDENT_ENDPOINT";

/// Environment variable holding the API key when configuration omits it.
pub const API_KEY_ENV: &str = "INCIDENT_API_KEY";

/// The provider block as written by the operator.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// URL of the incident.io API.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// API key used to authenticate.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Endpoint and credential the API client is built from.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// API root.
    pub endpoint: String,
    /// Bearer credential. Never empty.
    pub api_key: String,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ProviderConfig {
    /// Decode the provider block. A `null` payload means an empty block.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|err| {
            ProviderError::Configuration(format!("invalid provider configuration: {}", err))
        })
    }

    /// Combine this block with the environment.
    ///
    /// The endpoint comes from `INCIDENT_ENDPOINT`, then the block, then
    /// [`DEFAULT_ENDPOINT`]. The key comes from the block, then
    /// `INCIDENT_API_KEY`. Empty strings count as unset.
    pub fn resolve<F>(&self, env: F) -> Result<ResolvedConfig, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = non_empty(env(ENDPOINT_ENV))
            .or_else(|| non_empty(self.endpoint.clone()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let api_key = non_empty(self.api_key.clone())
            .or_else(|| non_empty(env(API_KEY_ENV)))
            .ok_or_else(|| {
                ProviderError::Configuration(format!(
                    "missing API key: set api_key in the provider block or the {} environment variable",
                    API_KEY_ENV
                ))
            })?;

        Ok(ResolvedConfig { endpoint, api_key })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_endpoint() {
        let config = ProviderConfig::from_json(json!({"api_key": "secret"})).unwrap();
        let resolved = config.resolve(env(&[])).unwrap();

        assert_eq!(resolved.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(resolved.api_key, "secret");
    }

    #[test]
    fn test_environment_endpoint_overrides_config() {
        let config = ProviderConfig::from_json(json!({
            "endpoint": "https://configured.example",
            "api_key": "secret"
        }))
        .unwrap();

        let resolved = config
            .resolve(env(&[(ENDPOINT_ENV, "https://env.example")]))
            .unwrap();
        assert_eq!(resolved.endpoint, "https://env.example");

        let resolved = config.resolve(env(&[(ENDPOINT_ENV, "")])).unwrap();
        assert_eq!(resolved.endpoint, "https://configured.example");
    }

    #[test]
    fn test_configured_key_wins_over_environment() {
        let config = ProviderConfig::from_json(json!({"api_key": "configured"})).unwrap();
        let resolved = config.resolve(env(&[(API_KEY_ENV, "from-env")])).unwrap();
        assert_eq!(resolved.api_key, "configured");
    }

    #[test]
    fn test_key_falls_back_to_environment() {
        let config = ProviderConfig::from_json(json!({"api_key": null})).unwrap();
        let resolved = config.resolve(env(&[(API_KEY_ENV, "from-env")])).unwrap();
        assert_eq!(resolved.api_key, "from-env");
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let config = ProviderConfig::from_json(serde_json::Value::Null).unwrap();
        let err = config.resolve(env(&[(API_KEY_ENV, "")])).unwrap_err();

        assert!(matches!(err, ProviderError::Configuration(_)));
        assert!(err.message().contains(API_KEY_ENV));
    }

    #[test]
    fn test_invalid_shape_is_rejected() {
        let err = ProviderConfig::from_json(json!({"endpoint": 42})).unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ProviderConfig {
            endpoint: None,
            api_key: Some("hunter2".to_string()),
        };
        assert!(!format!("{:?}", config).contains("hunter2"));

        let resolved = ResolvedConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", resolved).contains("hunter2"));
    }
}
