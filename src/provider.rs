//! The incident.io provider.
//!
//! [`IncidentProvider`] owns the configuration handed over by the host and
//! dispatches every resource operation to the adapter registered for its
//! type name.

use std::fmt;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, info};

use crate::client::Client;
use crate::config::{ProviderConfig, API_KEY_ENV};
use crate::error::ProviderError;
use crate::resources::{self, ProviderData, Resources};
use crate::schema::{Attribute, Diagnostic, ProviderSchema, Schema};
use crate::server::ProviderService;
use crate::types::{ImportedResource, PlanResult, ProviderMetadata};
use crate::validation::validate;

/// Prefix of every resource type name served by this provider.
pub const TYPE_NAME_PREFIX: &str = "incident";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Provider for incident.io configuration.
pub struct IncidentProvider {
    version: String,
    env: EnvLookup,
    resources: RwLock<Option<Arc<Resources>>>,
}

impl IncidentProvider {
    /// Create a provider reporting `version`, reading the process environment.
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_env_lookup(version, |key| std::env::var(key).ok())
    }

    /// Create a provider that resolves environment variables through `lookup`.
    pub fn with_env_lookup<F>(version: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            version: version.into(),
            env: Arc::new(lookup),
            resources: RwLock::new(None),
        }
    }

    /// Version stamped into the user agent and annotations.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// User agent sent with every API request.
    pub fn user_agent(&self) -> String {
        format!("terraform-provider-incident/{}", self.version)
    }

    /// Whether `configure` has succeeded.
    pub fn is_configured(&self) -> bool {
        self.resources
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    fn configured(&self) -> Result<Arc<Resources>, ProviderError> {
        let guard = self
            .resources
            .read()
            .map_err(|_| ProviderError::Internal("provider state lock poisoned".to_string()))?;
        guard
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| ProviderError::Configuration("provider is not configured".to_string()))
    }

    fn provider_schema() -> Schema {
        Schema::v0()
            .with_description("Manage your incident.io configuration as code")
            .with_attribute(
                "endpoint",
                Attribute::optional_string().with_description("URL of the incident.io API"),
            )
            .with_attribute(
                "api_key",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!(
                        "API key for incident.io (https://app.incident.io/settings/api-keys). \
                         Sourced from the {} environment variable, if set.",
                        API_KEY_ENV
                    )),
            )
    }

    fn resource_schema(resource_type: &str) -> Result<Schema, ProviderError> {
        resources::schemas()
            .into_iter()
            .find(|(name, _)| *name == resource_type)
            .map(|(_, schema)| schema)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }
}

impl Default for IncidentProvider {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}

impl fmt::Debug for IncidentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncidentProvider")
            .field("version", &self.version)
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[async_trait::async_trait]
impl ProviderService for IncidentProvider {
    fn schema(&self) -> ProviderSchema {
        resources::schemas().into_iter().fold(
            ProviderSchema::new().with_provider_config(Self::provider_schema()),
            |schema, (name, resource)| schema.with_resource(name, resource),
        )
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            resources: resources::schemas()
                .into_iter()
                .map(|(name, _)| name.to_string())
                .collect(),
            data_sources: vec![],
        }
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&Self::provider_schema(), &config))
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let resolved = ProviderConfig::from_json(config)?.resolve(|key| (self.env)(key))?;
        debug!(endpoint = %resolved.endpoint, "configuring incident.io client");

        let client = Client::new(&resolved.endpoint, &resolved.api_key, &self.user_agent())?;
        let registry = Resources::new(ProviderData::new(Arc::new(client), self.version.clone()));

        let mut guard = self
            .resources
            .write()
            .map_err(|_| ProviderError::Internal("provider state lock poisoned".to_string()))?;
        *guard = Some(Arc::new(registry));

        info!(endpoint = %resolved.endpoint, version = %self.version, "provider configured");
        Ok(vec![])
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = Self::resource_schema(resource_type)?;
        Ok(validate(&schema, &config))
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let resources = self.configured()?;
        resources
            .get(resource_type)?
            .plan_state(prior_state.as_ref(), &proposed_state)
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let resources = self.configured()?;
        resources.get(resource_type)?.create_state(planned_state).await
    }

    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        let resources = self.configured()?;
        resources.get(resource_type)?.read_state(&current_state).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resources = self.configured()?;
        resources
            .get(resource_type)?
            .update_state(&prior_state, planned_state)
            .await
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resources = self.configured()?;
        resources.get(resource_type)?.delete_state(&current_state).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resources = self.configured()?;
        let state = resources.get(resource_type)?.import_state(id)?;
        Ok(vec![ImportedResource::new(resource_type, state)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn provider_with_env(vars: &[(&str, &str)]) -> IncidentProvider {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        IncidentProvider::with_env_lookup("1.2.3", move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_user_agent_carries_version() {
        let provider = IncidentProvider::new("1.2.3");
        assert_eq!(provider.user_agent(), "terraform-provider-incident/1.2.3");
    }

    #[test]
    fn test_metadata_lists_resources_in_order() {
        let metadata = IncidentProvider::default().metadata();
        assert_eq!(metadata.resources.len(), 8);
        assert_eq!(metadata.resources[0], "incident_catalog_entry");
        assert_eq!(metadata.resources[7], "incident_status");
        assert!(metadata
            .resources
            .iter()
            .all(|name| name.starts_with(TYPE_NAME_PREFIX)));
        assert!(metadata.data_sources.is_empty());
    }

    #[test]
    fn test_api_key_is_sensitive() {
        let schema = IncidentProvider::default().schema();
        let api_key = schema.provider.attribute("api_key").unwrap();
        assert!(api_key.flags.sensitive);
        assert!(api_key.flags.optional);
        assert_eq!(schema.resources.len(), 8);
    }

    #[tokio::test]
    async fn test_configure_requires_api_key() {
        let provider = provider_with_env(&[]);
        let err = provider.configure(json!({})).await.unwrap_err();

        assert!(matches!(err, ProviderError::Configuration(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
        assert!(!provider.is_configured());
    }

    #[tokio::test]
    async fn test_configure_from_environment() {
        let provider = provider_with_env(&[(API_KEY_ENV, "env-key")]);
        let diagnostics = provider.configure(Value::Null).await.unwrap();

        assert!(diagnostics.is_empty());
        assert!(provider.is_configured());
    }

    #[tokio::test]
    async fn test_configure_rejects_bad_endpoint() {
        let provider = provider_with_env(&[]);
        let result = provider
            .configure(json!({"endpoint": "not a url", "api_key": "key"}))
            .await;

        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_operations_require_configure() {
        let provider = provider_with_env(&[]);
        let err = provider
            .read("incident_severity", json!({"id": "01H"}))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Configuration error: provider is not configured");
    }

    #[tokio::test]
    async fn test_unknown_resource_type() {
        let provider = provider_with_env(&[(API_KEY_ENV, "key")]);
        provider.configure(json!({})).await.unwrap();

        let err = provider
            .create("incident_widget", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));

        let err = provider
            .validate_resource_config("incident_widget", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));
    }

    #[tokio::test]
    async fn test_validate_resource_config_flags_bad_category() {
        let provider = provider_with_env(&[]);
        let diagnostics = provider
            .validate_resource_config(
                "incident_status",
                json!({"name": "Investigating", "description": "Looking", "category": "open"}),
            )
            .await
            .unwrap();

        assert!(diagnostics.iter().any(Diagnostic::is_error));
    }

    #[tokio::test]
    async fn test_import_seeds_id() {
        let provider = provider_with_env(&[(API_KEY_ENV, "key")]);
        provider.configure(json!({})).await.unwrap();

        let imported = provider
            .import_resource("incident_incident_role", "01R")
            .await
            .unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].resource_type, "incident_incident_role");
        assert_eq!(imported[0].state["id"], "01R");
        assert!(imported[0].state["name"].is_null());
    }
}
