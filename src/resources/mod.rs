//! Resource adapters.
//!
//! Each adapter translates one resource type between the host's JSON state
//! and the incident.io API. Adapters implement the typed [`Resource`] trait;
//! the blanket [`DynResource`] impl handles JSON (de)serialization, planning
//! and import so the provider can drive every type through one interface.

mod catalog_entry;
mod catalog_type;
mod catalog_type_attributes;
mod custom_field;
mod custom_field_option;
mod incident_role;
mod severity;
mod status;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::client::Client;
use crate::error::ProviderError;
use crate::plan::plan_resource;
use crate::schema::Schema;
use crate::types::PlanResult;

pub use catalog_entry::{AttributeValueModel, CatalogEntryModel, CatalogEntryResource};
pub use catalog_type::{CatalogTypeModel, CatalogTypeResource};
pub use catalog_type_attributes::{
    CatalogTypeAttributeModel, CatalogTypeAttributesModel, CatalogTypeAttributesResource,
};
pub use custom_field::{CustomFieldModel, CustomFieldResource};
pub use custom_field_option::{CustomFieldOptionModel, CustomFieldOptionResource};
pub use incident_role::{IncidentRoleModel, IncidentRoleResource};
pub use severity::{SeverityModel, SeverityResource};
pub use status::{StatusModel, StatusResource};

/// Annotation stamped on entities the provider manages, carrying its version.
pub const VERSION_ANNOTATION: &str = "incident.io/terraform/version";

/// What every adapter is handed at configure time.
#[derive(Debug, Clone)]
pub struct ProviderData {
    /// The shared API client.
    pub client: Arc<Client>,
    /// Provider version, used for annotations.
    pub version: String,
}

impl ProviderData {
    /// Create provider data from a client and version.
    pub fn new(client: Arc<Client>, version: impl Into<String>) -> Self {
        Self {
            client,
            version: version.into(),
        }
    }

    /// Annotations attached to created and updated catalog entities.
    pub fn annotations(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(VERSION_ANNOTATION.to_string(), self.version.clone())])
    }
}

/// A resource type backed by the incident.io API.
///
/// `Model` is the resource's state as the host stores it. Required attributes
/// are plain fields; optional and computed ones are `Option`s that serialize
/// to `null` when unset.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// The typed state of this resource.
    type Model: Serialize + DeserializeOwned + Send + Sync;

    /// Type name used in configuration, e.g. `incident_severity`.
    const TYPE_NAME: &'static str;

    /// The schema of this resource.
    fn schema() -> Schema;

    /// Adjust a proposed model before it is diffed against the prior state.
    fn modify_plan(_prior: Option<&Self::Model>, proposed: Self::Model) -> Self::Model {
        proposed
    }

    /// Create the entity and return the resulting state.
    async fn create(&self, plan: Self::Model) -> Result<Self::Model, ProviderError>;

    /// Fetch the current state of the entity with the given id.
    async fn read(&self, id: &str) -> Result<Self::Model, ProviderError>;

    /// Update the entity with the given id to match the plan.
    async fn update(&self, id: &str, plan: Self::Model) -> Result<Self::Model, ProviderError>;

    /// Destroy the entity with the given id.
    async fn delete(&self, id: &str) -> Result<(), ProviderError>;
}

/// Object-safe view of a [`Resource`] working on JSON state.
#[async_trait]
pub trait DynResource: Send + Sync {
    /// Type name used in configuration.
    fn type_name(&self) -> &'static str;

    /// The schema of this resource.
    fn resource_schema(&self) -> Schema;

    /// Plan the transition from `prior` to `proposed`.
    fn plan_state(&self, prior: Option<&Value>, proposed: &Value)
        -> Result<PlanResult, ProviderError>;

    /// Create from a planned state, returning the new state.
    async fn create_state(&self, planned: Value) -> Result<Value, ProviderError>;

    /// Refresh a state from the API.
    async fn read_state(&self, current: &Value) -> Result<Value, ProviderError>;

    /// Update the entity identified by `prior` to match `planned`.
    async fn update_state(&self, prior: &Value, planned: Value) -> Result<Value, ProviderError>;

    /// Destroy the entity identified by `current`.
    async fn delete_state(&self, current: &Value) -> Result<(), ProviderError>;

    /// Seed a state holding only `id`; a subsequent read fills in the rest.
    fn import_state(&self, id: &str) -> Result<Value, ProviderError>;
}

#[async_trait]
impl<R: Resource> DynResource for R {
    fn type_name(&self) -> &'static str {
        R::TYPE_NAME
    }

    fn resource_schema(&self) -> Schema {
        R::schema()
    }

    fn plan_state(
        &self,
        prior: Option<&Value>,
        proposed: &Value,
    ) -> Result<PlanResult, ProviderError> {
        let schema = R::schema();
        if proposed.is_null() {
            return plan_resource(&schema, prior, proposed);
        }

        let proposed_model: R::Model = decode_state(R::TYPE_NAME, proposed.clone())?;
        // An import-seeded prior has nulls where required values go.
        let prior_model = prior
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value::<R::Model>(v.clone()).ok());

        let adjusted = R::modify_plan(prior_model.as_ref(), proposed_model);
        plan_resource(&schema, prior, &serde_json::to_value(adjusted)?)
    }

    async fn create_state(&self, planned: Value) -> Result<Value, ProviderError> {
        let plan: R::Model = decode_state(R::TYPE_NAME, planned)?;
        let created = self.create(plan).await?;
        Ok(serde_json::to_value(created)?)
    }

    async fn read_state(&self, current: &Value) -> Result<Value, ProviderError> {
        let id = state_id(current)?;
        let model = self.read(id).await?;
        Ok(serde_json::to_value(model)?)
    }

    async fn update_state(&self, prior: &Value, planned: Value) -> Result<Value, ProviderError> {
        let id = state_id(prior)?;
        let plan: R::Model = decode_state(R::TYPE_NAME, planned)?;
        let updated = self.update(id, plan).await?;
        Ok(serde_json::to_value(updated)?)
    }

    async fn delete_state(&self, current: &Value) -> Result<(), ProviderError> {
        let id = state_id(current)?;
        self.delete(id).await
    }

    fn import_state(&self, id: &str) -> Result<Value, ProviderError> {
        if id.is_empty() {
            return Err(ProviderError::Validation(
                "import id must not be empty".to_string(),
            ));
        }

        let mut state: Map<String, Value> = R::schema()
            .block
            .attributes
            .keys()
            .map(|name| (name.clone(), Value::Null))
            .collect();
        state.insert("id".to_string(), Value::String(id.to_string()));
        Ok(Value::Object(state))
    }
}

/// Type names and schemas of every resource, in registration order.
pub fn schemas() -> Vec<(&'static str, Schema)> {
    vec![
        (CatalogEntryResource::TYPE_NAME, CatalogEntryResource::schema()),
        (
            CatalogTypeAttributesResource::TYPE_NAME,
            CatalogTypeAttributesResource::schema(),
        ),
        (CatalogTypeResource::TYPE_NAME, CatalogTypeResource::schema()),
        (
            CustomFieldOptionResource::TYPE_NAME,
            CustomFieldOptionResource::schema(),
        ),
        (CustomFieldResource::TYPE_NAME, CustomFieldResource::schema()),
        (IncidentRoleResource::TYPE_NAME, IncidentRoleResource::schema()),
        (SeverityResource::TYPE_NAME, SeverityResource::schema()),
        (StatusResource::TYPE_NAME, StatusResource::schema()),
    ]
}

/// Every resource adapter, bound to a configured client.
pub struct Resources {
    adapters: Vec<Box<dyn DynResource>>,
}

impl Resources {
    /// Build every adapter around the shared provider data.
    pub fn new(data: ProviderData) -> Self {
        let adapters: Vec<Box<dyn DynResource>> = vec![
            Box::new(CatalogEntryResource::new(data.clone())),
            Box::new(CatalogTypeAttributesResource::new(data.clone())),
            Box::new(CatalogTypeResource::new(data.clone())),
            Box::new(CustomFieldOptionResource::new(data.clone())),
            Box::new(CustomFieldResource::new(data.clone())),
            Box::new(IncidentRoleResource::new(data.clone())),
            Box::new(SeverityResource::new(data.clone())),
            Box::new(StatusResource::new(data)),
        ];
        Self { adapters }
    }

    /// Look up the adapter for a resource type.
    pub fn get(&self, type_name: &str) -> Result<&dyn DynResource, ProviderError> {
        self.adapters
            .iter()
            .find(|adapter| adapter.type_name() == type_name)
            .map(|adapter| adapter.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    /// Type names of every adapter, in registration order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|adapter| adapter.type_name()).collect()
    }
}

impl std::fmt::Debug for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.type_names()).finish()
    }
}

fn decode_state<T: DeserializeOwned>(type_name: &str, value: Value) -> Result<T, ProviderError> {
    serde_json::from_value(value).map_err(|err| {
        ProviderError::Validation(format!("invalid {} state: {}", type_name, err))
    })
}

fn state_id(state: &Value) -> Result<&str, ProviderError> {
    state
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ProviderError::Validation("resource state has no id".to_string()))
}

/// Deserialize `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `None` for an empty list, so an unset list and an empty one read the same.
pub(crate) fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// `None` for an empty string.
pub(crate) fn non_empty_string(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
