use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{ProviderData, Resource};
use crate::client::incident_statuses::{
    CreateIncidentStatusRequestBody, IncidentStatusV1, UpdateIncidentStatusRequestBody,
};
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// Categories a custom status can belong to.
pub const STATUS_CATEGORIES: [&str; 3] = ["live", "learning", "closed"];

/// State of an `incident_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusModel {
    /// Status id.
    pub id: Option<String>,
    /// Unique name of this status.
    pub name: String,
    /// Rich text description of the status.
    pub description: String,
    /// Fixed once created.
    pub category: String,
}

impl From<IncidentStatusV1> for StatusModel {
    fn from(status: IncidentStatusV1) -> Self {
        Self {
            id: Some(status.id),
            name: status.name,
            description: status.description,
            category: status.category,
        }
    }
}

/// Manages custom incident statuses.
#[derive(Debug, Clone)]
pub struct StatusResource {
    data: ProviderData,
}

impl StatusResource {
    /// Create the adapter.
    pub fn new(data: ProviderData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Resource for StatusResource {
    type Model = StatusModel;

    const TYPE_NAME: &'static str = "incident_status";

    fn schema() -> Schema {
        Schema::v0()
            .with_description(
                "Incident statuses track where an incident is in its lifecycle",
            )
            .with_attribute("id", Attribute::id())
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Unique name of this status"),
            )
            .with_attribute(
                "description",
                Attribute::required_string()
                    .with_description("Rich text description of the incident status"),
            )
            .with_attribute(
                "category",
                Attribute::required_string()
                    .with_description(
                        "Whether this status is a live, learning or closed status. Changing \
                         the category forces a new status",
                    )
                    .with_allowed_values(STATUS_CATEGORIES)
                    .with_requires_replace(),
            )
    }

    async fn create(&self, plan: StatusModel) -> Result<StatusModel, ProviderError> {
        let body = CreateIncidentStatusRequestBody {
            name: plan.name,
            description: plan.description,
            category: plan.category,
        };

        let status = self
            .data
            .client
            .create_incident_status(&body)
            .await
            .map_err(|err| ProviderError::client("create status", err))?;

        trace!(id = %status.id, "created a status resource");
        Ok(status.into())
    }

    async fn read(&self, id: &str) -> Result<StatusModel, ProviderError> {
        let status = self
            .data
            .client
            .show_incident_status(id)
            .await
            .map_err(|err| ProviderError::client("read status", err))?;

        Ok(status.into())
    }

    async fn update(&self, id: &str, plan: StatusModel) -> Result<StatusModel, ProviderError> {
        let body = UpdateIncidentStatusRequestBody {
            name: plan.name,
            description: plan.description,
        };

        let status = self
            .data
            .client
            .update_incident_status(id, &body)
            .await
            .map_err(|err| ProviderError::client("update status", err))?;

        Ok(status.into())
    }

    async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.data
            .client
            .destroy_incident_status(id)
            .await
            .map_err(|err| ProviderError::client("delete status", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;
    use serde_json::json;

    #[test]
    fn test_category_is_restricted() {
        let schema = StatusResource::schema();
        let diagnostics = validate(
            &schema,
            &json!({"name": "Paused", "description": "On hold", "category": "paused"}),
        );

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("category"));
    }

    #[test]
    fn test_category_forces_replacement() {
        let schema = StatusResource::schema();
        assert!(schema.attribute("category").unwrap().requires_replace);
    }
}
