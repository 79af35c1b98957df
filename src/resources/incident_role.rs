use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{ProviderData, Resource};
use crate::client::incident_roles::{IncidentRoleRequestBody, IncidentRoleV1};
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// State of an `incident_incident_role`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRoleModel {
    /// Role id.
    pub id: Option<String>,
    /// Human readable name.
    pub name: String,
    /// Describes the purpose of the role.
    pub description: String,
    /// Given to whoever is nominated for the role.
    pub instructions: String,
    /// Short human readable name for Slack.
    pub shortform: String,
}

impl From<IncidentRoleV1> for IncidentRoleModel {
    fn from(role: IncidentRoleV1) -> Self {
        Self {
            id: Some(role.id),
            name: role.name,
            description: role.description,
            instructions: role.instructions,
            shortform: role.shortform,
        }
    }
}

impl From<IncidentRoleModel> for IncidentRoleRequestBody {
    fn from(model: IncidentRoleModel) -> Self {
        Self {
            name: model.name,
            description: model.description,
            instructions: model.instructions,
            shortform: model.shortform,
        }
    }
}

/// Manages incident roles.
#[derive(Debug, Clone)]
pub struct IncidentRoleResource {
    data: ProviderData,
}

impl IncidentRoleResource {
    /// Create the adapter.
    pub fn new(data: ProviderData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Resource for IncidentRoleResource {
    type Model = IncidentRoleModel;

    const TYPE_NAME: &'static str = "incident_incident_role";

    fn schema() -> Schema {
        Schema::v0()
            .with_description("Incident roles are assigned to responders during an incident")
            .with_attribute("id", Attribute::id())
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Human readable name of the incident role"),
            )
            .with_attribute(
                "description",
                Attribute::required_string().with_description("Describes the purpose of the role"),
            )
            .with_attribute(
                "instructions",
                Attribute::required_string()
                    .with_description("Provided to whoever is nominated for the role"),
            )
            .with_attribute(
                "shortform",
                Attribute::required_string()
                    .with_description("Short human readable name for Slack"),
            )
    }

    async fn create(&self, plan: IncidentRoleModel) -> Result<IncidentRoleModel, ProviderError> {
        let role = self
            .data
            .client
            .create_incident_role(&plan.into())
            .await
            .map_err(|err| ProviderError::client("create incident role", err))?;

        trace!(id = %role.id, "created an incident role resource");
        Ok(role.into())
    }

    async fn read(&self, id: &str) -> Result<IncidentRoleModel, ProviderError> {
        let role = self
            .data
            .client
            .show_incident_role(id)
            .await
            .map_err(|err| ProviderError::client("read incident role", err))?;

        Ok(role.into())
    }

    async fn update(
        &self,
        id: &str,
        plan: IncidentRoleModel,
    ) -> Result<IncidentRoleModel, ProviderError> {
        let role = self
            .data
            .client
            .update_incident_role(id, &plan.into())
            .await
            .map_err(|err| ProviderError::client("update incident role", err))?;

        Ok(role.into())
    }

    async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.data
            .client
            .destroy_incident_role(id)
            .await
            .map_err(|err| ProviderError::client("delete incident role", err))
    }
}
