use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{ProviderData, Resource};
use crate::client::severities::{SeverityRequestBody, SeverityV1};
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// State of an `incident_severity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityModel {
    /// Severity id.
    pub id: Option<String>,
    /// Human readable name.
    pub name: String,
    /// What the severity means.
    pub description: String,
    /// Ordering among severities. The API picks one when unset.
    pub rank: Option<i64>,
}

impl From<SeverityV1> for SeverityModel {
    fn from(severity: SeverityV1) -> Self {
        Self {
            id: Some(severity.id),
            name: severity.name,
            description: severity.description,
            rank: Some(severity.rank),
        }
    }
}

impl SeverityModel {
    fn request_body(&self) -> SeverityRequestBody {
        SeverityRequestBody {
            name: self.name.clone(),
            description: self.description.clone(),
            rank: self.rank,
        }
    }
}

/// Manages incident severities.
#[derive(Debug, Clone)]
pub struct SeverityResource {
    data: ProviderData,
}

impl SeverityResource {
    /// Create the adapter.
    pub fn new(data: ProviderData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Resource for SeverityResource {
    type Model = SeverityModel;

    const TYPE_NAME: &'static str = "incident_severity";

    fn schema() -> Schema {
        Schema::v0()
            .with_description("Severities describe how bad an incident is")
            .with_attribute("id", Attribute::id())
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Human readable name of the severity"),
            )
            .with_attribute(
                "description",
                Attribute::required_string().with_description("Description of the severity"),
            )
            .with_attribute(
                "rank",
                Attribute::optional_computed_int64()
                    .with_description("Rank to help sort severities (lower numbers are less severe)"),
            )
    }

    async fn create(&self, plan: SeverityModel) -> Result<SeverityModel, ProviderError> {
        let severity = self
            .data
            .client
            .create_severity(&plan.request_body())
            .await
            .map_err(|err| ProviderError::client("create severity", err))?;

        trace!(id = %severity.id, "created a severity resource");
        Ok(severity.into())
    }

    async fn read(&self, id: &str) -> Result<SeverityModel, ProviderError> {
        let severity = self
            .data
            .client
            .show_severity(id)
            .await
            .map_err(|err| ProviderError::client("read severity", err))?;

        Ok(severity.into())
    }

    async fn update(&self, id: &str, plan: SeverityModel) -> Result<SeverityModel, ProviderError> {
        let severity = self
            .data
            .client
            .update_severity(id, &plan.request_body())
            .await
            .map_err(|err| ProviderError::client("update severity", err))?;

        Ok(severity.into())
    }

    async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.data
            .client
            .destroy_severity(id)
            .await
            .map_err(|err| ProviderError::client("delete severity", err))
    }
}
