use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{ProviderData, Resource};
use crate::client::custom_fields::{
    CreateCustomFieldOptionRequestBody, CustomFieldOptionV1, UpdateCustomFieldOptionRequestBody,
};
use crate::error::ProviderError;
use crate::schema::{Attribute, Schema};

/// Sort key given to options that don't set one.
pub const DEFAULT_SORT_KEY: i64 = 1000;

/// State of an `incident_custom_field_option`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldOptionModel {
    /// Option id.
    pub id: Option<String>,
    /// Owning custom field. Fixed once created.
    pub custom_field_id: String,
    /// Human readable name for the option.
    pub value: String,
    /// Options are displayed in ascending sort key order.
    pub sort_key: Option<i64>,
}

impl From<CustomFieldOptionV1> for CustomFieldOptionModel {
    fn from(option: CustomFieldOptionV1) -> Self {
        Self {
            id: Some(option.id),
            custom_field_id: option.custom_field_id,
            value: option.value,
            sort_key: Some(option.sort_key),
        }
    }
}

/// Manages the options of select custom fields.
#[derive(Debug, Clone)]
pub struct CustomFieldOptionResource {
    data: ProviderData,
}

impl CustomFieldOptionResource {
    /// Create the adapter.
    pub fn new(data: ProviderData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Resource for CustomFieldOptionResource {
    type Model = CustomFieldOptionModel;

    const TYPE_NAME: &'static str = "incident_custom_field_option";

    fn schema() -> Schema {
        Schema::v0()
            .with_description("Options for single and multi select custom fields")
            .with_attribute("id", Attribute::id())
            .with_attribute(
                "custom_field_id",
                Attribute::required_string()
                    .with_description("ID of the custom field this option belongs to")
                    .with_requires_replace(),
            )
            .with_attribute(
                "value",
                Attribute::required_string().with_description("Human readable name for the custom field option"),
            )
            .with_attribute(
                "sort_key",
                Attribute::optional_computed_int64()
                    .with_description("Sort key used to order the custom field options correctly")
                    .with_default(serde_json::json!(DEFAULT_SORT_KEY)),
            )
    }

    async fn create(
        &self,
        plan: CustomFieldOptionModel,
    ) -> Result<CustomFieldOptionModel, ProviderError> {
        let body = CreateCustomFieldOptionRequestBody {
            custom_field_id: plan.custom_field_id,
            value: plan.value,
            sort_key: Some(plan.sort_key.unwrap_or(DEFAULT_SORT_KEY)),
        };

        let option = self
            .data
            .client
            .create_custom_field_option(&body)
            .await
            .map_err(|err| ProviderError::client("create custom field option", err))?;

        trace!(id = %option.id, "created a custom field option resource");
        Ok(option.into())
    }

    async fn read(&self, id: &str) -> Result<CustomFieldOptionModel, ProviderError> {
        let option = self
            .data
            .client
            .show_custom_field_option(id)
            .await
            .map_err(|err| ProviderError::client("read custom field option", err))?;

        Ok(option.into())
    }

    async fn update(
        &self,
        id: &str,
        plan: CustomFieldOptionModel,
    ) -> Result<CustomFieldOptionModel, ProviderError> {
        let body = UpdateCustomFieldOptionRequestBody {
            value: plan.value,
            sort_key: plan.sort_key,
        };

        let option = self
            .data
            .client
            .update_custom_field_option(id, &body)
            .await
            .map_err(|err| ProviderError::client("update custom field option", err))?;

        Ok(option.into())
    }

    async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.data
            .client
            .destroy_custom_field_option(id)
            .await
            .map_err(|err| ProviderError::client("delete custom field option", err))
    }
}
