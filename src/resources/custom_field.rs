use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{ProviderData, Resource};
use crate::client::custom_fields::{
    CreateCustomFieldRequestBody, CustomFieldV1, UpdateCustomFieldRequestBody,
};
use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};

/// Kinds of value a custom field can hold.
pub const FIELD_TYPES: [&str; 5] = ["single_select", "multi_select", "text", "link", "numeric"];

/// When a custom field must be filled in.
pub const REQUIRED_VALUES: [&str; 3] = ["never", "before_closure", "always"];

/// State of an `incident_custom_field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldModel {
    /// Custom field id.
    pub id: Option<String>,
    /// Human readable name.
    pub name: String,
    /// Description shown alongside the field.
    pub description: String,
    /// Fixed once created.
    pub field_type: String,
    /// When the field must be set.
    pub required: String,
    /// Whether the field is shown on the incident creation form.
    pub show_before_creation: bool,
    /// Whether the field is shown on the incident close form.
    pub show_before_closure: bool,
    /// Whether the field is shown on the incident update form.
    pub show_before_update: bool,
    /// Whether the field appears in the announcement post.
    pub show_in_announcement_post: Option<bool>,
}

impl From<CustomFieldV1> for CustomFieldModel {
    fn from(field: CustomFieldV1) -> Self {
        Self {
            id: Some(field.id),
            name: field.name,
            description: field.description,
            field_type: field.field_type,
            required: field.required,
            show_before_creation: field.show_before_creation,
            show_before_closure: field.show_before_closure,
            show_before_update: field.show_before_update,
            show_in_announcement_post: field.show_in_announcement_post,
        }
    }
}

/// Manages custom fields.
#[derive(Debug, Clone)]
pub struct CustomFieldResource {
    data: ProviderData,
}

impl CustomFieldResource {
    /// Create the adapter.
    pub fn new(data: ProviderData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Resource for CustomFieldResource {
    type Model = CustomFieldModel;

    const TYPE_NAME: &'static str = "incident_custom_field";

    fn schema() -> Schema {
        Schema::v0()
            .with_description("Custom fields capture extra information about incidents")
            .with_attribute("id", Attribute::id())
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Human readable name for the custom field"),
            )
            .with_attribute(
                "description",
                Attribute::required_string().with_description("Description of the custom field"),
            )
            .with_attribute(
                "field_type",
                Attribute::required_string()
                    .with_description("Type of custom field. Changing it forces a new field")
                    .with_allowed_values(FIELD_TYPES)
                    .with_requires_replace(),
            )
            .with_attribute(
                "required",
                Attribute::required_string()
                    .with_description("When this custom field must be set during the incident lifecycle")
                    .with_allowed_values(REQUIRED_VALUES),
            )
            .with_attribute(
                "show_before_creation",
                Attribute::required_bool()
                    .with_description("Whether a custom field should be shown in the incident creation modal"),
            )
            .with_attribute(
                "show_before_closure",
                Attribute::required_bool()
                    .with_description("Whether a custom field should be shown in the incident close modal"),
            )
            .with_attribute(
                "show_before_update",
                Attribute::required_bool()
                    .with_description("Whether a custom field should be shown in the incident update modal"),
            )
            .with_attribute(
                "show_in_announcement_post",
                Attribute::new(AttributeType::Bool, AttributeFlags::optional_computed())
                    .with_description("Whether a custom field should be shown in the list of fields in the announcement post"),
            )
    }

    async fn create(&self, plan: CustomFieldModel) -> Result<CustomFieldModel, ProviderError> {
        let body = CreateCustomFieldRequestBody {
            name: plan.name,
            description: plan.description,
            field_type: plan.field_type,
            required: plan.required,
            show_before_creation: plan.show_before_creation,
            show_before_closure: plan.show_before_closure,
            show_before_update: plan.show_before_update,
            show_in_announcement_post: plan.show_in_announcement_post,
        };

        let field = self
            .data
            .client
            .create_custom_field(&body)
            .await
            .map_err(|err| ProviderError::client("create custom field", err))?;

        trace!(id = %field.id, "created a custom field resource");
        Ok(field.into())
    }

    async fn read(&self, id: &str) -> Result<CustomFieldModel, ProviderError> {
        let field = self
            .data
            .client
            .show_custom_field(id)
            .await
            .map_err(|err| ProviderError::client("read custom field", err))?;

        Ok(field.into())
    }

    async fn update(
        &self,
        id: &str,
        plan: CustomFieldModel,
    ) -> Result<CustomFieldModel, ProviderError> {
        let body = UpdateCustomFieldRequestBody {
            name: plan.name,
            description: plan.description,
            required: plan.required,
            show_before_creation: plan.show_before_creation,
            show_before_closure: plan.show_before_closure,
            show_before_update: plan.show_before_update,
            show_in_announcement_post: plan.show_in_announcement_post,
        };

        let field = self
            .data
            .client
            .update_custom_field(id, &body)
            .await
            .map_err(|err| ProviderError::client("update custom field", err))?;

        Ok(field.into())
    }

    async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.data
            .client
            .destroy_custom_field(id)
            .await
            .map_err(|err| ProviderError::client("delete custom field", err))
    }
}
