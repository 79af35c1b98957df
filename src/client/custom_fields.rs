//! Custom fields and the options of select-type custom fields (API v1).

use serde::{Deserialize, Serialize};

use super::{segment, ApiError, Client};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldV1 {
    pub id: String,
    pub name: String,
    pub description: String,
    pub field_type: String,
    pub required: String,
    pub show_before_creation: bool,
    pub show_before_closure: bool,
    pub show_before_update: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_in_announcement_post: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateCustomFieldRequestBody {
    pub name: String,
    pub description: String,
    pub field_type: String,
    pub required: String,
    pub show_before_creation: bool,
    pub show_before_closure: bool,
    pub show_before_update: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_announcement_post: Option<bool>,
}

/// A field's type is fixed once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateCustomFieldRequestBody {
    pub name: String,
    pub description: String,
    pub required: String,
    pub show_before_creation: bool,
    pub show_before_closure: bool,
    pub show_before_update: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_announcement_post: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomFieldResponseBody {
    pub custom_field: CustomFieldV1,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldOptionV1 {
    pub id: String,
    pub custom_field_id: String,
    pub value: String,
    pub sort_key: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateCustomFieldOptionRequestBody {
    pub custom_field_id: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateCustomFieldOptionRequestBody {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomFieldOptionResponseBody {
    pub custom_field_option: CustomFieldOptionV1,
}

impl Client {
    pub async fn create_custom_field(
        &self,
        body: &CreateCustomFieldRequestBody,
    ) -> Result<CustomFieldV1, ApiError> {
        let response: CustomFieldResponseBody = self.post("/v1/custom_fields", body).await?;
        Ok(response.custom_field)
    }

    pub async fn show_custom_field(&self, id: &str) -> Result<CustomFieldV1, ApiError> {
        let response: CustomFieldResponseBody = self
            .get(&format!("/v1/custom_fields/{}", segment(id)))
            .await?;
        Ok(response.custom_field)
    }

    pub async fn update_custom_field(
        &self,
        id: &str,
        body: &UpdateCustomFieldRequestBody,
    ) -> Result<CustomFieldV1, ApiError> {
        let response: CustomFieldResponseBody = self
            .put(&format!("/v1/custom_fields/{}", segment(id)), body)
            .await?;
        Ok(response.custom_field)
    }

    pub async fn destroy_custom_field(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/v1/custom_fields/{}", segment(id)))
            .await
    }

    pub async fn create_custom_field_option(
        &self,
        body: &CreateCustomFieldOptionRequestBody,
    ) -> Result<CustomFieldOptionV1, ApiError> {
        let response: CustomFieldOptionResponseBody =
            self.post("/v1/custom_field_options", body).await?;
        Ok(response.custom_field_option)
    }

    pub async fn show_custom_field_option(
        &self,
        id: &str,
    ) -> Result<CustomFieldOptionV1, ApiError> {
        let response: CustomFieldOptionResponseBody = self
            .get(&format!("/v1/custom_field_options/{}", segment(id)))
            .await?;
        Ok(response.custom_field_option)
    }

    pub async fn update_custom_field_option(
        &self,
        id: &str,
        body: &UpdateCustomFieldOptionRequestBody,
    ) -> Result<CustomFieldOptionV1, ApiError> {
        let response: CustomFieldOptionResponseBody = self
            .put(&format!("/v1/custom_field_options/{}", segment(id)), body)
            .await?;
        Ok(response.custom_field_option)
    }

    pub async fn destroy_custom_field_option(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/v1/custom_field_options/{}", segment(id)))
            .await
    }
}
