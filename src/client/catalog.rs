//! Catalog V2: catalog types, their attribute schema, and catalog entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{segment, ApiError, Client};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTypeV2 {
    pub id: String,
    pub name: String,
    pub description: String,
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_repo_url: Option<String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub schema: CatalogTypeSchemaV2,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogTypeSchemaV2 {
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub attributes: Vec<CatalogTypeAttributeV2>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTypeAttributeV2 {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: String,
    #[serde(default)]
    pub array: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTypeRequestBody {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_repo_url: Option<String>,
    pub annotations: BTreeMap<String, String>,
}

/// The type name is fixed at creation, so it has no place here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateTypeRequestBody {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_repo_url: Option<String>,
    pub annotations: BTreeMap<String, String>,
}

/// Replaces the full attribute list. `version` must match the schema
/// version the caller last saw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateTypeSchemaRequestBody {
    pub version: i64,
    pub attributes: Vec<CatalogTypeAttributePayloadV2>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogTypeAttributePayloadV2 {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: String,
    pub array: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogTypeResponseBody {
    pub catalog_type: CatalogTypeV2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntryV2 {
    pub id: String,
    pub catalog_type_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub attribute_values: BTreeMap<String, CatalogAttributeBindingV2>,
}

/// The value bound to one attribute of an entry: a single value for scalar
/// attributes, a list for array attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogAttributeBindingV2 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CatalogAttributeValueV2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_value: Option<Vec<CatalogAttributeValueV2>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogAttributeValueV2 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogAttributeBindingPayloadV2 {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<CatalogAttributeValuePayloadV2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_value: Option<Vec<CatalogAttributeValuePayloadV2>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogAttributeValuePayloadV2 {
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateEntryRequestBody {
    pub catalog_type_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    pub attribute_values: BTreeMap<String, CatalogAttributeBindingPayloadV2>,
    pub annotations: BTreeMap<String, String>,
}

/// Entries cannot move between catalog types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateEntryRequestBody {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    pub attribute_values: BTreeMap<String, CatalogAttributeBindingPayloadV2>,
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntryResponseBody {
    pub catalog_entry: CatalogEntryV2,
}

impl Client {
    pub async fn create_catalog_type(
        &self,
        body: &CreateTypeRequestBody,
    ) -> Result<CatalogTypeV2, ApiError> {
        let response: CatalogTypeResponseBody = self.post("/v2/catalog_types", body).await?;
        Ok(response.catalog_type)
    }

    pub async fn show_catalog_type(&self, id: &str) -> Result<CatalogTypeV2, ApiError> {
        let response: CatalogTypeResponseBody = self
            .get(&format!("/v2/catalog_types/{}", segment(id)))
            .await?;
        Ok(response.catalog_type)
    }

    pub async fn update_catalog_type(
        &self,
        id: &str,
        body: &UpdateTypeRequestBody,
    ) -> Result<CatalogTypeV2, ApiError> {
        let response: CatalogTypeResponseBody = self
            .put(&format!("/v2/catalog_types/{}", segment(id)), body)
            .await?;
        Ok(response.catalog_type)
    }

    pub async fn destroy_catalog_type(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/v2/catalog_types/{}", segment(id)))
            .await
    }

    pub async fn update_catalog_type_schema(
        &self,
        id: &str,
        body: &UpdateTypeSchemaRequestBody,
    ) -> Result<CatalogTypeV2, ApiError> {
        let response: CatalogTypeResponseBody = self
            .post(
                &format!("/v2/catalog_types/{}/actions/update_schema", segment(id)),
                body,
            )
            .await?;
        Ok(response.catalog_type)
    }

    pub async fn create_catalog_entry(
        &self,
        body: &CreateEntryRequestBody,
    ) -> Result<CatalogEntryV2, ApiError> {
        let response: CatalogEntryResponseBody = self.post("/v2/catalog_entries", body).await?;
        Ok(response.catalog_entry)
    }

    pub async fn show_catalog_entry(&self, id: &str) -> Result<CatalogEntryV2, ApiError> {
        let response: CatalogEntryResponseBody = self
            .get(&format!("/v2/catalog_entries/{}", segment(id)))
            .await?;
        Ok(response.catalog_entry)
    }

    pub async fn update_catalog_entry(
        &self,
        id: &str,
        body: &UpdateEntryRequestBody,
    ) -> Result<CatalogEntryV2, ApiError> {
        let response: CatalogEntryResponseBody = self
            .put(&format!("/v2/catalog_entries/{}", segment(id)), body)
            .await?;
        Ok(response.catalog_entry)
    }

    pub async fn destroy_catalog_entry(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/v2/catalog_entries/{}", segment(id)))
            .await
    }
}
