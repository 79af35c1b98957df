use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{null_as_default, ProviderData, Resource};
use crate::client::catalog::{
    CatalogTypeAttributePayloadV2, CatalogTypeAttributeV2, CatalogTypeV2,
    UpdateTypeSchemaRequestBody,
};
use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Block, Schema};

/// State of an `incident_catalog_type_attributes`. Its id is the id of the
/// catalog type whose schema it manages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTypeAttributesModel {
    /// Same as `catalog_type_id`.
    pub id: Option<String>,
    /// Catalog type whose schema is managed.
    pub catalog_type_id: String,
    /// The full attribute list.
    pub attributes: Vec<CatalogTypeAttributeModel>,
}

/// One attribute of a catalog type's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTypeAttributeModel {
    /// Attribute id, assigned by the API.
    pub id: Option<String>,
    /// Name of the attribute.
    pub name: String,
    /// Engine type of the attribute's values, e.g. `String` or another
    /// catalog type's type name.
    #[serde(rename = "type")]
    pub attribute_type: String,
    /// Whether the attribute holds a list of values.
    #[serde(default, deserialize_with = "null_as_default")]
    pub array: bool,
}

impl From<CatalogTypeAttributeV2> for CatalogTypeAttributeModel {
    fn from(attribute: CatalogTypeAttributeV2) -> Self {
        Self {
            id: Some(attribute.id),
            name: attribute.name,
            attribute_type: attribute.attribute_type,
            array: attribute.array,
        }
    }
}

impl From<CatalogTypeAttributeModel> for CatalogTypeAttributePayloadV2 {
    fn from(model: CatalogTypeAttributeModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            attribute_type: model.attribute_type,
            array: model.array,
        }
    }
}

impl From<CatalogTypeV2> for CatalogTypeAttributesModel {
    fn from(catalog_type: CatalogTypeV2) -> Self {
        Self {
            id: Some(catalog_type.id.clone()),
            catalog_type_id: catalog_type.id,
            attributes: catalog_type
                .schema
                .attributes
                .into_iter()
                .map(CatalogTypeAttributeModel::from)
                .collect(),
        }
    }
}

/// Manages the attribute schema of a catalog type as a whole.
#[derive(Debug, Clone)]
pub struct CatalogTypeAttributesResource {
    data: ProviderData,
}

impl CatalogTypeAttributesResource {
    /// Create the adapter.
    pub fn new(data: ProviderData) -> Self {
        Self { data }
    }

    /// Replace the schema of a catalog type with `attributes`, at the schema
    /// version the API currently reports.
    async fn replace_schema(
        &self,
        catalog_type_id: &str,
        attributes: Vec<CatalogTypeAttributePayloadV2>,
        action: &str,
    ) -> Result<CatalogTypeV2, ProviderError> {
        let client = &self.data.client;

        let current = client
            .show_catalog_type(catalog_type_id)
            .await
            .map_err(|err| ProviderError::client(action, err))?;

        debug!(
            catalog_type_id,
            version = current.schema.version,
            attributes = attributes.len(),
            "replacing catalog type schema"
        );

        let body = UpdateTypeSchemaRequestBody {
            version: current.schema.version,
            attributes,
        };
        client
            .update_catalog_type_schema(catalog_type_id, &body)
            .await
            .map_err(|err| ProviderError::client(action, err))
    }
}

#[async_trait]
impl Resource for CatalogTypeAttributesResource {
    type Model = CatalogTypeAttributesModel;

    const TYPE_NAME: &'static str = "incident_catalog_type_attributes";

    fn schema() -> Schema {
        let attribute = Block::new()
            .with_attribute(
                "id",
                Attribute::new(AttributeType::String, AttributeFlags::optional_computed())
                    .with_description("The ID of this attribute"),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("The name of this attribute"),
            )
            .with_attribute(
                "type",
                Attribute::required_string()
                    .with_description("The type of this attribute, e.g. String or a catalog type name"),
            )
            .with_attribute(
                "array",
                Attribute::optional_bool()
                    .with_description("Whether or not this attribute is an array"),
            );

        Schema::v0()
            .with_description("Manages the full attribute schema of a catalog type")
            .with_attribute("id", Attribute::id())
            .with_attribute(
                "catalog_type_id",
                Attribute::required_string()
                    .with_description("ID of the catalog type whose schema is managed")
                    .with_requires_replace(),
            )
            .with_attribute(
                "attributes",
                Attribute::nested_set(AttributeFlags::required(), attribute)
                    .with_description("The attributes of this catalog type"),
            )
    }

    /// Attributes keep their id across plans; configuration names them, the
    /// API numbers them.
    fn modify_plan(
        prior: Option<&CatalogTypeAttributesModel>,
        mut proposed: CatalogTypeAttributesModel,
    ) -> CatalogTypeAttributesModel {
        let Some(prior) = prior else {
            return proposed;
        };

        for attribute in proposed.attributes.iter_mut().filter(|a| a.id.is_none()) {
            attribute.id = prior
                .attributes
                .iter()
                .find(|known| known.name == attribute.name)
                .and_then(|known| known.id.clone());
        }
        proposed
    }

    async fn create(
        &self,
        plan: CatalogTypeAttributesModel,
    ) -> Result<CatalogTypeAttributesModel, ProviderError> {
        let attributes: Vec<CatalogTypeAttributePayloadV2> =
            plan.attributes.into_iter().map(Into::into).collect();
        let catalog_type = self
            .replace_schema(&plan.catalog_type_id, attributes, "create catalog type attributes")
            .await?;

        trace!(id = %catalog_type.id, "created a catalog type attributes resource");
        Ok(catalog_type.into())
    }

    async fn read(&self, id: &str) -> Result<CatalogTypeAttributesModel, ProviderError> {
        let catalog_type = self
            .data
            .client
            .show_catalog_type(id)
            .await
            .map_err(|err| ProviderError::client("read catalog type attributes", err))?;

        Ok(catalog_type.into())
    }

    async fn update(
        &self,
        id: &str,
        plan: CatalogTypeAttributesModel,
    ) -> Result<CatalogTypeAttributesModel, ProviderError> {
        let attributes: Vec<CatalogTypeAttributePayloadV2> =
            plan.attributes.into_iter().map(Into::into).collect();
        let catalog_type = self
            .replace_schema(id, attributes, "update catalog type attributes")
            .await?;

        Ok(catalog_type.into())
    }

    async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.replace_schema(id, Vec::new(), "delete catalog type attributes")
            .await?;
        Ok(())
    }
}
