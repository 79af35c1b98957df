use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{non_empty, non_empty_string, ProviderData, Resource};
use crate::client::catalog::{
    CatalogAttributeBindingPayloadV2, CatalogAttributeBindingV2, CatalogAttributeValuePayloadV2,
    CatalogEntryV2, CreateEntryRequestBody, UpdateEntryRequestBody,
};
use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Block, Schema};

/// State of an `incident_catalog_entry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntryModel {
    /// Entry id.
    pub id: Option<String>,
    /// Catalog type this entry belongs to. Fixed once created.
    pub catalog_type_id: String,
    /// Human readable name of this entry.
    pub name: String,
    /// Identifier of this entry in an external system.
    pub external_id: Option<String>,
    /// Alternative names the entry can be matched by.
    pub aliases: Option<Vec<String>>,
    /// Ordering among entries of the same type.
    pub rank: Option<i64>,
    /// Values bound to the catalog type's attributes.
    pub attribute_values: Option<Vec<AttributeValueModel>>,
}

/// The value of one attribute on a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValueModel {
    /// ID of the attribute this value is for.
    pub attribute: String,
    /// Literal value, for scalar attributes.
    pub value: Option<String>,
    /// Literal values, for array attributes.
    pub array_value: Option<Vec<String>>,
}

impl AttributeValueModel {
    fn normalize(mut self) -> Self {
        self.value = non_empty_string(self.value);
        self.array_value = self.array_value.and_then(non_empty);
        self
    }

    fn is_empty(&self) -> bool {
        self.value.is_none() && self.array_value.is_none()
    }

    fn from_binding(attribute: String, binding: CatalogAttributeBindingV2) -> Self {
        let value = binding.value.and_then(|v| v.literal);
        let array_value = binding
            .array_value
            .map(|values| values.into_iter().filter_map(|v| v.literal).collect());

        Self {
            attribute,
            value,
            array_value,
        }
        .normalize()
    }

    fn into_payload(self) -> (String, CatalogAttributeBindingPayloadV2) {
        let literal = |literal| CatalogAttributeValuePayloadV2 { literal };
        let binding = CatalogAttributeBindingPayloadV2 {
            value: self.value.map(literal),
            array_value: self
                .array_value
                .map(|values| values.into_iter().map(literal).collect()),
        };
        (self.attribute, binding)
    }
}

impl From<CatalogEntryV2> for CatalogEntryModel {
    fn from(entry: CatalogEntryV2) -> Self {
        let attribute_values = entry
            .attribute_values
            .into_iter()
            .map(|(attribute, binding)| AttributeValueModel::from_binding(attribute, binding))
            .filter(|value| !value.is_empty())
            .collect();

        Self {
            id: Some(entry.id),
            catalog_type_id: entry.catalog_type_id,
            name: entry.name,
            external_id: non_empty_string(entry.external_id),
            aliases: non_empty(entry.aliases),
            rank: Some(entry.rank),
            attribute_values: non_empty(attribute_values),
        }
    }
}

impl CatalogEntryModel {
    fn attribute_payloads(&self) -> BTreeMap<String, CatalogAttributeBindingPayloadV2> {
        self.attribute_values
            .iter()
            .flatten()
            .cloned()
            .map(AttributeValueModel::normalize)
            .filter(|value| !value.is_empty())
            .map(AttributeValueModel::into_payload)
            .collect()
    }
}

/// Manages catalog entries.
#[derive(Debug, Clone)]
pub struct CatalogEntryResource {
    data: ProviderData,
}

impl CatalogEntryResource {
    /// Create the adapter.
    pub fn new(data: ProviderData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Resource for CatalogEntryResource {
    type Model = CatalogEntryModel;

    const TYPE_NAME: &'static str = "incident_catalog_entry";

    fn schema() -> Schema {
        let attribute_value = Block::new()
            .with_attribute(
                "attribute",
                Attribute::required_string().with_description("The ID of this attribute"),
            )
            .with_attribute(
                "value",
                Attribute::optional_string().with_description("The literal value of this attribute"),
            )
            .with_attribute(
                "array_value",
                Attribute::new(
                    AttributeType::list(AttributeType::String),
                    AttributeFlags::optional(),
                )
                .with_description("The literal values of this attribute, for array attributes"),
            );

        Schema::v0()
            .with_description("Catalog entries are the things in your catalog")
            .with_attribute("id", Attribute::id())
            .with_attribute(
                "catalog_type_id",
                Attribute::required_string()
                    .with_description("ID of this catalog type")
                    .with_requires_replace(),
            )
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Name is the human readable name of this entry"),
            )
            .with_attribute(
                "external_id",
                Attribute::optional_string()
                    .with_description("An optional alternative ID for this entry, which is ensured to be unique for the type"),
            )
            .with_attribute(
                "aliases",
                Attribute::new(
                    AttributeType::list(AttributeType::String),
                    AttributeFlags::optional(),
                )
                .with_description("Optional aliases that can be used to reference this entry"),
            )
            .with_attribute(
                "rank",
                Attribute::optional_computed_int64()
                    .with_description("When catalog type is ranked, this is used to help order things"),
            )
            .with_attribute(
                "attribute_values",
                Attribute::nested_set(AttributeFlags::optional(), attribute_value)
                    .with_description("Values of this entry"),
            )
    }

    /// Empty lists and blank values plan the same as unset ones, which is how
    /// the API reports them back.
    fn modify_plan(_prior: Option<&CatalogEntryModel>, mut proposed: CatalogEntryModel) -> CatalogEntryModel {
        proposed.external_id = non_empty_string(proposed.external_id);
        proposed.aliases = proposed.aliases.and_then(non_empty);
        proposed.attribute_values = proposed
            .attribute_values
            .map(|values| {
                values
                    .into_iter()
                    .map(AttributeValueModel::normalize)
                    .filter(|value| !value.is_empty())
                    .collect()
            })
            .and_then(non_empty);
        proposed
    }

    async fn create(&self, plan: CatalogEntryModel) -> Result<CatalogEntryModel, ProviderError> {
        let body = CreateEntryRequestBody {
            attribute_values: plan.attribute_payloads(),
            catalog_type_id: plan.catalog_type_id,
            name: plan.name,
            external_id: non_empty_string(plan.external_id),
            aliases: plan.aliases.unwrap_or_default(),
            rank: plan.rank,
            annotations: self.data.annotations(),
        };

        let entry = self
            .data
            .client
            .create_catalog_entry(&body)
            .await
            .map_err(|err| ProviderError::client("create catalog entry", err))?;

        trace!(id = %entry.id, "created a catalog entry resource");
        Ok(entry.into())
    }

    async fn read(&self, id: &str) -> Result<CatalogEntryModel, ProviderError> {
        let entry = self
            .data
            .client
            .show_catalog_entry(id)
            .await
            .map_err(|err| ProviderError::client("read catalog entry", err))?;

        Ok(entry.into())
    }

    async fn update(
        &self,
        id: &str,
        plan: CatalogEntryModel,
    ) -> Result<CatalogEntryModel, ProviderError> {
        let body = UpdateEntryRequestBody {
            attribute_values: plan.attribute_payloads(),
            name: plan.name,
            external_id: non_empty_string(plan.external_id),
            aliases: plan.aliases.unwrap_or_default(),
            rank: plan.rank,
            annotations: self.data.annotations(),
        };

        let entry = self
            .data
            .client
            .update_catalog_entry(id, &body)
            .await
            .map_err(|err| ProviderError::client("update catalog entry", err))?;

        Ok(entry.into())
    }

    async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.data
            .client
            .destroy_catalog_entry(id)
            .await
            .map_err(|err| ProviderError::client("delete catalog entry", err))
    }
}
