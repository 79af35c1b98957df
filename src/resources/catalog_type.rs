use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{non_empty_string, ProviderData, Resource};
use crate::client::catalog::{CatalogTypeV2, CreateTypeRequestBody, UpdateTypeRequestBody};
use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};

/// State of an `incident_catalog_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTypeModel {
    /// Catalog type id.
    pub id: Option<String>,
    /// Name of this catalog type.
    pub name: String,
    /// Name used in the engine to refer to this type. Derived from `name`
    /// when unset, and fixed once created.
    pub type_name: Option<String>,
    /// Human readable description of this type.
    pub description: String,
    /// Repository where this type is managed, if any.
    pub source_repo_url: Option<String>,
}

impl From<CatalogTypeV2> for CatalogTypeModel {
    fn from(catalog_type: CatalogTypeV2) -> Self {
        Self {
            id: Some(catalog_type.id),
            name: catalog_type.name,
            type_name: Some(catalog_type.type_name),
            description: catalog_type.description,
            source_repo_url: catalog_type.source_repo_url,
        }
    }
}

/// Manages catalog types.
#[derive(Debug, Clone)]
pub struct CatalogTypeResource {
    data: ProviderData,
}

impl CatalogTypeResource {
    /// Create the adapter.
    pub fn new(data: ProviderData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Resource for CatalogTypeResource {
    type Model = CatalogTypeModel;

    const TYPE_NAME: &'static str = "incident_catalog_type";

    fn schema() -> Schema {
        Schema::v0()
            .with_description("Catalog types describe the kinds of things in your catalog")
            .with_attribute("id", Attribute::id())
            .with_attribute(
                "name",
                Attribute::required_string().with_description("Name is the human readable name of this type"),
            )
            .with_attribute(
                "type_name",
                Attribute::new(AttributeType::String, AttributeFlags::optional_computed())
                    .with_description(
                        "Type name used to refer to this catalog type. Derived from the name \
                         when not set, and cannot be changed once created",
                    )
                    .with_requires_replace(),
            )
            .with_attribute(
                "description",
                Attribute::required_string()
                    .with_description("Human readable description of this type"),
            )
            .with_attribute(
                "source_repo_url",
                Attribute::optional_string().with_description(
                    "The url of the external repository where this type is managed. When set, \
                     users will not be able to edit the catalog type (or its entries) via the \
                     UI, and will instead be provided a link to this URL.",
                ),
            )
    }

    /// A blank repository URL is never sent, so it plans the same as unset.
    fn modify_plan(_prior: Option<&CatalogTypeModel>, mut proposed: CatalogTypeModel) -> CatalogTypeModel {
        proposed.source_repo_url = non_empty_string(proposed.source_repo_url);
        proposed
    }

    async fn create(&self, plan: CatalogTypeModel) -> Result<CatalogTypeModel, ProviderError> {
        let body = CreateTypeRequestBody {
            name: plan.name,
            description: plan.description,
            type_name: non_empty_string(plan.type_name),
            source_repo_url: non_empty_string(plan.source_repo_url),
            annotations: self.data.annotations(),
        };

        let catalog_type = self
            .data
            .client
            .create_catalog_type(&body)
            .await
            .map_err(|err| ProviderError::client("create catalog type", err))?;

        trace!(id = %catalog_type.id, "created a catalog type resource");
        Ok(catalog_type.into())
    }

    async fn read(&self, id: &str) -> Result<CatalogTypeModel, ProviderError> {
        let catalog_type = self
            .data
            .client
            .show_catalog_type(id)
            .await
            .map_err(|err| ProviderError::client("read catalog type", err))?;

        Ok(catalog_type.into())
    }

    async fn update(
        &self,
        id: &str,
        plan: CatalogTypeModel,
    ) -> Result<CatalogTypeModel, ProviderError> {
        let body = UpdateTypeRequestBody {
            name: plan.name,
            description: plan.description,
            source_repo_url: non_empty_string(plan.source_repo_url),
            annotations: self.data.annotations(),
        };

        let catalog_type = self
            .data
            .client
            .update_catalog_type(id, &body)
            .await
            .map_err(|err| ProviderError::client("update catalog type", err))?;

        Ok(catalog_type.into())
    }

    async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        self.data
            .client
            .destroy_catalog_type(id)
            .await
            .map_err(|err| ProviderError::client("delete catalog type", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_model_only_sets_repo_url_when_present() {
        let catalog_type = CatalogTypeV2 {
            id: "01T".to_string(),
            name: "Team".to_string(),
            description: "Owning team".to_string(),
            type_name: "Custom[\"Team\"]".to_string(),
            source_repo_url: None,
            annotations: BTreeMap::new(),
            schema: Default::default(),
        };

        let model = CatalogTypeModel::from(catalog_type);
        assert_eq!(model.type_name.as_deref(), Some("Custom[\"Team\"]"));
        assert!(model.source_repo_url.is_none());
    }

    #[test]
    fn test_modify_plan_drops_blank_repo_url() {
        let proposed = CatalogTypeModel {
            id: None,
            name: "Team".to_string(),
            type_name: None,
            description: "Owning team".to_string(),
            source_repo_url: Some(String::new()),
        };

        let planned = CatalogTypeResource::modify_plan(None, proposed.clone());
        assert!(planned.source_repo_url.is_none());

        let kept = CatalogTypeModel {
            source_repo_url: Some("https://github.com/acme/catalog".to_string()),
            ..proposed
        };
        let planned = CatalogTypeResource::modify_plan(None, kept.clone());
        assert_eq!(planned, kept);
    }

    #[test]
    fn test_type_name_is_optional_computed_and_replaces() {
        let schema = CatalogTypeResource::schema();
        let type_name = schema.attribute("type_name").unwrap();

        assert!(type_name.flags.optional && type_name.flags.computed);
        assert!(type_name.requires_replace);
    }
}
