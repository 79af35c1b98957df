//! Plain Rust views of the values exchanged with the host.
//!
//! The wire messages carry JSON documents as bytes; these types hold the
//! decoded values and convert to and from the generated messages.

use serde::{Deserialize, Serialize};

/// A change to a single top-level attribute during a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// The name of the attribute that changed.
    pub path: String,
    /// The value before the change, None if the attribute was unset.
    pub before: Option<serde_json::Value>,
    /// The value after the change, None if the attribute becomes unset.
    pub after: Option<serde_json::Value>,
}

impl AttributeChange {
    /// Create a new attribute change.
    pub fn new(
        path: impl Into<String>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// Create a change for an attribute that gains a value.
    pub fn added(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// Create a change for an attribute that loses its value.
    pub fn removed(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// Create a change for an attribute whose value differs.
    pub fn modified(
        path: impl Into<String>,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

fn decode_optional(bytes: &[u8]) -> Option<serde_json::Value> {
    if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice(bytes).ok()
    }
}

fn encode_optional(value: Option<serde_json::Value>) -> Vec<u8> {
    value
        .map(|v| serde_json::to_vec(&v).unwrap_or_default())
        .unwrap_or_default()
}

impl From<crate::generated::AttributeChange> for AttributeChange {
    fn from(proto: crate::generated::AttributeChange) -> Self {
        Self {
            path: proto.path,
            before: decode_optional(&proto.before),
            after: decode_optional(&proto.after),
        }
    }
}

impl From<AttributeChange> for crate::generated::AttributeChange {
    fn from(change: AttributeChange) -> Self {
        Self {
            path: change.path,
            before: encode_optional(change.before),
            after: encode_optional(change.after),
        }
    }
}

/// The result of a plan operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The planned state after the operation. `null` when the resource is
    /// planned for deletion.
    pub planned_state: serde_json::Value,
    /// The list of attribute changes.
    pub changes: Vec<AttributeChange>,
    /// Whether the resource must be destroyed and created again.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Create a plan result with no changes.
    pub fn no_change(state: serde_json::Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// Create a plan result with changes.
    pub fn with_changes(
        planned_state: serde_json::Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    /// Whether applying this plan would do anything.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// A resource brought under management by import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// The resource type.
    pub resource_type: String,
    /// The imported state. Only `id` is populated until the next read.
    pub state: serde_json::Value,
}

impl ImportedResource {
    /// Create a new imported resource.
    pub fn new(resource_type: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Provider metadata returned by GetMetadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// List of resource type names.
    pub resources: Vec<String>,
    /// List of data source type names.
    pub data_sources: Vec<String>,
}

/// Version of the plugin handshake itself.
pub const CORE_PROTOCOL_VERSION: u32 = 1;

/// Version of the provider protocol served over gRPC.
pub const PROTOCOL_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_change_constructors() {
        let added = AttributeChange::added("name", json!("Engineering"));
        assert!(added.before.is_none());
        assert_eq!(added.after, Some(json!("Engineering")));

        let removed = AttributeChange::removed("aliases", json!(["eng"]));
        assert_eq!(removed.before, Some(json!(["eng"])));
        assert!(removed.after.is_none());

        let modified = AttributeChange::modified("rank", json!(1), json!(2));
        assert_eq!(modified.before, Some(json!(1)));
        assert_eq!(modified.after, Some(json!(2)));
    }

    #[test]
    fn test_attribute_change_conversion() {
        let change = AttributeChange::modified("name", json!("Minor"), json!("Major"));

        let proto: crate::generated::AttributeChange = change.clone().into();
        assert_eq!(proto.path, "name");
        assert_eq!(proto.before, br#""Minor""#.to_vec());

        let back: AttributeChange = proto.into();
        assert_eq!(back, change);
    }

    #[test]
    fn test_attribute_change_absent_side_is_empty_bytes() {
        let proto: crate::generated::AttributeChange =
            AttributeChange::added("description", json!("new")).into();
        assert!(proto.before.is_empty());

        let back: AttributeChange = proto.into();
        assert!(back.before.is_none());
    }

    #[test]
    fn test_plan_result() {
        let no_change = PlanResult::no_change(json!({"id": "01H"}));
        assert!(!no_change.has_changes());
        assert!(!no_change.requires_replace);

        let with_changes = PlanResult::with_changes(
            json!({"id": "01H", "name": "Major"}),
            vec![AttributeChange::modified("name", json!("Minor"), json!("Major"))],
            false,
        );
        assert!(with_changes.has_changes());
    }

    #[test]
    fn test_imported_resource() {
        let imported = ImportedResource::new("incident_severity", json!({"id": "01H"}));
        assert_eq!(imported.resource_type, "incident_severity");
        assert_eq!(imported.state["id"], "01H");
    }
}
