//! Resource catalog trait definition

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attributes every kind drops by default: values the provider computes and
/// configuration cannot set
pub const COMPUTED_ATTRIBUTES: [&str; 4] = ["id", "arn", "owner_id", "unique_id"];

/// One kind of cloud resource (buckets, VPCs, alarms, ...).
///
/// Each kind enumerates its live resources and decides how their recorded
/// state is turned back into configuration.
#[async_trait]
pub trait ResourceKind: Send + Sync {
    /// Registry name, also used as the output sub-directory (e.g. "s3")
    fn name(&self) -> &str;

    /// Terraform resource types this kind may produce
    fn included_resource_types(&self) -> &[&str];

    /// Enumerate live resources.
    ///
    /// Every call queries the source again; results and their order may
    /// differ between calls.
    async fn list_all(&self) -> Result<Vec<CatalogEntry>>;

    /// Whether an attribute recorded in state should be left out of the
    /// generated configuration
    fn ignore_attribute(&self, key: &str, _value: &Value) -> bool {
        COMPUTED_ATTRIBUTES.contains(&key)
    }

    /// Adjust a resource's attributes before rendering
    async fn amend_attributes(
        &self,
        _resource_type: &str,
        _resource_name: &str,
        _attributes: &mut Map<String, Value>,
    ) -> Result<()> {
        Ok(())
    }
}

/// A resource found by [`ResourceKind::list_all`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Terraform resource type (e.g. "aws_vpc")
    pub resource_type: String,

    /// Configuration name of the resource
    pub resource_name: String,

    /// Provider-side identifier used for import; may be empty
    pub resource_id: String,

    /// Raw listing data as returned by the cloud API
    #[serde(default)]
    pub raw_attributes: Map<String, Value>,
}

impl CatalogEntry {
    pub fn new(
        resource_type: impl Into<String>,
        resource_name: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_name: resource_name.into(),
            resource_id: resource_id.into(),
            raw_attributes: Map::new(),
        }
    }

    /// Attach the raw API object, when it is a JSON object
    pub fn with_raw(mut self, raw: &Value) -> Self {
        if let Value::Object(map) = raw {
            self.raw_attributes = map.clone();
        }
        self
    }

    /// `<type>.<name>` terraform address
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.resource_name)
    }

    /// Identifier passed to `terraform import`, falling back to the name
    pub fn import_id(&self) -> &str {
        if self.resource_id.is_empty() {
            &self.resource_name
        } else {
            &self.resource_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_address_and_import_id() {
        let entry = CatalogEntry::new("aws_s3_bucket", "logs", "");
        assert_eq!(entry.address(), "aws_s3_bucket.logs");
        assert_eq!(entry.import_id(), "logs");

        let entry = CatalogEntry::new("aws_vpc", "main", "vpc-123");
        assert_eq!(entry.import_id(), "vpc-123");
    }

    #[test]
    fn test_entry_with_raw() {
        let entry = CatalogEntry::new("aws_vpc", "main", "vpc-123")
            .with_raw(&json!({"VpcId": "vpc-123", "IsDefault": false}));
        assert_eq!(entry.raw_attributes["VpcId"], json!("vpc-123"));

        let entry = CatalogEntry::new("aws_vpc", "main", "vpc-123").with_raw(&json!("scalar"));
        assert!(entry.raw_attributes.is_empty());
    }
}
