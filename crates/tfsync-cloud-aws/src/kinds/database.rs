//! ElastiCache and RDS kinds

use crate::aws_cli::AwsApi;
use crate::error::Result as AwsResult;
use crate::tags::{items, str_field};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tfsync_cloud::{CatalogEntry, ResourceKind, Result};

/// Entries named and imported by the same field
fn named_entries(
    resp: &Value,
    list_key: &str,
    name_key: &str,
    resource_type: &str,
) -> AwsResult<Vec<CatalogEntry>> {
    items(resp, list_key)?
        .iter()
        .map(|item| {
            let name = str_field(item, name_key)?;
            Ok(CatalogEntry::new(resource_type, name, name).with_raw(item))
        })
        .collect()
}

/// ElastiCache clusters and subnet groups
pub struct Ecc {
    api: Arc<dyn AwsApi>,
}

impl Ecc {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Ecc {
    fn name(&self) -> &str {
        "ecc"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_elasticache_cluster", "aws_elasticache_subnet_group"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let clusters = self
            .api
            .call("elasticache", "describe-cache-clusters", &[])
            .await?;
        let groups = self
            .api
            .call("elasticache", "describe-cache-subnet-groups", &[])
            .await?;

        let mut entries = named_entries(
            &clusters,
            "CacheClusters",
            "CacheClusterId",
            "aws_elasticache_cluster",
        )?;
        entries.extend(named_entries(
            &groups,
            "CacheSubnetGroups",
            "CacheSubnetGroupName",
            "aws_elasticache_subnet_group",
        )?);
        Ok(entries)
    }
}

/// RDS instances and subnet groups.
///
/// Parameter groups are not listed: their names often fail the provider's
/// lowercase-only validation.
pub struct Rds {
    api: Arc<dyn AwsApi>,
}

impl Rds {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Rds {
    fn name(&self) -> &str {
        "rds"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_db_instance", "aws_db_subnet_group", "aws_db_parameter_group"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let instances = self.api.call("rds", "describe-db-instances", &[]).await?;
        let groups = self.api.call("rds", "describe-db-subnet-groups", &[]).await?;

        let mut entries = named_entries(
            &instances,
            "DBInstances",
            "DBInstanceIdentifier",
            "aws_db_instance",
        )?;
        entries.extend(named_entries(
            &groups,
            "DBSubnetGroups",
            "DBSubnetGroupName",
            "aws_db_subnet_group",
        )?);
        Ok(entries)
    }
}
