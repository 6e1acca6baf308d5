//! S3 kind

use crate::aws_cli::AwsApi;
use crate::tags::{items, str_field};
use async_trait::async_trait;
use std::sync::Arc;
use tfsync_cloud::{CatalogEntry, ResourceKind, Result};

pub struct S3 {
    api: Arc<dyn AwsApi>,
}

impl S3 {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for S3 {
    fn name(&self) -> &str {
        "s3"
    }

    fn included_resource_types(&self) -> &[&str] {
        &[
            "aws_s3_bucket",
            "aws_s3_bucket_analytics_configuration",
            "aws_s3_bucket_policy",
            "aws_s3_bucket_public_access_block",
            "aws_s3_bucket_object",
            "aws_s3_bucket_notification",
            "aws_s3_bucket_metric",
            "aws_s3_bucket_inventory",
        ]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("s3api", "list-buckets", &[]).await?;
        let mut entries = Vec::new();
        for bucket in items(&resp, "Buckets")? {
            let name = str_field(bucket, "Name")?;
            entries.push(CatalogEntry::new("aws_s3_bucket", name, name).with_raw(bucket));
        }
        Ok(entries)
    }
}
