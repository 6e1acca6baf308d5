//! Compute kinds: instances, autoscaling groups, launch templates, EMR

use super::strip_nested;
use crate::aws_cli::AwsApi;
use crate::error::Result as AwsResult;
use crate::tags::{items, name_tag, str_field, tag_value};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tfsync_cloud::{CatalogEntry, ResourceKind, Result};
use tfsync_core::normalize_identity;

const ASG_TAG: &str = "aws:autoscaling:groupName";

/// Drop the template id when the template is also referenced by name
fn prefer_template_name(attributes: &mut Map<String, Value>) {
    let Some(Value::Array(templates)) = attributes.get_mut("launch_template") else {
        return;
    };
    if let Some(Value::Object(template)) = templates.first_mut() {
        if template.contains_key("id") && template.contains_key("name") {
            template.shift_remove("id");
        }
    }
}

pub struct Asg {
    api: Arc<dyn AwsApi>,
}

impl Asg {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Asg {
    fn name(&self) -> &str {
        "asg"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_autoscaling_group"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self
            .api
            .call("autoscaling", "describe-auto-scaling-groups", &[])
            .await?;
        Ok(asg_entries(&resp)?)
    }

    async fn amend_attributes(
        &self,
        _resource_type: &str,
        _resource_name: &str,
        attributes: &mut Map<String, Value>,
    ) -> Result<()> {
        prefer_template_name(attributes);
        Ok(())
    }
}

fn asg_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    items(resp, "AutoScalingGroups")?
        .iter()
        .map(|item| {
            let name = str_field(item, "AutoScalingGroupName")?;
            Ok(CatalogEntry::new("aws_autoscaling_group", name, name).with_raw(item))
        })
        .collect()
}

pub struct LaunchTemplate {
    api: Arc<dyn AwsApi>,
}

impl LaunchTemplate {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for LaunchTemplate {
    fn name(&self) -> &str {
        "launch_template"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_launch_template"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("ec2", "describe-launch-templates", &[]).await?;
        Ok(launch_template_entries(&resp)?)
    }

    async fn amend_attributes(
        &self,
        _resource_type: &str,
        _resource_name: &str,
        attributes: &mut Map<String, Value>,
    ) -> Result<()> {
        prefer_template_name(attributes);
        Ok(())
    }
}

fn launch_template_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    items(resp, "LaunchTemplates")?
        .iter()
        .map(|item| {
            let id = str_field(item, "LaunchTemplateId")?;
            Ok(CatalogEntry::new("aws_launch_template", id, id).with_raw(item))
        })
        .collect()
}

/// Stand-alone EC2 instances. Instances owned by an autoscaling group are
/// left to that group.
pub struct Ec2 {
    api: Arc<dyn AwsApi>,
}

impl Ec2 {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Ec2 {
    fn name(&self) -> &str {
        "ec2"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_instance"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("ec2", "describe-instances", &[]).await?;
        let (entries, managed) = instance_entries(&resp)?;
        for (group, count) in managed {
            tracing::info!("skipped {} instances managed by autoscaling group {}", count, group);
        }
        Ok(entries)
    }

    async fn amend_attributes(
        &self,
        resource_type: &str,
        _resource_name: &str,
        attributes: &mut Map<String, Value>,
    ) -> Result<()> {
        if resource_type == "aws_instance" {
            strip_nested(attributes, "ebs_block_device", "volume_id");
            strip_nested(attributes, "root_block_device", "volume_id");
        }
        Ok(())
    }
}

/// Entries for unmanaged instances, plus the instance count per
/// autoscaling group that was skipped
fn instance_entries(resp: &Value) -> AwsResult<(Vec<CatalogEntry>, BTreeMap<String, usize>)> {
    let mut entries = Vec::new();
    let mut managed = BTreeMap::new();

    for reservation in items(resp, "Reservations")? {
        for instance in items(reservation, "Instances")? {
            let id = str_field(instance, "InstanceId")?;
            if let Some(group) = tag_value(instance.get("Tags"), ASG_TAG) {
                *managed.entry(group.to_string()).or_insert(0) += 1;
                continue;
            }
            let name = name_tag(instance).map(normalize_identity).unwrap_or_else(|| id.to_string());
            entries.push(CatalogEntry::new("aws_instance", name, id).with_raw(instance));
        }
    }

    Ok((entries, managed))
}

pub struct Emr {
    api: Arc<dyn AwsApi>,
}

impl Emr {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Emr {
    fn name(&self) -> &str {
        "emr"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_emr_cluster"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("emr", "list-clusters", &["--active"]).await?;
        Ok(emr_entries(&resp)?)
    }

    async fn amend_attributes(
        &self,
        _resource_type: &str,
        _resource_name: &str,
        attributes: &mut Map<String, Value>,
    ) -> Result<()> {
        strip_nested(attributes, "master_instance_group", "id");
        strip_nested(attributes, "core_instance_group", "id");
        Ok(())
    }
}

fn emr_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    items(resp, "Clusters")?
        .iter()
        .map(|item| {
            let id = str_field(item, "Id")?;
            let name = str_field(item, "Name")?;
            Ok(CatalogEntry::new("aws_emr_cluster", normalize_identity(name), id).with_raw(item))
        })
        .collect()
}
