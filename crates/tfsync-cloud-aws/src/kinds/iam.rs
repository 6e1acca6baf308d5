//! IAM kinds: groups and roles with their policies

use crate::aws_cli::AwsApi;
use crate::error::Result as AwsResult;
use crate::tags::{items, str_field};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tfsync_cloud::{CatalogEntry, ResourceKind, Result};
use tfsync_core::normalize_identity;

/// Names of customer managed policies; AWS managed ones are not imported
async fn local_policies(api: &dyn AwsApi) -> AwsResult<HashSet<String>> {
    let resp = api.call("iam", "list-policies", &["--scope", "Local"]).await?;
    items(&resp, "Policies")?
        .iter()
        .map(|p| str_field(p, "PolicyName").map(str::to_string))
        .collect()
}

/// Attachment entry plus the policy itself when it is customer managed
fn attachment_entries(
    attached: &Value,
    owner: &str,
    attachment_type: &str,
    local: &HashSet<String>,
) -> AwsResult<Vec<CatalogEntry>> {
    let mut entries = Vec::new();
    for policy in items(attached, "AttachedPolicies")? {
        let name = str_field(policy, "PolicyName")?;
        let arn = str_field(policy, "PolicyArn")?;
        entries.push(CatalogEntry::new(
            attachment_type,
            normalize_identity(&format!("{owner}-{name}")),
            format!("{owner}/{arn}"),
        ));
        if local.contains(name) {
            entries.push(CatalogEntry::new("aws_iam_policy", normalize_identity(name), arn));
        }
    }
    Ok(entries)
}

/// IAM groups, inline and attached group policies
pub struct Group {
    api: Arc<dyn AwsApi>,
}

impl Group {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Group {
    fn name(&self) -> &str {
        "iam"
    }

    fn included_resource_types(&self) -> &[&str] {
        &[
            "aws_iam_group",
            "aws_iam_group_policy",
            "aws_iam_group_policy_attachment",
            "aws_iam_group_membership",
            "aws_iam_policy",
        ]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let api = self.api.as_ref();
        let local = local_policies(api).await?;
        let groups = api.call("iam", "list-groups", &[]).await?;

        let mut entries = Vec::new();
        for group in items(&groups, "Groups")? {
            let group_name = str_field(group, "GroupName")?;
            entries.push(CatalogEntry::new("aws_iam_group", group_name, group_name).with_raw(group));

            let inline = api
                .call("iam", "list-group-policies", &["--group-name", group_name])
                .await?;
            for policy in items(&inline, "PolicyNames")? {
                let Some(policy) = policy.as_str() else {
                    continue;
                };
                entries.push(CatalogEntry::new(
                    "aws_iam_group_policy",
                    normalize_identity(&format!("{group_name}_{policy}")),
                    format!("{group_name}:{policy}"),
                ));
            }

            let attached = api
                .call("iam", "list-attached-group-policies", &["--group-name", group_name])
                .await?;
            entries.extend(attachment_entries(
                &attached,
                group_name,
                "aws_iam_group_policy_attachment",
                &local,
            )?);
        }
        Ok(entries)
    }

    async fn amend_attributes(
        &self,
        resource_type: &str,
        resource_name: &str,
        attributes: &mut Map<String, Value>,
    ) -> Result<()> {
        if resource_type != "aws_iam_group_membership" {
            return Ok(());
        }
        let resp = self
            .api
            .call("iam", "get-group", &["--group-name", resource_name])
            .await?;
        let users = items(&resp, "Users")?
            .iter()
            .map(|u| str_field(u, "UserName").map(|n| Value::String(n.to_string())))
            .collect::<AwsResult<Vec<_>>>()?;

        attributes.insert(
            "name".into(),
            Value::String(format!("{resource_name}-group-membership")),
        );
        attributes.insert("group".into(), Value::String(resource_name.to_string()));
        attributes.insert("users".into(), Value::Array(users));
        Ok(())
    }
}

/// IAM roles, their attached policies and instance profiles
pub struct Role {
    api: Arc<dyn AwsApi>,
}

impl Role {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Role {
    fn name(&self) -> &str {
        "iam_role"
    }

    fn included_resource_types(&self) -> &[&str] {
        &[
            "aws_iam_role",
            "aws_iam_policy",
            "aws_iam_role_policy_attachment",
            "aws_iam_instance_profile",
        ]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let api = self.api.as_ref();
        let local = local_policies(api).await?;
        let roles = api.call("iam", "list-roles", &[]).await?;

        let mut entries = Vec::new();
        for role in items(&roles, "Roles")? {
            let role_name = str_field(role, "RoleName")?;
            entries.push(
                CatalogEntry::new("aws_iam_role", normalize_identity(role_name), role_name)
                    .with_raw(role),
            );

            let attached = api
                .call("iam", "list-attached-role-policies", &["--role-name", role_name])
                .await?;
            entries.extend(attachment_entries(
                &attached,
                role_name,
                "aws_iam_role_policy_attachment",
                &local,
            )?);

            let profiles = api
                .call("iam", "list-instance-profiles-for-role", &["--role-name", role_name])
                .await?;
            for profile in items(&profiles, "InstanceProfiles")? {
                let name = str_field(profile, "InstanceProfileName")?;
                entries.push(
                    CatalogEntry::new("aws_iam_instance_profile", normalize_identity(name), name)
                        .with_raw(profile),
                );
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::testing::{FakeApi, triples};
    use serde_json::json;

    fn policies() -> Value {
        json!({"Policies": [{"PolicyName": "deploy"}]})
    }

    #[tokio::test]
    async fn test_group_listing() {
        let api = FakeApi::default()
            .with("iam list-policies --scope Local", policies())
            .with("iam list-groups", json!({"Groups": [{"GroupName": "admins"}]}))
            .with(
                "iam list-group-policies --group-name admins",
                json!({"PolicyNames": ["s3.read"]}),
            )
            .with(
                "iam list-attached-group-policies --group-name admins",
                json!({"AttachedPolicies": [
                    {"PolicyName": "deploy", "PolicyArn": "arn:aws:iam::123:policy/deploy"},
                    {"PolicyName": "ReadOnlyAccess", "PolicyArn": "arn:aws:iam::aws:policy/ReadOnlyAccess"},
                ]}),
            );
        let entries = Group::new(Arc::new(api)).list_all().await.unwrap();
        assert_eq!(
            triples(&entries),
            vec![
                ("aws_iam_group", "admins", "admins"),
                ("aws_iam_group_policy", "admins_s3-read", "admins:s3.read"),
                (
                    "aws_iam_group_policy_attachment",
                    "admins-deploy",
                    "admins/arn:aws:iam::123:policy/deploy"
                ),
                ("aws_iam_policy", "deploy", "arn:aws:iam::123:policy/deploy"),
                (
                    "aws_iam_group_policy_attachment",
                    "admins-ReadOnlyAccess",
                    "admins/arn:aws:iam::aws:policy/ReadOnlyAccess"
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_role_listing() {
        let api = FakeApi::default()
            .with("iam list-policies --scope Local", policies())
            .with("iam list-roles", json!({"Roles": [{"RoleName": "web.role"}]}))
            .with(
                "iam list-attached-role-policies --role-name web.role",
                json!({"AttachedPolicies": []}),
            )
            .with(
                "iam list-instance-profiles-for-role --role-name web.role",
                json!({"InstanceProfiles": [{"InstanceProfileName": "web"}]}),
            );
        let entries = Role::new(Arc::new(api)).list_all().await.unwrap();
        assert_eq!(
            triples(&entries),
            vec![
                ("aws_iam_role", "web-role", "web.role"),
                ("aws_iam_instance_profile", "web", "web"),
            ]
        );
    }

    #[tokio::test]
    async fn test_group_membership_amendment() {
        let api = FakeApi::default().with(
            "iam get-group --group-name admins",
            json!({"Users": [{"UserName": "alice"}, {"UserName": "bob"}]}),
        );
        let kind = Group::new(Arc::new(api));

        let mut attrs = Map::new();
        kind.amend_attributes("aws_iam_group_membership", "admins", &mut attrs)
            .await
            .unwrap();
        assert_eq!(attrs["name"], json!("admins-group-membership"));
        assert_eq!(attrs["group"], json!("admins"));
        assert_eq!(attrs["users"], json!(["alice", "bob"]));

        let mut attrs = Map::new();
        kind.amend_attributes("aws_iam_group", "admins", &mut attrs)
            .await
            .unwrap();
        assert!(attrs.is_empty());
    }
}
