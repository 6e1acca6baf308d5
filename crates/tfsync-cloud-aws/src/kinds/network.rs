//! VPC networking kinds

use super::strip_nested;
use crate::aws_cli::AwsApi;
use crate::error::Result as AwsResult;
use crate::tags::{items, name_tag, str_field};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tfsync_cloud::{CatalogEntry, ResourceKind, Result};
use tfsync_core::normalize_identity;

/// Name from the `Name` tag, falling back to the id
fn tagged_name(item: &Value, id: &str) -> String {
    name_tag(item).map(normalize_identity).unwrap_or_else(|| id.to_string())
}

pub struct Vpc {
    api: Arc<dyn AwsApi>,
}

impl Vpc {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Vpc {
    fn name(&self) -> &str {
        "vpc"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_vpc"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("ec2", "describe-vpcs", &[]).await?;
        Ok(vpc_entries(&resp)?)
    }
}

fn vpc_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    items(resp, "Vpcs")?
        .iter()
        .map(|item| {
            let id = str_field(item, "VpcId")?;
            Ok(CatalogEntry::new("aws_vpc", tagged_name(item, id), id).with_raw(item))
        })
        .collect()
}

pub struct Igw {
    api: Arc<dyn AwsApi>,
}

impl Igw {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Igw {
    fn name(&self) -> &str {
        "igw"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_internet_gateway"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("ec2", "describe-internet-gateways", &[]).await?;
        Ok(igw_entries(&resp)?)
    }
}

fn igw_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    items(resp, "InternetGateways")?
        .iter()
        .map(|item| {
            let id = str_field(item, "InternetGatewayId")?;
            Ok(CatalogEntry::new("aws_internet_gateway", tagged_name(item, id), id).with_raw(item))
        })
        .collect()
}

/// Application load balancers
pub struct Elb {
    api: Arc<dyn AwsApi>,
}

impl Elb {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Elb {
    fn name(&self) -> &str {
        "elb"
    }

    fn included_resource_types(&self) -> &[&str] {
        &[
            "aws_alb",
            "aws_alb_listener",
            "aws_alb_listener_certificate",
            "aws_alb_listener_rule",
            "aws_alb_target_group",
            "aws_alb_target_group_attachment",
            "aws_elb",
        ]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("elbv2", "describe-load-balancers", &[]).await?;
        Ok(elb_entries(&resp)?)
    }
}

fn elb_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    items(resp, "LoadBalancers")?
        .iter()
        .map(|item| {
            let name = str_field(item, "LoadBalancerName")?;
            let arn = str_field(item, "LoadBalancerArn")?;
            Ok(CatalogEntry::new("aws_alb", normalize_identity(name), arn).with_raw(item))
        })
        .collect()
}

/// Elastic IPs
pub struct Eip {
    api: Arc<dyn AwsApi>,
}

impl Eip {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Eip {
    fn name(&self) -> &str {
        "eip"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_eip"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("ec2", "describe-addresses", &[]).await?;
        Ok(eip_entries(&resp)?)
    }
}

fn eip_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    items(resp, "Addresses")?
        .iter()
        .map(|item| {
            let id = str_field(item, "AllocationId")?;
            Ok(CatalogEntry::new("aws_eip", id, id).with_raw(item))
        })
        .collect()
}

/// Network interfaces, except those RDS manages
pub struct Nif {
    api: Arc<dyn AwsApi>,
}

impl Nif {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Nif {
    fn name(&self) -> &str {
        "nif"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_network_interface"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("ec2", "describe-network-interfaces", &[]).await?;
        Ok(nif_entries(&resp)?)
    }

    async fn amend_attributes(
        &self,
        _resource_type: &str,
        _resource_name: &str,
        attributes: &mut Map<String, Value>,
    ) -> Result<()> {
        strip_nested(attributes, "attachment", "attachment_id");
        Ok(())
    }
}

fn nif_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    let mut entries = Vec::new();
    for item in items(resp, "NetworkInterfaces")? {
        if item.get("RequesterId").and_then(Value::as_str) == Some("amazon-rds") {
            continue;
        }
        let id = str_field(item, "NetworkInterfaceId")?;
        entries.push(CatalogEntry::new("aws_network_interface", id, id).with_raw(item));
    }
    Ok(entries)
}

/// Network ACLs
pub struct Nacl {
    api: Arc<dyn AwsApi>,
}

impl Nacl {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Nacl {
    fn name(&self) -> &str {
        "nacl"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_network_acl"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("ec2", "describe-network-acls", &[]).await?;
        Ok(nacl_entries(&resp)?)
    }
}

fn nacl_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    items(resp, "NetworkAcls")?
        .iter()
        .map(|item| {
            let id = str_field(item, "NetworkAclId")?;
            Ok(CatalogEntry::new("aws_network_acl", id, id).with_raw(item))
        })
        .collect()
}

/// Route tables and their explicit associations
pub struct Rt {
    api: Arc<dyn AwsApi>,
}

impl Rt {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Rt {
    fn name(&self) -> &str {
        "rt"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_route_table", "aws_route_table_association"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("ec2", "describe-route-tables", &[]).await?;
        Ok(rt_entries(&resp)?)
    }
}

fn rt_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    let mut entries = Vec::new();
    for table in items(resp, "RouteTables")? {
        let table_id = str_field(table, "RouteTableId")?;
        entries.push(CatalogEntry::new("aws_route_table", table_id, table_id).with_raw(table));

        for assoc in items(table, "Associations")? {
            // The main association is implicit
            if assoc.get("Main").and_then(Value::as_bool).unwrap_or(false) {
                continue;
            }
            let target = assoc
                .get("SubnetId")
                .or_else(|| assoc.get("GatewayId"))
                .and_then(Value::as_str);
            let Some(target) = target else {
                continue;
            };
            let name = str_field(assoc, "RouteTableAssociationId")?;
            entries.push(
                CatalogEntry::new(
                    "aws_route_table_association",
                    name,
                    format!("{target}/{table_id}"),
                )
                .with_raw(assoc),
            );
        }
    }
    Ok(entries)
}

/// Security groups
pub struct Sg {
    api: Arc<dyn AwsApi>,
}

impl Sg {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Sg {
    fn name(&self) -> &str {
        "sg"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_security_group", "aws_security_group_rule"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("ec2", "describe-security-groups", &[]).await?;
        Ok(sg_entries(&resp)?)
    }

    async fn amend_attributes(
        &self,
        resource_type: &str,
        _resource_name: &str,
        attributes: &mut Map<String, Value>,
    ) -> Result<()> {
        // `self` and `source_security_group_id` conflict
        if resource_type == "aws_security_group_rule" && attributes.contains_key("self") {
            attributes.shift_remove("source_security_group_id");
        }
        Ok(())
    }
}

fn sg_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    items(resp, "SecurityGroups")?
        .iter()
        .map(|item| {
            let name = str_field(item, "GroupName")?;
            let id = str_field(item, "GroupId")?;
            Ok(CatalogEntry::new("aws_security_group", normalize_identity(name), id).with_raw(item))
        })
        .collect()
}

pub struct Subnet {
    api: Arc<dyn AwsApi>,
}

impl Subnet {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Subnet {
    fn name(&self) -> &str {
        "subnet"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_subnet"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("ec2", "describe-subnets", &[]).await?;
        Ok(subnet_entries(&resp)?)
    }

    async fn amend_attributes(
        &self,
        _resource_type: &str,
        _resource_name: &str,
        attributes: &mut Map<String, Value>,
    ) -> Result<()> {
        if attributes.contains_key("availability_zone") {
            attributes.shift_remove("availability_zone_id");
        }
        Ok(())
    }
}

fn subnet_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    items(resp, "Subnets")?
        .iter()
        .map(|item| {
            let id = str_field(item, "SubnetId")?;
            let name = match name_tag(item) {
                Some(tag) => normalize_identity(&format!("{id}-{tag}")),
                None => id.to_string(),
            };
            Ok(CatalogEntry::new("aws_subnet", name, id).with_raw(item))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::testing::{FakeApi, triples};
    use serde_json::json;

    #[tokio::test]
    async fn test_vpc_names_from_tags() {
        let api = FakeApi::default().with(
            "ec2 describe-vpcs",
            json!({"Vpcs": [
                {"VpcId": "vpc-1", "Tags": [{"Key": "Name", "Value": "main vpc"}]},
                {"VpcId": "vpc-2"},
            ]}),
        );
        let entries = Vpc::new(Arc::new(api)).list_all().await.unwrap();
        assert_eq!(
            triples(&entries),
            vec![("aws_vpc", "main-vpc", "vpc-1"), ("aws_vpc", "vpc-2", "vpc-2")]
        );
        assert_eq!(entries[0].raw_attributes["VpcId"], json!("vpc-1"));
    }

    #[tokio::test]
    async fn test_nif_skips_rds_managed() {
        let api = FakeApi::default().with(
            "ec2 describe-network-interfaces",
            json!({"NetworkInterfaces": [
                {"NetworkInterfaceId": "eni-1"},
                {"NetworkInterfaceId": "eni-2", "RequesterId": "amazon-rds"},
            ]}),
        );
        let entries = Nif::new(Arc::new(api)).list_all().await.unwrap();
        assert_eq!(
            triples(&entries),
            vec![("aws_network_interface", "eni-1", "eni-1")]
        );
    }

    #[tokio::test]
    async fn test_route_table_associations() {
        let api = FakeApi::default().with(
            "ec2 describe-route-tables",
            json!({"RouteTables": [{
                "RouteTableId": "rtb-1",
                "Associations": [
                    {"Main": true, "RouteTableAssociationId": "rtbassoc-0"},
                    {"Main": false, "RouteTableAssociationId": "rtbassoc-1", "SubnetId": "subnet-1"},
                    {"Main": false, "RouteTableAssociationId": "rtbassoc-2", "GatewayId": "igw-1"},
                ],
            }]}),
        );
        let entries = Rt::new(Arc::new(api)).list_all().await.unwrap();
        assert_eq!(
            triples(&entries),
            vec![
                ("aws_route_table", "rtb-1", "rtb-1"),
                ("aws_route_table_association", "rtbassoc-1", "subnet-1/rtb-1"),
                ("aws_route_table_association", "rtbassoc-2", "igw-1/rtb-1"),
            ]
        );
    }

    #[tokio::test]
    async fn test_subnet_names_combine_id_and_tag() {
        let api = FakeApi::default().with(
            "ec2 describe-subnets",
            json!({"Subnets": [
                {"SubnetId": "subnet-1", "Tags": [{"Key": "Name", "Value": "private.a"}]},
                {"SubnetId": "subnet-2", "Tags": []},
            ]}),
        );
        let entries = Subnet::new(Arc::new(api)).list_all().await.unwrap();
        assert_eq!(
            triples(&entries),
            vec![
                ("aws_subnet", "subnet-1-private-a", "subnet-1"),
                ("aws_subnet", "subnet-2", "subnet-2"),
            ]
        );
    }

    #[tokio::test]
    async fn test_other_network_listings() {
        let api = Arc::new(
            FakeApi::default()
                .with(
                    "ec2 describe-internet-gateways",
                    json!({"InternetGateways": [{"InternetGatewayId": "igw-1"}]}),
                )
                .with(
                    "elbv2 describe-load-balancers",
                    json!({"LoadBalancers": [{"LoadBalancerName": "web", "LoadBalancerArn": "arn:lb/web"}]}),
                )
                .with(
                    "ec2 describe-addresses",
                    json!({"Addresses": [{"AllocationId": "eipalloc-1"}]}),
                )
                .with(
                    "ec2 describe-network-acls",
                    json!({"NetworkAcls": [{"NetworkAclId": "acl-1"}]}),
                )
                .with(
                    "ec2 describe-security-groups",
                    json!({"SecurityGroups": [{"GroupName": "web access", "GroupId": "sg-1"}]}),
                ),
        );

        let igw = Igw::new(api.clone()).list_all().await.unwrap();
        assert_eq!(triples(&igw), vec![("aws_internet_gateway", "igw-1", "igw-1")]);
        let elb = Elb::new(api.clone()).list_all().await.unwrap();
        assert_eq!(triples(&elb), vec![("aws_alb", "web", "arn:lb/web")]);
        let eip = Eip::new(api.clone()).list_all().await.unwrap();
        assert_eq!(triples(&eip), vec![("aws_eip", "eipalloc-1", "eipalloc-1")]);
        let nacl = Nacl::new(api.clone()).list_all().await.unwrap();
        assert_eq!(triples(&nacl), vec![("aws_network_acl", "acl-1", "acl-1")]);
        let sg = Sg::new(api).list_all().await.unwrap();
        assert_eq!(triples(&sg), vec![("aws_security_group", "web-access", "sg-1")]);
    }

    #[tokio::test]
    async fn test_missing_id_is_an_api_error() {
        let api = FakeApi::default().with("ec2 describe-vpcs", json!({"Vpcs": [{"CidrBlock": "10.0.0.0/16"}]}));
        let err = Vpc::new(Arc::new(api)).list_all().await.unwrap_err();
        assert!(matches!(err, tfsync_cloud::CloudError::Api(_)));
    }

    #[tokio::test]
    async fn test_amend_network_attributes() {
        let api: Arc<dyn AwsApi> = Arc::new(FakeApi::default());

        let mut attrs = json!({
            "self": true,
            "source_security_group_id": "sg-2",
            "from_port": 22,
        })
        .as_object()
        .cloned()
        .unwrap();
        Sg::new(api.clone())
            .amend_attributes("aws_security_group_rule", "ssh", &mut attrs)
            .await
            .unwrap();
        assert!(!attrs.contains_key("source_security_group_id"));

        let mut attrs = json!({"availability_zone": "us-east-1a", "availability_zone_id": "use1-az1"})
            .as_object()
            .cloned()
            .unwrap();
        Subnet::new(api)
            .amend_attributes("aws_subnet", "a", &mut attrs)
            .await
            .unwrap();
        assert_eq!(attrs.len(), 1);
    }
}
