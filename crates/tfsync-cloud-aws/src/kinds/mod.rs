//! AWS resource kinds
//!
//! One [`ResourceKind`] per kind name. Listing parses the JSON returned
//! by [`AwsApi`] into catalog entries.

pub mod compute;
pub mod database;
pub mod iam;
pub mod messaging;
pub mod network;
pub mod storage;

use crate::aws_cli::AwsApi;
use serde_json::{Map, Value};
use std::sync::Arc;
use tfsync_cloud::Registry;

/// Registry with every AWS kind and the `asg`, `network` and `instance`
/// groups
pub fn registry(api: Arc<dyn AwsApi>) -> Registry {
    let mut registry = Registry::new();
    registry
        .register(network::Vpc::new(api.clone()))
        .register(network::Igw::new(api.clone()))
        .register(network::Elb::new(api.clone()))
        .register(network::Eip::new(api.clone()))
        .register(network::Nif::new(api.clone()))
        .register(network::Nacl::new(api.clone()))
        .register(network::Rt::new(api.clone()))
        .register(network::Sg::new(api.clone()))
        .register(network::Subnet::new(api.clone()))
        .register(compute::Asg::new(api.clone()))
        .register(compute::LaunchTemplate::new(api.clone()))
        .register(database::Ecc::new(api.clone()))
        .register(compute::Ec2::new(api.clone()))
        .register(database::Rds::new(api.clone()))
        .register(messaging::Cwa::new(api.clone()))
        .register(messaging::Sns::new(api.clone()))
        .register(messaging::Sqs::new(api.clone()))
        .register(iam::Group::new(api.clone()))
        .register(iam::Role::new(api.clone()))
        .register(storage::S3::new(api.clone()))
        .register(compute::Emr::new(api));

    registry
        .group("asg", &["asg", "launch_template"])
        .group(
            "network",
            &["elb", "igw", "vpc", "eip", "nif", "nacl", "rt", "sg", "subnet"],
        )
        .group("instance", &["asg", "ecc", "rds", "ec2"]);
    registry
}

/// Remove `field` from every object in the list attribute `key`
pub(crate) fn strip_nested(attributes: &mut Map<String, Value>, key: &str, field: &str) {
    if let Some(Value::Array(items)) = attributes.get_mut(key) {
        for item in items.iter_mut() {
            if let Value::Object(obj) = item {
                obj.shift_remove(field);
            }
        }
    }
}
