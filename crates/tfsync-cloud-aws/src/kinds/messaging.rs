//! CloudWatch alarms, SNS and SQS kinds

use crate::aws_cli::AwsApi;
use crate::error::Result as AwsResult;
use crate::tags::{items, last_segment, str_field};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tfsync_cloud::{CatalogEntry, ResourceKind, Result};
use tfsync_core::normalize_identity;

/// Subscription protocols the provider cannot import
const UNSUPPORTED_PROTOCOLS: [&str; 2] = ["email", "email-json"];

/// CloudWatch metric alarms
pub struct Cwa {
    api: Arc<dyn AwsApi>,
}

impl Cwa {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Cwa {
    fn name(&self) -> &str {
        "cwa"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_cloudwatch_metric_alarm"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("cloudwatch", "describe-alarms", &[]).await?;
        Ok(alarm_entries(&resp)?)
    }
}

fn alarm_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    items(resp, "MetricAlarms")?
        .iter()
        .map(|item| {
            let name = str_field(item, "AlarmName")?;
            Ok(
                CatalogEntry::new("aws_cloudwatch_metric_alarm", normalize_identity(name), name)
                    .with_raw(item),
            )
        })
        .collect()
}

/// SNS topics and their subscriptions
pub struct Sns {
    api: Arc<dyn AwsApi>,
}

impl Sns {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Sns {
    fn name(&self) -> &str {
        "sns"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_sns_topic", "aws_sns_topic_subscription"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let topics = self.api.call("sns", "list-topics", &[]).await?;
        let subscriptions = self.api.call("sns", "list-subscriptions", &[]).await?;
        Ok(sns_entries(&topics, &subscriptions)?)
    }
}

fn sns_entries(topics: &Value, subscriptions: &Value) -> AwsResult<Vec<CatalogEntry>> {
    let mut entries = Vec::new();
    for topic in items(topics, "Topics")? {
        let arn = str_field(topic, "TopicArn")?;
        let name = normalize_identity(last_segment(arn, ':'));
        entries.push(CatalogEntry::new("aws_sns_topic", name, arn).with_raw(topic));
    }
    for sub in items(subscriptions, "Subscriptions")? {
        let protocol = sub.get("Protocol").and_then(Value::as_str).unwrap_or_default();
        if UNSUPPORTED_PROTOCOLS.contains(&protocol) {
            continue;
        }
        let arn = str_field(sub, "SubscriptionArn")?;
        // Unconfirmed subscriptions have no ARN yet
        if !arn.starts_with("arn:") {
            continue;
        }
        let name = normalize_identity(last_segment(arn, ':'));
        entries.push(CatalogEntry::new("aws_sns_topic_subscription", name, arn).with_raw(sub));
    }
    Ok(entries)
}

/// SQS queues
pub struct Sqs {
    api: Arc<dyn AwsApi>,
}

impl Sqs {
    pub fn new(api: Arc<dyn AwsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceKind for Sqs {
    fn name(&self) -> &str {
        "sqs"
    }

    fn included_resource_types(&self) -> &[&str] {
        &["aws_sqs_queue"]
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let resp = self.api.call("sqs", "list-queues", &[]).await?;
        Ok(queue_entries(&resp)?)
    }
}

fn queue_entries(resp: &Value) -> AwsResult<Vec<CatalogEntry>> {
    let mut entries = Vec::new();
    for url in items(resp, "QueueUrls")? {
        let Some(url) = url.as_str() else {
            continue;
        };
        let name = normalize_identity(last_segment(url, '/'));
        entries.push(CatalogEntry::new("aws_sqs_queue", name, url));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::testing::{FakeApi, triples};
    use serde_json::json;

    #[tokio::test]
    async fn test_alarm_names_are_normalized() {
        let api = FakeApi::default().with(
            "cloudwatch describe-alarms",
            json!({"MetricAlarms": [{"AlarmName": "High CPU (web)"}]}),
        );
        let entries = Cwa::new(Arc::new(api)).list_all().await.unwrap();
        assert_eq!(
            triples(&entries),
            vec![("aws_cloudwatch_metric_alarm", "High-CPU--web-", "High CPU (web)")]
        );
    }

    #[tokio::test]
    async fn test_sns_skips_email_subscriptions() {
        let api = FakeApi::default()
            .with(
                "sns list-topics",
                json!({"Topics": [{"TopicArn": "arn:aws:sns:us-east-1:123:alerts"}]}),
            )
            .with(
                "sns list-subscriptions",
                json!({"Subscriptions": [
                    {"SubscriptionArn": "arn:aws:sns:us-east-1:123:alerts:abc-1", "Protocol": "sqs"},
                    {"SubscriptionArn": "arn:aws:sns:us-east-1:123:alerts:abc-2", "Protocol": "email"},
                    {"SubscriptionArn": "PendingConfirmation", "Protocol": "https"},
                ]}),
            );
        let entries = Sns::new(Arc::new(api)).list_all().await.unwrap();
        assert_eq!(
            triples(&entries),
            vec![
                ("aws_sns_topic", "alerts", "arn:aws:sns:us-east-1:123:alerts"),
                (
                    "aws_sns_topic_subscription",
                    "abc-1",
                    "arn:aws:sns:us-east-1:123:alerts:abc-1"
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_sqs_queue_names_from_urls() {
        let api = FakeApi::default().with(
            "sqs list-queues",
            json!({"QueueUrls": ["https://sqs.us-east-1.amazonaws.com/123/jobs.fifo"]}),
        );
        let entries = Sqs::new(Arc::new(api)).list_all().await.unwrap();
        assert_eq!(
            triples(&entries),
            vec![(
                "aws_sqs_queue",
                "jobs-fifo",
                "https://sqs.us-east-1.amazonaws.com/123/jobs.fifo"
            )]
        );
    }

    #[tokio::test]
    async fn test_sqs_without_queues() {
        let api = FakeApi::default().with("sqs list-queues", json!({}));
        let entries = Sqs::new(Arc::new(api)).list_all().await.unwrap();
        assert!(entries.is_empty());
    }
}
