//! Whole-file helpers: resource stanzas, resource head scanning and
//! syntax migration of existing configuration files.

use crate::error::Result;
use crate::render::{MapStyle, Renderer};
use crate::value::Attribute;
use regex::Regex;
use std::sync::LazyLock;

static RESOURCE_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*resource\s+"([\w-]+)"\s+"([\w-]+)"\s+"#).expect("valid resource regex")
});

static TAGS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]+)(tags)([ \t]*\{)").expect("valid tags regex")
});

/// One `resource "<type>" "<name>" { ... }` stanza
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceStanza {
    pub resource_type: String,
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl ResourceStanza {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    /// `<type>.<name>` as used by terraform addresses
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }

    pub fn render(&self, renderer: &Renderer, map_style: MapStyle) -> Result<String> {
        let body = render_body(&self.attributes, 1, renderer, map_style)?;
        let head = format!("resource \"{}\" \"{}\" {{", self.resource_type, self.name);
        if body.is_empty() {
            Ok(format!("{head}\n}}"))
        } else {
            Ok(format!("{head}\n{body}\n}}"))
        }
    }
}

/// Render attributes at `depth`, skipping the ones that elide
pub fn render_body(
    attributes: &[Attribute],
    depth: usize,
    renderer: &Renderer,
    map_style: MapStyle,
) -> Result<String> {
    let mut lines = Vec::with_capacity(attributes.len());
    for attr in attributes {
        let rendered = renderer.render(attr, depth, map_style)?;
        if !rendered.is_empty() {
            lines.push(rendered);
        }
    }
    Ok(lines.join("\n"))
}

/// Render a configuration file: stanzas separated by a blank line, with a
/// trailing newline. No stanzas yields an empty file.
pub fn render_document(
    stanzas: &[ResourceStanza],
    renderer: &Renderer,
    map_style: MapStyle,
) -> Result<String> {
    let mut out = Vec::with_capacity(stanzas.len());
    for stanza in stanzas {
        out.push(stanza.render(renderer, map_style)?);
    }
    if out.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("{}\n", out.join("\n\n")))
}

/// `(type, name)` pair found at the head of a resource stanza
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHead {
    pub resource_type: String,
    pub name: String,
}

impl ResourceHead {
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }
}

/// Find every `resource "<type>" "<name>"` head in configuration text
pub fn scan_resource_heads(text: &str) -> Vec<ResourceHead> {
    RESOURCE_HEAD
        .captures_iter(text)
        .map(|caps| ResourceHead {
            resource_type: caps[1].to_string(),
            name: caps[2].to_string(),
        })
        .collect()
}

/// Rewrite indented `tags {` blocks to the `tags = {` map syntax.
///
/// Returns the new text and how many lines changed.
pub fn migrate_tags_syntax(text: &str) -> (String, usize) {
    let changed = TAGS_BLOCK.find_iter(text).count();
    let migrated = TAGS_BLOCK.replace_all(text, "${1}${2} =${3}").into_owned();
    (migrated, changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::AttributeValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_render_document() {
        let stanzas = vec![
            ResourceStanza::new("aws_s3_bucket", "logs").with_attributes(vec![
                Attribute::new("acl", "private"),
                Attribute::new("description", ""),
                Attribute::new("tags", AttributeValue::from(json!({"team": "infra"}))),
            ]),
            ResourceStanza::new("aws_sqs_queue", "jobs"),
        ];

        let text = render_document(&stanzas, &Renderer::default(), MapStyle::Assignment).unwrap();
        assert_eq!(
            text,
            "resource \"aws_s3_bucket\" \"logs\" {\n    acl = \"private\"\n    tags = {\n        team = \"infra\"\n    }\n}\n\nresource \"aws_sqs_queue\" \"jobs\" {\n}\n"
        );
    }

    #[test]
    fn test_rendered_document_parses_back() {
        let stanzas = vec![
            ResourceStanza::new("aws_iam_policy", "deploy").with_attributes(vec![
                Attribute::new("policy", r#"{"a": "${b}"}"#),
                Attribute::new(
                    "tags",
                    AttributeValue::from(json!({"Name": "x", "n": 3, "ok": true, "r": 0.5})),
                ),
            ]),
        ];
        let text = render_document(&stanzas, &Renderer::default(), MapStyle::Assignment).unwrap();

        let body: hcl::Body = hcl::from_str(&text).unwrap();
        let block = body.blocks().next().unwrap();
        assert_eq!(block.identifier(), "resource");
        let expr = |key: &str| {
            block
                .body()
                .attributes()
                .find(|a| a.key() == key)
                .map(|a| a.expr().clone())
                .unwrap()
        };

        let hcl::Value::Object(tags) = hcl::Value::from(expr("tags")) else {
            panic!("tags is not an object");
        };
        let keys: Vec<&str> = tags.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Name", "n", "ok", "r"]);
        assert_eq!(tags["Name"], hcl::Value::from("x"));
        assert_eq!(tags["n"], hcl::Value::from(3));
        assert_eq!(tags["ok"], hcl::Value::from(true));
        assert_eq!(tags["r"], hcl::Value::from(0.5));

        match expr("policy") {
            hcl::expr::Expression::TemplateExpr(template) => match *template {
                hcl::expr::TemplateExpr::Heredoc(heredoc) => {
                    assert_eq!(heredoc.template, "{\n  \"a\": \"$${b}\"\n}\n");
                }
                other => panic!("policy is not a heredoc: {other:?}"),
            },
            other => panic!("policy is not a template: {other:?}"),
        }
    }

    #[test]
    fn test_render_document_empty() {
        let text = render_document(&[], &Renderer::default(), MapStyle::Assignment).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_scan_resource_heads() {
        let text = r#"
resource "aws_autoscaling_group" "EC2ContainerService-devpi-EcsInstanceAsg-PN2TBOT7N8BD" {
    max_size = 2
}

  resource "aws_vpc" "main" {
}
data "aws_ami" "ignored" {
}
"#;
        let heads = scan_resource_heads(text);
        assert_eq!(heads.len(), 2);
        assert_eq!(
            heads[0].address(),
            "aws_autoscaling_group.EC2ContainerService-devpi-EcsInstanceAsg-PN2TBOT7N8BD"
        );
        assert_eq!(heads[1].resource_type, "aws_vpc");
        assert_eq!(heads[1].name, "main");
    }

    #[test]
    fn test_migrate_tags_syntax() {
        let text = "resource \"aws_vpc\" \"main\" {\n    tags {\n        Name = \"main\"\n    }\n    tags = {\n    }\n}\n";
        let (migrated, changed) = migrate_tags_syntax(text);
        assert_eq!(changed, 1);
        assert_eq!(
            migrated,
            "resource \"aws_vpc\" \"main\" {\n    tags = {\n        Name = \"main\"\n    }\n    tags = {\n    }\n}\n"
        );
    }

    #[test]
    fn test_migrate_ignores_unindented_and_other_keys() {
        let text = "tags {\n}\n    tags_all {\n    }\n";
        let (migrated, changed) = migrate_tags_syntax(text);
        assert_eq!(changed, 0);
        assert_eq!(migrated, text);
    }
}
