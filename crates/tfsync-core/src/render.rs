//! Attribute serializer
//!
//! Turns one [`Attribute`] into block-structured configuration text. The
//! output for a value is chosen by its shape, checked in this order:
//!
//! 1. bool → `key = true`
//! 2. list → elided / `key = []`, repeated `key { ... }` blocks for a list
//!    of objects, or `key = ["a", "b"]` for scalars
//! 3. string holding a JSON document → `key = <<KEY ... KEY` heredoc
//! 4. map → `key = { ... }` or `key { ... }` depending on [`MapStyle`]
//! 5. non-empty string → `key = "value"`
//! 6. empty string → elided
//! 7. number → `key = 42`
//! 8. anything else → [`CoreError::UnsupportedValue`]
//!
//! Every line is indented by four spaces per depth level. An elided
//! attribute renders as the empty string and is skipped by its parent.

use crate::error::{CoreError, Result};
use crate::identity::{heredoc_marker, quote_key};
use crate::value::{Attribute, AttributeValue};
use indexmap::IndexMap;

const INDENT: &str = "    ";

/// How plain map values are opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapStyle {
    /// `key = { ... }`, for tag-like maps
    #[default]
    Assignment,
    /// `key { ... }`, for structured sub-blocks
    Block,
}

/// What to emit for an empty list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyListPolicy {
    #[default]
    Elide,
    /// `key = []`
    Emit,
}

/// Options that stay fixed for a whole render pass
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub empty_lists: EmptyListPolicy,
}

/// Render `attr` at `depth` with default options.
///
/// `map_style` selects how plain map values are opened at every level;
/// objects inside a list always render as `key { ... }` blocks.
pub fn render_attribute(attr: &Attribute, depth: usize, map_style: MapStyle) -> Result<String> {
    Renderer::default().render(attr, depth, map_style)
}

/// Stateless serializer carrying its [`RenderOptions`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    pub fn render(&self, attr: &Attribute, depth: usize, map_style: MapStyle) -> Result<String> {
        self.render_value(&attr.name, &attr.value, depth, map_style)
    }

    fn render_value(
        &self,
        name: &str,
        value: &AttributeValue,
        depth: usize,
        map_style: MapStyle,
    ) -> Result<String> {
        let key = quote_key(name);
        let indent = INDENT.repeat(depth);

        match value {
            AttributeValue::Bool(b) => Ok(format!("{indent}{key} = {b}")),
            AttributeValue::List(items) => self.render_list(name, &key, items, depth, map_style),
            AttributeValue::Map(map) => self.render_map(&key, map, depth, map_style, map_style),
            AttributeValue::String(s) => {
                if let Some(body) = json_heredoc_body(s) {
                    let marker = heredoc_marker(name);
                    Ok(format!("{indent}{key} = <<{marker}\n{body}\n{marker}"))
                } else if s.is_empty() {
                    Ok(String::new())
                } else {
                    Ok(format!("{indent}{key} = \"{s}\""))
                }
            }
            AttributeValue::Int(i) => Ok(format!("{indent}{key} = {i}")),
            AttributeValue::Float(f) => Ok(format!("{indent}{key} = {}", format_float(*f))),
            AttributeValue::Null => Err(CoreError::UnsupportedValue {
                key: name.to_string(),
                kind: value.kind(),
            }),
        }
    }

    fn render_list(
        &self,
        name: &str,
        key: &str,
        items: &[AttributeValue],
        depth: usize,
        map_style: MapStyle,
    ) -> Result<String> {
        let Some(first) = items.first() else {
            return Ok(match self.options.empty_lists {
                EmptyListPolicy::Elide => String::new(),
                EmptyListPolicy::Emit => format!("{}{key} = []", INDENT.repeat(depth)),
            });
        };

        if first.as_map().is_some() {
            let mut blocks = Vec::with_capacity(items.len());
            for item in items {
                let map = item.as_map().ok_or_else(|| CoreError::MixedBlockList {
                    key: name.to_string(),
                    kind: item.kind(),
                })?;
                let block = self.render_map(key, map, depth, MapStyle::Block, map_style)?;
                if !block.is_empty() {
                    blocks.push(block);
                }
            }
            return Ok(blocks.join("\n"));
        }

        let quoted = items
            .iter()
            .map(|item| scalar_text(item).map(|text| format!("\"{text}\"")))
            .collect::<Option<Vec<_>>>();

        match quoted {
            Some(quoted) => Ok(format!(
                "{}{key} = [{}]",
                INDENT.repeat(depth),
                quoted.join(", ")
            )),
            None => {
                let bad = items
                    .iter()
                    .find(|item| scalar_text(item).is_none())
                    .map(AttributeValue::kind)
                    .unwrap_or("unknown");
                Err(CoreError::NonScalarListItem {
                    key: name.to_string(),
                    kind: bad,
                })
            }
        }
    }

    /// `head` decides how this map is opened, `nested` is passed down to
    /// plain map values among its children.
    fn render_map(
        &self,
        key: &str,
        map: &IndexMap<String, AttributeValue>,
        depth: usize,
        head: MapStyle,
        nested: MapStyle,
    ) -> Result<String> {
        let mut children = Vec::with_capacity(map.len());
        for (child_name, child) in map {
            if !child.is_non_empty() {
                continue;
            }
            let rendered = self.render_value(child_name, child, depth + 1, nested)?;
            if !rendered.is_empty() {
                children.push(rendered);
            }
        }

        if children.is_empty() {
            return Ok(String::new());
        }

        let indent = INDENT.repeat(depth);
        let opener = match head {
            MapStyle::Assignment => "= {",
            MapStyle::Block => "{",
        };
        Ok(format!(
            "{indent}{key} {opener}\n{}\n{indent}}}",
            children.join("\n")
        ))
    }
}

/// Pretty-printed JSON for strings that hold a JSON document.
///
/// Only strings containing `{` are tried. `${` is escaped to `$${` before
/// parsing so the configuration language keeps it literal.
fn json_heredoc_body(s: &str) -> Option<String> {
    if !s.contains('{') {
        return None;
    }
    let escaped = s.replace("${", "$${");
    let parsed: serde_json::Value = serde_json::from_str(&escaped).ok()?;
    serde_json::to_string_pretty(&parsed).ok()
}

fn scalar_text(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::String(s) => Some(s.clone()),
        AttributeValue::Bool(b) => Some(b.to_string()),
        AttributeValue::Int(i) => Some(i.to_string()),
        AttributeValue::Float(f) => Some(format_float(*f)),
        AttributeValue::Null | AttributeValue::List(_) | AttributeValue::Map(_) => None,
    }
}

/// Shortest round-trip text, always with a fraction or exponent
fn format_float(f: f64) -> String {
    format!("{f:?}")
}
