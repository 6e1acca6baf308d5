//! tfsync core
//!
//! Converts attribute trees taken from terraform state documents into
//! block-structured configuration text.
//!
//! ```
//! use tfsync_core::{Attribute, AttributeValue, MapStyle, render_attribute};
//! use serde_json::json;
//!
//! let tags = Attribute::new("tags", AttributeValue::from(json!({"Name": "web", "Owner": ""})));
//! let text = render_attribute(&tags, 1, MapStyle::Assignment).unwrap();
//! assert_eq!(text, "    tags = {\n        Name = \"web\"\n    }");
//! ```

pub mod document;
pub mod error;
pub mod identity;
pub mod render;
pub mod value;

pub use document::{
    ResourceHead, ResourceStanza, migrate_tags_syntax, render_body, render_document,
    scan_resource_heads,
};
pub use error::{CoreError, Result};
pub use identity::{is_identifier, normalize_identity, quote_key};
pub use render::{EmptyListPolicy, MapStyle, RenderOptions, Renderer, render_attribute};
pub use value::{Attribute, AttributeValue};
