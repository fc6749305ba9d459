//! Custom container and tab blocks for [`folio_markdown`].
//!
//! A container is a fenced region opened by three or more colons and a
//! registered name, with an optional single-line JSON config:
//!
//! ```text
//! ::: chart-grid {"columns": 3}
//! content
//! :::
//! ```
//!
//! The block closes at the next line whose colon run has exactly the same
//! length, so a longer outer fence can wrap shorter inner ones. The config
//! is merged over the plugin defaults and turned into attributes of the
//! plugin's component by a [`ConfigMapping`].
//!
//! Tab containers split their body on `@tab` marker lines; see [`tabs`].
//!
//! # Example
//!
//! ```
//! use folio_containers::presets::Presets;
//! use folio_markdown::MarkdownEngine;
//!
//! let mut md = MarkdownEngine::new();
//! md.use_plugin(&Presets::all());
//!
//! let html = md.render("::: timeline-item {\"type\": \"error\"}\nBroke.\n:::").html;
//! assert!(html.starts_with("<TimelineItem dot-color=\"error\""));
//! ```

mod attrs;
mod container;
mod info_attrs;
mod mapping;
pub mod presets;
mod scan;
pub mod tabs;

pub use attrs::{AttrFragment, AttributeSet, escape_attr};
pub use container::ContainerPlugin;
pub use info_attrs::parse_info_attributes;
pub use mapping::{ConfigMapping, FullConfigMapper, Mapper};
pub use tabs::{TabConfigError, TabPlugin, TabRenderer};

/// Built-in mapper constructors for [`ConfigMapping::map`].
pub mod mappers {
    pub use crate::mapping::{attr, bound, class_if, flag, json, prop, style};
}
