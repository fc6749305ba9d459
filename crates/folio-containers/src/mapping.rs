//! Declarative config-key to attribute mapping.
//!
//! A [`ConfigMapping`] is an ordered table of `(key, mapper)` entries. At
//! render time each key present in the block's config is passed to its
//! mapper, and the resulting fragments are collected into one
//! [`AttributeSet`]. A full-config mapper, when set, replaces per-key mapping
//! entirely; it is for attributes derived from several keys at once.

use std::sync::Arc;

use folio_markdown::{BlockConfig, ConfigValue};

use crate::attrs::{AttrFragment, AttributeSet};

/// Maps one config value to attribute fragments.
pub type Mapper = Arc<dyn Fn(&ConfigValue) -> Vec<AttrFragment> + Send + Sync>;

/// Maps a whole config to attribute fragments.
pub type FullConfigMapper = Arc<dyn Fn(&BlockConfig) -> Vec<AttrFragment> + Send + Sync>;

/// Ordered mapping table.
#[derive(Clone, Default)]
pub struct ConfigMapping {
    entries: Vec<(String, Mapper)>,
    full: Option<FullConfigMapper>,
}

impl ConfigMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry for `key`.
    #[must_use]
    pub fn map<F>(mut self, key: impl Into<String>, mapper: F) -> Self
    where
        F: Fn(&ConfigValue) -> Vec<AttrFragment> + Send + Sync + 'static,
    {
        self.entries.push((key.into(), Arc::new(mapper)));
        self
    }

    /// Set the full-config mapper.
    #[must_use]
    pub fn full_config<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&BlockConfig) -> Vec<AttrFragment> + Send + Sync + 'static,
    {
        self.full = Some(Arc::new(mapper));
        self
    }

    /// Mapped keys in table order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Apply the table to `config`.
    pub fn apply(&self, config: &BlockConfig) -> AttributeSet {
        if let Some(full) = &self.full {
            return full(config).into_iter().collect();
        }

        let mut set = AttributeSet::new();
        for (key, mapper) in &self.entries {
            if let Some(value) = config.get(key) {
                set.extend(mapper(value));
            }
        }
        set
    }
}

impl std::fmt::Debug for ConfigMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigMapping")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .field("full_config", &self.full.is_some())
            .finish()
    }
}

/// Component prop: strings are literal, numbers and booleans are bound.
///
/// Arrays and objects are bound as compact JSON. `null` renders an empty
/// literal value.
pub fn prop(name: &str) -> impl Fn(&ConfigValue) -> Vec<AttrFragment> + Send + Sync + 'static {
    let name = name.to_owned();
    move |value| {
        let fragment = match value {
            ConfigValue::String(s) => AttrFragment::attr(&name, s),
            ConfigValue::Null => AttrFragment::attr(&name, ""),
            other => AttrFragment::bound(&name, other.to_string()),
        };
        vec![fragment]
    }
}

/// Literal attribute with the value's display form.
pub fn attr(name: &str) -> impl Fn(&ConfigValue) -> Vec<AttrFragment> + Send + Sync + 'static {
    let name = name.to_owned();
    move |value| vec![AttrFragment::attr(&name, value.to_string())]
}

/// Binding attribute with the value's display form.
pub fn bound(name: &str) -> impl Fn(&ConfigValue) -> Vec<AttrFragment> + Send + Sync + 'static {
    let name = name.to_owned();
    move |value| vec![AttrFragment::bound(&name, value.to_string())]
}

/// Binding attribute carrying the value as JSON.
pub fn json(name: &str) -> impl Fn(&ConfigValue) -> Vec<AttrFragment> + Send + Sync + 'static {
    let name = name.to_owned();
    move |value| vec![AttrFragment::bound(&name, serde_json::Value::from(value).to_string())]
}

/// Bare attribute when the value is truthy, nothing otherwise.
pub fn flag(name: &str) -> impl Fn(&ConfigValue) -> Vec<AttrFragment> + Send + Sync + 'static {
    let name = name.to_owned();
    move |value| {
        if value.is_truthy() {
            vec![AttrFragment::flag(&name)]
        } else {
            Vec::new()
        }
    }
}

/// Add `class` when the value is truthy.
pub fn class_if(class: &str) -> impl Fn(&ConfigValue) -> Vec<AttrFragment> + Send + Sync + 'static {
    let class = class.to_owned();
    move |value| {
        if value.is_truthy() {
            vec![AttrFragment::class(&class)]
        } else {
            Vec::new()
        }
    }
}

/// Style declaration `property: value`, skipped for empty values.
pub fn style(property: &str) -> impl Fn(&ConfigValue) -> Vec<AttrFragment> + Send + Sync + 'static {
    let property = property.to_owned();
    move |value| {
        let value = value.to_string();
        if value.is_empty() {
            Vec::new()
        } else {
            vec![AttrFragment::style(format!("{property}: {value}"))]
        }
    }
}
