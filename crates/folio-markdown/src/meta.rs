//! Typed token metadata.
//!
//! Block rules attach metadata to the tokens they push so that render rules
//! can read it back without re-parsing the source line.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// A single configuration value from an inline JSON payload or defaults.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    /// JSON string.
    String(String),
    /// JSON number, kept in its original textual precision.
    Number(serde_json::Number),
    /// JSON boolean.
    Bool(bool),
    /// JSON `null`.
    Null,
    /// Arrays and objects, passed through untouched.
    Json(Value),
}

impl ConfigValue {
    /// Borrow the value as a string slice if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Loose truthiness: empty strings, zero, `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::String(s) => !s.is_empty(),
            Self::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Self::Bool(b) => *b,
            Self::Null => false,
            Self::Json(_) => true,
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::String(s),
            Value::Number(n) => Self::Number(n),
            Value::Bool(b) => Self::Bool(b),
            Value::Null => Self::Null,
            other => Self::Json(other),
        }
    }
}

impl From<&ConfigValue> for Value {
    fn from(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::String(s) => Self::String(s.clone()),
            ConfigValue::Number(n) => Self::Number(n.clone()),
            ConfigValue::Bool(b) => Self::Bool(*b),
            ConfigValue::Null => Self::Null,
            ConfigValue::Json(v) => v.clone(),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl fmt::Display for ConfigValue {
    /// Formats the value the way it appears inside an attribute.
    ///
    /// `null` formats as the empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => Ok(()),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

/// Per-block configuration: defaults merged with the fence's JSON payload.
///
/// Keys unknown to a plugin's mapping table are preserved here and simply
/// produce no attribute at render time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockConfig {
    values: BTreeMap<String, ConfigValue>,
}

impl BlockConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single-line JSON object payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the payload is not a valid JSON object.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        let map: serde_json::Map<String, Value> = serde_json::from_str(payload)?;
        Ok(map.into_iter().collect())
    }

    /// Merge `overrides` over `defaults`: explicit fields win, the rest keep defaults.
    #[must_use]
    pub fn merged(defaults: &Self, overrides: Self) -> Self {
        let mut values = defaults.values.clone();
        values.extend(overrides.values);
        Self { values }
    }

    /// Insert or replace a value, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Whether a key is present (even if its value is `null`).
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Whether the key is present with a truthy value.
    pub fn is_truthy(&self, key: &str) -> bool {
        self.get(key).is_some_and(ConfigValue::is_truthy)
    }

    /// Look up a value, falling back when the key is missing or falsy.
    pub fn display_or(&self, key: &str, fallback: &str) -> String {
        match self.get(key) {
            Some(value) if value.is_truthy() => value.to_string(),
            _ => fallback.to_owned(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for BlockConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// One labelled section inside a tab container.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabData {
    /// Tab title from the `@tab` marker line.
    pub title: String,
    /// Zero-based position within the container.
    pub index: usize,
    /// Optional id from a `Title#id` suffix.
    pub id: Option<String>,
    /// Whether the marker was `@tab:active`.
    pub is_active: bool,
}

/// Metadata for a whole tab container.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabsInfo {
    /// Raw text after the container name (used as a JSON payload by tab plugins).
    pub id: String,
    /// Index of the active tab.
    pub active: usize,
    /// All tabs, in source order.
    pub data: Vec<TabData>,
}

/// A self-contained chart block.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    /// Chart type from the opening line, e.g. `bar` or `pie`.
    pub chart_type: String,
    /// JSON payload from the opening line.
    pub config: BlockConfig,
    /// Chart option object built from the body data and the config.
    pub option: Value,
}

/// Metadata attached to a [`Token`](crate::Token).
#[derive(Clone, Debug, PartialEq)]
pub enum TokenMeta {
    /// Merged configuration of a container block.
    Config(BlockConfig),
    /// Tab container description.
    Tabs(TabsInfo),
    /// Single tab description.
    Tab(TabData),
    /// Chart block.
    Chart(ChartSpec),
}

impl TokenMeta {
    /// Borrow the block configuration, if this is one.
    pub fn config(&self) -> Option<&BlockConfig> {
        match self {
            Self::Config(config) => Some(config),
            _ => None,
        }
    }

    /// Borrow the tab container description, if this is one.
    pub fn tabs(&self) -> Option<&TabsInfo> {
        match self {
            Self::Tabs(info) => Some(info),
            _ => None,
        }
    }

    /// Borrow the single tab description, if this is one.
    pub fn tab(&self) -> Option<&TabData> {
        match self {
            Self::Tab(data) => Some(data),
            _ => None,
        }
    }

    /// Borrow the chart description, if this is one.
    pub fn chart(&self) -> Option<&ChartSpec> {
        match self {
            Self::Chart(spec) => Some(spec),
            _ => None,
        }
    }
}
