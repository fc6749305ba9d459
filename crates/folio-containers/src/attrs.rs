//! Typed HTML attribute fragments and their aggregation.
//!
//! Mappers return [`AttrFragment`]s instead of preformatted attribute
//! strings. An [`AttributeSet`] collects them, merging every class and style
//! contribution into a single `class` and a single `style` attribute.

use crate::info_attrs::is_key_char;

/// One attribute contribution from a config mapper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrFragment {
    /// Literal attribute: `name="value"`.
    Static { name: String, value: String },
    /// Binding attribute evaluated by the component framework: `:name="value"`.
    Bound { name: String, value: String },
    /// Bare boolean attribute: `name`.
    Flag(String),
    /// One or more whitespace-separated class names.
    Class(String),
    /// One style declaration, e.g. `color: red`.
    Style(String),
}

impl AttrFragment {
    /// Literal attribute.
    pub fn attr(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Static {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Binding attribute.
    pub fn bound(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Bound {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Bare attribute.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::Flag(name.into())
    }

    /// Class contribution.
    pub fn class(names: impl Into<String>) -> Self {
        Self::Class(names.into())
    }

    /// Style declaration.
    pub fn style(declaration: impl Into<String>) -> Self {
        Self::Style(declaration.into())
    }
}

/// Ordered attributes plus class and style accumulators.
///
/// Attributes keep the order in which they were first added. Adding an
/// attribute whose rendered name already exists replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeSet {
    attrs: Vec<(String, Option<String>)>,
    classes: Vec<String>,
    styles: Vec<String>,
}

impl AttributeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one fragment.
    ///
    /// Attributes whose name is not made of ASCII letters, digits, `-` and
    /// `_` are dropped with a warning.
    pub fn push(&mut self, fragment: AttrFragment) {
        match fragment {
            AttrFragment::Static { name, value } if valid_name(&name) => self.set(name, Some(value)),
            AttrFragment::Bound { name, value } if valid_name(&name) => {
                self.set(format!(":{name}"), Some(value));
            }
            AttrFragment::Flag(name) if valid_name(&name) => self.set(name, None),
            AttrFragment::Static { name, .. }
            | AttrFragment::Bound { name, .. }
            | AttrFragment::Flag(name) => {
                tracing::warn!(attribute = %name, "Dropping attribute with invalid name");
            }
            AttrFragment::Class(names) => {
                for class in names.split_whitespace() {
                    if !self.classes.iter().any(|c| c == class) {
                        self.classes.push(class.to_owned());
                    }
                }
            }
            AttrFragment::Style(declaration) => {
                let declaration = declaration.trim().trim_end_matches(';').trim_end();
                if !declaration.is_empty() {
                    self.styles.push(declaration.to_owned());
                }
            }
        }
    }

    fn set(&mut self, name: String, value: Option<String>) {
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Whether nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty() && self.classes.is_empty() && self.styles.is_empty()
    }

    /// Render as an attribute string with a leading space per attribute.
    ///
    /// Plain attributes come first, then one `style`, then one `class`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            if let Some(value) = value {
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
        }
        if !self.styles.is_empty() {
            out.push_str(" style=\"");
            out.push_str(&escape_attr(&self.styles.join("; ")));
            out.push('"');
        }
        if !self.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escape_attr(&self.classes.join(" ")));
            out.push('"');
        }
        out
    }
}

impl Extend<AttrFragment> for AttributeSet {
    fn extend<I: IntoIterator<Item = AttrFragment>>(&mut self, iter: I) {
        for fragment in iter {
            self.push(fragment);
        }
    }
}

impl FromIterator<AttrFragment> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = AttrFragment>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_key_char)
}

/// Escape quotes in an attribute value.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
