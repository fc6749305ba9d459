//! Attribute-style payloads on container lines.
//!
//! Parses `key="value" key='value' key=value flag` into a [`BlockConfig`].
//! Bare keys become `true`; all other values stay strings.

use folio_markdown::{BlockConfig, ConfigValue};

/// Parse an attribute payload.
///
/// Characters that cannot start a key are skipped.
pub fn parse_info_attributes(input: &str) -> BlockConfig {
    let mut config = BlockConfig::new();
    let mut remaining = input.trim();

    while !remaining.is_empty() {
        let key_len = remaining.find(|c: char| !is_key_char(c)).unwrap_or(remaining.len());
        if key_len == 0 {
            let skip = remaining.chars().next().map_or(1, char::len_utf8);
            remaining = remaining[skip..].trim_start();
            continue;
        }

        let key = &remaining[..key_len];
        let after_key = &remaining[key_len..];
        match after_key.strip_prefix('=').map(parse_value) {
            Some(Some((value, rest))) => {
                config.insert(key, value);
                remaining = rest.trim_start();
            }
            // Unterminated quote: the rest of the line belongs to this key.
            Some(None) => {
                config.insert(key, ConfigValue::Bool(true));
                remaining = "";
            }
            None => {
                config.insert(key, ConfigValue::Bool(true));
                remaining = after_key.trim_start();
            }
        }
    }

    config
}

pub(crate) fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Parse a value after `=`: `"value"`, `'value'`, or `value`.
///
/// Returns the value and the remaining input. An unterminated quote yields `None`.
fn parse_value(s: &str) -> Option<(&str, &str)> {
    for quote in ['"', '\''] {
        if let Some(stripped) = s.strip_prefix(quote) {
            let end = stripped.find(quote)?;
            return Some((&stripped[..end], &stripped[end + 1..]));
        }
    }

    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}
