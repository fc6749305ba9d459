//! Chat transcript containers.
//!
//! ```text
//! :::: chat title="Demo" max-height="400px"
//! ::: message nickname="user" avatar-type="icon"
//! Hello?
//! :::
//! ::::
//! ```

use folio_markdown::{BlockConfig, ConfigValue};

use crate::attrs::AttrFragment;
use crate::container::ContainerPlugin;
use crate::mapping::ConfigMapping;

/// Pass every config entry through as a component prop.
///
/// `true` becomes a bare attribute, `false` a `false` binding, and anything
/// else a literal attribute.
pub(crate) fn vue_props(config: &BlockConfig) -> Vec<AttrFragment> {
    config
        .iter()
        .map(|(key, value)| match value {
            ConfigValue::Bool(true) => AttrFragment::flag(key),
            ConfigValue::Bool(false) => AttrFragment::bound(key, "false"),
            ConfigValue::String(s) if s == "true" => AttrFragment::flag(key),
            ConfigValue::String(s) if s == "false" => AttrFragment::bound(key, "false"),
            other => AttrFragment::attr(key, other.to_string()),
        })
        .collect()
}

/// `:::: chat` rendering `ChatPanel`.
pub fn chat() -> ContainerPlugin {
    ContainerPlugin::new("chat", "ChatPanel")
        .with_mapping(ConfigMapping::new().full_config(vue_props))
        .with_info_attributes()
}

/// `::: message` rendering `ChatMessage`.
pub fn message() -> ContainerPlugin {
    ContainerPlugin::new("message", "ChatMessage")
        .with_mapping(ConfigMapping::new().full_config(vue_props))
        .with_info_attributes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_markdown::MarkdownEngine;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vue_props() {
        let config = BlockConfig::new()
            .with("a", true)
            .with("b", "false")
            .with("c", "x")
            .with("d", "true");
        let html: String = crate::attrs::AttributeSet::from_iter(vue_props(&config)).render();
        assert_eq!(html, r#" a :b="false" c="x" d"#);
    }

    #[test]
    fn test_chat_transcript() {
        let mut md = MarkdownEngine::new();
        md.use_plugin(&chat()).use_plugin(&message());

        let src = "\
:::: chat title=\"Demo\"
::: message nickname=\"user\" avatar-type=\"icon\"
Hello?
:::

::: message nickname=\"bot\" location=\"right\"
```js
const a = 1
```
:::
::::
";
        let html = md.render(src).html;

        assert_eq!(
            html,
            "<ChatPanel title=\"Demo\">\
             <ChatMessage avatar-type=\"icon\" nickname=\"user\"><p>Hello?</p>\n</ChatMessage>\
             <ChatMessage location=\"right\" nickname=\"bot\">\
             <pre><code class=\"language-js\">const a = 1\n</code></pre>\
             </ChatMessage></ChatPanel>"
        );
    }

    #[test]
    fn test_json_keys_cannot_inject_attributes() {
        let mut md = MarkdownEngine::new();
        md.use_plugin(&message());
        let html = md
            .render("::: message {\"x onmouseover=alert(1) y\": \"1\", \"nickname\": \"bot\"}\nhi\n:::")
            .html;
        assert_eq!(html, "<ChatMessage nickname=\"bot\"><p>hi</p>\n</ChatMessage>");
    }

    #[test]
    fn test_json_payload_still_accepted() {
        let mut md = MarkdownEngine::new();
        md.use_plugin(&message());
        let html = md.render("::: message {\"nickname\": \"x\", \"typing\": true}\n:::").html;
        assert_eq!(html, "<ChatMessage nickname=\"x\" typing></ChatMessage>");
    }
}
