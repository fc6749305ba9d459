//! Timeline containers.
//!
//! ```text
//! ::: timeline-item {"type": "success"}
//! Shipped.
//! :::
//! ```

use folio_markdown::{BlockConfig, ConfigValue};

use super::chat::vue_props;
use crate::attrs::AttrFragment;
use crate::container::ContainerPlugin;
use crate::mapping::{ConfigMapping, prop};

/// Styling shortcut selected with `"type"`.
struct TypePreset {
    name: &'static str,
    dot_color: &'static str,
    icon: &'static str,
}

const TYPE_PRESETS: &[TypePreset] = &[
    TypePreset {
        name: "success",
        dot_color: "success",
        icon: "mdi-check-circle",
    },
    TypePreset {
        name: "info",
        dot_color: "info",
        icon: "mdi-information",
    },
    TypePreset {
        name: "warning",
        dot_color: "warning",
        icon: "mdi-alert",
    },
    TypePreset {
        name: "error",
        dot_color: "error",
        icon: "mdi-close-circle",
    },
    TypePreset {
        name: "tip",
        dot_color: "primary",
        icon: "mdi-lightbulb",
    },
];

/// Expand a known `type` into dot color, icon and a `data-preset` marker.
///
/// Unknown types (including the default `custom`) add nothing.
fn type_preset(value: &ConfigValue) -> Vec<AttrFragment> {
    let Some(preset) = value
        .as_str()
        .and_then(|name| TYPE_PRESETS.iter().find(|p| p.name == name))
    else {
        return Vec::new();
    };

    vec![
        AttrFragment::attr("dot-color", preset.dot_color),
        AttrFragment::attr("icon", preset.icon),
        AttrFragment::attr("data-preset", preset.name),
    ]
}

/// `::: timeline-item {json}` rendering `TimelineItem`.
pub fn timeline_item() -> ContainerPlugin {
    let mapping = [
        ("dotColor", "dot-color"),
        ("cardColor", "card-color"),
        ("icon", "icon"),
        ("cardIcon", "card-icon"),
        ("size", "size"),
        ("fillDot", "fill-dot"),
        ("elevation", "elevation"),
        ("card", "card"),
        ("cardIconAlign", "card-icon-align"),
        ("cardButton", "card-button"),
        ("cardButtonText", "card-button-text"),
        ("cardButtonColor", "card-button-color"),
        ("cardButtonLink", "card-button-link"),
        ("cardButtonTarget", "card-button-target"),
    ]
    .into_iter()
    .fold(ConfigMapping::new().map("type", type_preset), |mapping, (key, name)| {
        mapping.map(key, prop(name))
    });

    ContainerPlugin::new("timeline-item", "TimelineItem")
        .with_mapping(mapping)
        .with_defaults(BlockConfig::new().with("type", "custom"))
}

/// `::: timeline side="end"` wrapping items in `v-timeline`.
pub fn timeline() -> ContainerPlugin {
    ContainerPlugin::new("timeline", "v-timeline")
        .with_mapping(ConfigMapping::new().full_config(vue_props))
        .with_info_attributes()
}
