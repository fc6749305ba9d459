//! Tab-based presets: steppers and carousels.

use folio_markdown::BlockConfig;

use crate::attrs::escape_attr;
use crate::mapping::{ConfigMapping, prop};
use crate::tabs::TabPlugin;

/// `::: stepper {json}` with one `@tab` per step, rendered as a `v-stepper`
/// whose items are the tab titles and whose steps fill numbered slots.
pub fn stepper() -> TabPlugin {
    let mapping = ConfigMapping::new()
        .map("altLabels", prop("alt-labels"))
        .map("editable", prop("editable"))
        .map("flat", prop("flat"))
        .map("nonLinear", prop("non-linear"))
        .map("hideActions", prop("hide-actions"))
        .map("color", prop("color"));

    TabPlugin::new("stepper", "v-stepper", "v-stepper-window-item")
        .with_mapping(mapping)
        .with_slots()
        .with_container_renderer(|info, _config, attrs| {
            let titles: Vec<&str> = info.data.iter().map(|tab| tab.title.as_str()).collect();
            let items = serde_json::to_string(&titles).unwrap_or_default();
            format!("<v-stepper{attrs} :items=\"{}\">", escape_attr(&items))
        })
}

/// `::: carousel {json}` with one `@tab` per slide.
pub fn carousel() -> TabPlugin {
    let mapping = ConfigMapping::new()
        .map("height", prop("height"))
        .map("cycle", prop("cycle"))
        .map("interval", prop("interval"))
        .map("showArrows", prop("show-arrows"))
        .map("hideDelimiters", prop("hide-delimiters"))
        .map("continuous", prop("continuous"));

    TabPlugin::new("carousel", "v-carousel", "v-carousel-item")
        .with_mapping(mapping)
        .with_defaults(BlockConfig::new().with("showArrows", "hover"))
}
