//! Config-driven tab renderer.
//!
//! The container line's id text is the JSON config:
//!
//! ```text
//! ::: stepper {"editable": true}
//! @tab Install
//! ...
//! :::
//! ```
//!
//! It is merged over the plugin defaults, checked for required keys, mapped
//! to attributes and rendered on the container component. A block whose
//! config is rejected renders an empty opening tag and a log entry.

use std::fmt;
use std::sync::Arc;

use folio_markdown::{BlockConfig, MarkdownEngine, Plugin, RenderEnv, TabData, TabsInfo};

use super::{TabRenderer, register_tabs};
use crate::mapping::ConfigMapping;

/// Custom container opening: receives the tab info, the merged config and the
/// mapped attribute string.
pub type ContainerRenderer = Arc<dyn Fn(&TabsInfo, &BlockConfig, &str) -> String + Send + Sync>;

/// Custom container closing.
pub type CloseRenderer = Arc<dyn Fn() -> String + Send + Sync>;

/// Custom opening for one tab.
pub type TabOpenRenderer = Arc<dyn Fn(&TabData) -> String + Send + Sync>;

/// Why a tab container's config was rejected.
#[derive(Debug, thiserror::Error)]
pub enum TabConfigError {
    /// The id text looked like JSON but did not parse as an object.
    #[error("Invalid JSON config for {name}: {source}")]
    InvalidJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A required key is absent after merging defaults.
    #[error("{key} is required for {name}")]
    MissingRequired { name: String, key: String },
}

/// Tab plugin rendering a container component and one element per tab.
#[derive(Clone)]
pub struct TabPlugin {
    name: String,
    container_component: String,
    tab_component: String,
    mapping: ConfigMapping,
    defaults: BlockConfig,
    required: Vec<String>,
    use_slots: bool,
    container_renderer: Option<ContainerRenderer>,
    container_close_renderer: Option<CloseRenderer>,
    tab_renderer: Option<TabOpenRenderer>,
    slot_pattern: Option<TabOpenRenderer>,
}

impl TabPlugin {
    /// Create a plugin for `::: name` rendering `container_component` around
    /// one `tab_component` per tab.
    pub fn new(
        name: impl Into<String>,
        container_component: impl Into<String>,
        tab_component: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            container_component: container_component.into(),
            tab_component: tab_component.into(),
            mapping: ConfigMapping::new(),
            defaults: BlockConfig::new(),
            required: Vec::new(),
            use_slots: false,
            container_renderer: None,
            container_close_renderer: None,
            tab_renderer: None,
            slot_pattern: None,
        }
    }

    #[must_use]
    pub fn with_mapping(mut self, mapping: ConfigMapping) -> Self {
        self.mapping = mapping;
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: BlockConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Keys that must be present after merging defaults.
    #[must_use]
    pub fn with_required<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Wrap each tab in a named slot template instead of `tab_component`.
    #[must_use]
    pub fn with_slots(mut self) -> Self {
        self.use_slots = true;
        self
    }

    #[must_use]
    pub fn with_container_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&TabsInfo, &BlockConfig, &str) -> String + Send + Sync + 'static,
    {
        self.container_renderer = Some(Arc::new(renderer));
        self
    }

    #[must_use]
    pub fn with_container_close_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.container_close_renderer = Some(Arc::new(renderer));
        self
    }

    #[must_use]
    pub fn with_tab_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&TabData) -> String + Send + Sync + 'static,
    {
        self.tab_renderer = Some(Arc::new(renderer));
        self
    }

    /// Custom slot opening; only used together with [`with_slots`](Self::with_slots).
    #[must_use]
    pub fn with_slot_pattern<F>(mut self, pattern: F) -> Self
    where
        F: Fn(&TabData) -> String + Send + Sync + 'static,
    {
        self.slot_pattern = Some(Arc::new(pattern));
        self
    }

    /// Container name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Merge the id text over the defaults and validate required keys.
    ///
    /// Id text not starting with `{` is a plain id and contributes no config.
    pub fn resolve_config(&self, id: &str) -> Result<BlockConfig, TabConfigError> {
        let id = id.trim();
        let overrides = if id.starts_with('{') {
            BlockConfig::from_json(id).map_err(|source| TabConfigError::InvalidJson {
                name: self.name.clone(),
                source,
            })?
        } else {
            BlockConfig::new()
        };

        let config = BlockConfig::merged(&self.defaults, overrides);
        if let Some(key) = self.required.iter().find(|key| !config.contains_key(key)) {
            return Err(TabConfigError::MissingRequired {
                name: self.name.clone(),
                key: key.clone(),
            });
        }
        Ok(config)
    }
}

impl TabRenderer for TabPlugin {
    fn open(&self, info: &TabsInfo, env: &mut RenderEnv) -> String {
        let config = match self.resolve_config(&info.id) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(tabs = %self.name, error = %e, "Error parsing tab config");
                env.warn(e.to_string());
                return String::new();
            }
        };

        let attrs = self.mapping.apply(&config).render();
        match &self.container_renderer {
            Some(renderer) => renderer(info, &config, &attrs),
            None => format!("<{}{attrs}>", self.container_component),
        }
    }

    fn close(&self) -> String {
        match &self.container_close_renderer {
            Some(renderer) => renderer(),
            None => format!("</{}>", self.container_component),
        }
    }

    fn tab_open(&self, data: &TabData) -> String {
        if let Some(renderer) = &self.tab_renderer {
            return renderer(data);
        }
        if self.use_slots {
            return match &self.slot_pattern {
                Some(pattern) => pattern(data),
                None => format!("<template v-slot:item.{}>", data.index + 1),
            };
        }
        format!("<{}>", self.tab_component)
    }

    fn tab_close(&self) -> String {
        if self.use_slots {
            "</template>".to_owned()
        } else {
            format!("</{}>", self.tab_component)
        }
    }
}

impl Plugin for TabPlugin {
    fn install(&self, md: &mut MarkdownEngine) {
        register_tabs(md, &self.name, Arc::new(self.clone()));
    }
}

impl fmt::Debug for TabPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabPlugin")
            .field("name", &self.name)
            .field("container_component", &self.container_component)
            .field("tab_component", &self.tab_component)
            .field("mapping", &self.mapping)
            .field("defaults", &self.defaults)
            .field("required", &self.required)
            .field("use_slots", &self.use_slots)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::prop;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn gallery() -> TabPlugin {
        TabPlugin::new("gallery", "Gallery", "GalleryItem")
            .with_mapping(ConfigMapping::new().map("height", prop("height")))
            .with_defaults(BlockConfig::new().with("height", 300))
    }

    fn render(plugin: &TabPlugin, src: &str) -> (String, Vec<String>) {
        let mut md = MarkdownEngine::new();
        md.use_plugin(plugin);
        let result = md.render(src);
        (result.html, result.warnings)
    }

    #[test]
    fn test_default_tags() {
        let (html, warnings) = render(&gallery(), "::: gallery\n@tab A\na\n@tab B\nb\n:::");

        assert_eq!(
            html,
            "<Gallery :height=\"300\"><GalleryItem><p>a</p>\n</GalleryItem>\
             <GalleryItem><p>b</p>\n</GalleryItem></Gallery>"
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_json_id_overrides_defaults() {
        let (html, _) = render(&gallery(), "::: gallery {\"height\": \"50vh\"}\n@tab A\n:::");
        assert_eq!(html, "<Gallery height=\"50vh\"><GalleryItem></GalleryItem></Gallery>");
    }

    #[test]
    fn test_plain_id_keeps_defaults() {
        let (html, _) = render(&gallery(), "::: gallery#photos\n@tab A\n:::");
        assert_eq!(html, "<Gallery :height=\"300\"><GalleryItem></GalleryItem></Gallery>");
    }

    #[test]
    #[traced_test]
    fn test_missing_required_renders_empty_open() {
        let plugin = gallery().with_required(["source"]);

        let (html, warnings) = render(&plugin, "::: gallery\n@tab A\n:::");

        assert_eq!(html, "<GalleryItem></GalleryItem></Gallery>");
        assert_eq!(warnings, vec!["source is required for gallery".to_owned()]);
        assert!(logs_contain("Error parsing tab config"));
    }

    #[test]
    #[traced_test]
    fn test_invalid_json_renders_empty_open() {
        let (html, warnings) = render(&gallery(), "::: gallery {oops\n@tab A\n:::");

        assert!(html.starts_with("<GalleryItem>"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Invalid JSON config for gallery"));
        assert!(logs_contain("Error parsing tab config"));
    }

    #[test]
    fn test_required_satisfied_by_defaults() {
        let plugin = gallery().with_required(["height"]);
        assert!(plugin.resolve_config("").is_ok());
        assert!(matches!(
            gallery().with_required(["x"]).resolve_config("{\"y\": 1}"),
            Err(TabConfigError::MissingRequired { key, .. }) if key == "x"
        ));
    }

    #[test]
    fn test_slot_mode() {
        let plugin = TabPlugin::new("steps", "v-stepper", "unused").with_slots();
        let (html, _) = render(&plugin, "::: steps\n@tab One\n@tab Two\n:::");

        assert_eq!(
            html,
            "<v-stepper><template v-slot:item.1></template><template v-slot:item.2></template></v-stepper>"
        );
    }

    #[test]
    fn test_slot_pattern() {
        let plugin = TabPlugin::new("steps", "Steps", "unused")
            .with_slots()
            .with_slot_pattern(|data| format!("<template #{}>", data.id.as_deref().unwrap_or("x")));
        let (html, _) = render(&plugin, "::: steps\n@tab One#first\n:::");

        assert_eq!(html, "<Steps><template #first></template></Steps>");
    }

    #[test]
    fn test_custom_renderers() {
        let plugin = gallery()
            .with_container_renderer(|info, config, attrs| {
                format!("<Wrap n=\"{}\" h=\"{}\"{attrs}>", info.data.len(), config.display_or("height", "?"))
            })
            .with_container_close_renderer(|| "</Wrap>".to_owned())
            .with_tab_renderer(|data| format!("<Item title=\"{}\">", data.title));

        let (html, _) = render(&plugin, "::: gallery\n@tab A\n@tab B\n:::");

        assert_eq!(
            html,
            "<Wrap n=\"2\" h=\"300\" :height=\"300\"><Item title=\"A\"></GalleryItem>\
             <Item title=\"B\"></GalleryItem></Wrap>"
        );
    }
}
