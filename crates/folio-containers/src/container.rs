//! Configured container blocks: `:::name {json}` ... `:::`.
//!
//! A [`ContainerPlugin`] registers one block rule and one pair of render
//! functions for its name. The opening line may carry a single-line JSON
//! object that is merged over the plugin's defaults; the merged config is
//! stored on the open token and turned into attributes at render time.

use std::sync::Arc;

use folio_markdown::{BlockConfig, BlockRule, BlockState, MarkdownEngine, ParentType, Plugin, TokenMeta, rules};

use crate::info_attrs::parse_info_attributes;
use crate::mapping::ConfigMapping;
use crate::scan::{MIN_MARKER_LEN, find_block_end, marker_len, strip_name};

/// A container block that renders as one component.
///
/// # Example
///
/// ```
/// use folio_containers::{ConfigMapping, ContainerPlugin, mappers};
/// use folio_markdown::{BlockConfig, MarkdownEngine};
///
/// let note = ContainerPlugin::new("note", "NoteBox")
///     .with_mapping(ConfigMapping::new().map("level", mappers::prop("level")))
///     .with_defaults(BlockConfig::new().with("level", "info"));
///
/// let mut md = MarkdownEngine::new();
/// md.use_plugin(&note);
///
/// let html = md.render("::: note {\"level\": \"warn\"}\nCareful.\n:::").html;
/// assert_eq!(html, "<NoteBox level=\"warn\"><p>Careful.</p>\n</NoteBox>");
/// ```
#[derive(Clone, Debug)]
pub struct ContainerPlugin {
    name: String,
    component: String,
    mapping: ConfigMapping,
    defaults: BlockConfig,
    info_attributes: bool,
}

impl ContainerPlugin {
    /// Create a plugin for `:::name` blocks rendering as `component`.
    pub fn new(name: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            component: component.into(),
            mapping: ConfigMapping::new(),
            defaults: BlockConfig::new(),
            info_attributes: false,
        }
    }

    /// Set the mapping table.
    #[must_use]
    pub fn with_mapping(mut self, mapping: ConfigMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Set the default config.
    #[must_use]
    pub fn with_defaults(mut self, defaults: BlockConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Also accept `key="value"` attribute payloads instead of JSON.
    #[must_use]
    pub fn with_info_attributes(mut self) -> Self {
        self.info_attributes = true;
        self
    }

    /// Container name matched after the delimiter.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rendered component tag.
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Default config.
    pub fn defaults(&self) -> &BlockConfig {
        &self.defaults
    }

    /// Token kind of the opening token.
    pub fn open_kind(&self) -> String {
        format!("container_{}_open", self.name)
    }

    /// Token kind of the closing token.
    pub fn close_kind(&self) -> String {
        format!("container_{}_close", self.name)
    }

    /// Render the opening tag for `config`.
    pub fn render_open(&self, config: &BlockConfig) -> String {
        format!("<{}{}>", self.component, self.mapping.apply(config).render())
    }

    /// Render the closing tag.
    pub fn render_close(&self) -> String {
        format!("</{}>", self.component)
    }
}

impl Plugin for ContainerPlugin {
    fn install(&self, md: &mut MarkdownEngine) {
        md.block.before(
            rules::PARAGRAPH,
            ContainerRule {
                rule_name: format!("container_{}", self.name),
                open_kind: self.open_kind(),
                close_kind: self.close_kind(),
                name: self.name.clone(),
                defaults: self.defaults.clone(),
                info_attributes: self.info_attributes,
            },
        );

        let plugin = Arc::new(self.clone());
        let open = Arc::clone(&plugin);
        md.renderer.set_rule(self.open_kind(), move |tokens, idx, _env| {
            let config = tokens[idx]
                .meta
                .as_ref()
                .and_then(TokenMeta::config)
                .unwrap_or(&open.defaults);
            open.render_open(config)
        });
        md.renderer
            .set_rule(self.close_kind(), move |_tokens, _idx, _env| plugin.render_close());
    }
}

/// Block rule for one registered container name.
struct ContainerRule {
    rule_name: String,
    open_kind: String,
    close_kind: String,
    name: String,
    defaults: BlockConfig,
    info_attributes: bool,
}

impl ContainerRule {
    /// Parse the text after the name into overrides.
    fn parse_payload(&self, payload: &str, state: &mut BlockState<'_>) -> BlockConfig {
        if payload.starts_with('{') {
            match BlockConfig::from_json(payload) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(container = %self.name, error = %e, payload, "Invalid JSON config");
                    state.warn(format!("[{}] Invalid JSON config: {payload}", self.name));
                    BlockConfig::new()
                }
            }
        } else if self.info_attributes {
            parse_info_attributes(payload)
        } else {
            BlockConfig::new()
        }
    }
}

impl BlockRule for ContainerRule {
    fn name(&self) -> &str {
        &self.rule_name
    }

    fn terminates_paragraph(&self) -> bool {
        true
    }

    fn run(&self, state: &mut BlockState<'_>, start: usize, end: usize, silent: bool) -> bool {
        if state.is_code_indent(start) {
            return false;
        }
        let text = state.line_text(start);
        let marker = marker_len(text);
        if marker < MIN_MARKER_LEN {
            return false;
        }

        let info = text[marker..].trim();
        let Some(payload) = strip_name(info, &self.name, &['{']) else {
            return false;
        };

        if state.depth >= state.max_nesting {
            if !silent {
                tracing::warn!(container = %self.name, line = start, "Nesting limit reached");
                state.warn(format!(
                    "[{}] Nesting limit of {} reached at line {}",
                    self.name,
                    state.max_nesting,
                    start + 1
                ));
            }
            return false;
        }
        if silent {
            return true;
        }

        let overrides = self.parse_payload(payload.trim(), state);
        let config = BlockConfig::merged(&self.defaults, overrides);
        let block_end = find_block_end(state, start, end, marker);
        let markup = ":".repeat(marker);

        let token = state.push(self.open_kind.as_str(), "div", 1);
        token.markup.clone_from(&markup);
        token.info = info.to_owned();
        token.map = Some((start, block_end.next));
        token.meta = Some(TokenMeta::Config(config));

        let old_parent = state.parent_type;
        let old_line_max = state.line_max;
        state.parent_type = ParentType::Container;
        state.line_max = block_end.next;
        state.depth += 1;

        state.tokenize(start + 1, block_end.next);

        state.depth -= 1;
        state.line_max = old_line_max;
        state.parent_type = old_parent;

        let token = state.push(self.close_kind.as_str(), "div", -1);
        token.markup = markup;

        state.line = block_end.next + usize::from(block_end.closed);
        true
    }
}
