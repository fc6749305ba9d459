//! Tab containers.
//!
//! The tab host ([`register_tabs`]) recognizes the block syntax and emits
//! tokens; a [`TabRenderer`] decides the markup. [`TabPlugin`] is a
//! renderer driven by a config mapping, the same way container plugins are.

mod plugin;
mod rule;

use std::sync::Arc;

use folio_markdown::{MarkdownEngine, RenderEnv, TabData, TabsInfo, TokenMeta, rules};

pub use plugin::{TabConfigError, TabPlugin};
use rule::TabsRule;

/// Markup for a tab container and its tabs.
pub trait TabRenderer: Send + Sync {
    /// Opening markup for the container.
    fn open(&self, info: &TabsInfo, env: &mut RenderEnv) -> String;

    /// Closing markup for the container.
    fn close(&self) -> String;

    /// Opening markup for one tab.
    fn tab_open(&self, data: &TabData) -> String;

    /// Closing markup for one tab.
    fn tab_close(&self) -> String;
}

/// Register the tab block rule for `name` and render its tokens with `renderer`.
pub fn register_tabs(md: &mut MarkdownEngine, name: &str, renderer: Arc<dyn TabRenderer>) {
    md.block.before(rules::PARAGRAPH, TabsRule::new(name));

    let open = Arc::clone(&renderer);
    md.renderer.set_rule(format!("{name}_tabs_open"), move |tokens, idx, env| {
        match tokens[idx].meta.as_ref().and_then(TokenMeta::tabs) {
            Some(info) => open.open(info, env),
            None => open.open(&TabsInfo::default(), env),
        }
    });

    let close = Arc::clone(&renderer);
    md.renderer
        .set_rule(format!("{name}_tabs_close"), move |_, _, _| close.close());

    let tab_open = Arc::clone(&renderer);
    md.renderer.set_rule(format!("{name}_tab_open"), move |tokens, idx, _env| {
        match tokens[idx].meta.as_ref().and_then(TokenMeta::tab) {
            Some(data) => tab_open.tab_open(data),
            None => tab_open.tab_open(&TabData::default()),
        }
    });

    md.renderer
        .set_rule(format!("{name}_tab_close"), move |_, _, _| renderer.tab_close());
}
