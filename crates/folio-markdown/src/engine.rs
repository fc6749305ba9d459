//! Parser and renderer registry.

use crate::renderer::{RenderEnv, Renderer};
use crate::rules::{FenceRule, ParagraphRule};
use crate::ruler::BlockRuler;
use crate::state::BlockState;
use crate::token::Token;

/// Default container nesting limit.
pub const DEFAULT_MAX_NESTING: usize = 20;

/// Engine options.
#[derive(Clone, Copy, Debug)]
pub struct EngineOptions {
    /// Maximum container nesting depth.
    pub max_nesting: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

/// An extension that registers block rules and render functions.
pub trait Plugin {
    /// Register this plugin's rules on `md`.
    fn install(&self, md: &mut MarkdownEngine);
}

/// Result of parsing a document.
#[derive(Debug, Default)]
pub struct Document {
    /// Block token stream.
    pub tokens: Vec<Token>,
    /// Diagnostics raised while parsing.
    pub warnings: Vec<String>,
}

/// Result of rendering a document.
#[derive(Debug, Default)]
pub struct RenderResult {
    /// Rendered HTML.
    pub html: String,
    /// Diagnostics raised while parsing and rendering.
    pub warnings: Vec<String>,
}

/// Markdown engine holding block rules and render functions.
///
/// Plugins are installed on one engine and affect only that engine. Parsing
/// keeps all per-document state local to the call, so an engine can render
/// any number of documents.
///
/// # Example
///
/// ```
/// use folio_markdown::MarkdownEngine;
///
/// let md = MarkdownEngine::new();
/// let result = md.render("# Hello");
/// assert_eq!(result.html, "<h1>Hello</h1>\n");
/// ```
pub struct MarkdownEngine {
    /// Block rule chain.
    pub block: BlockRuler,
    /// Render function registry.
    pub renderer: Renderer,
    options: EngineOptions,
}

impl Default for MarkdownEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownEngine {
    /// Create an engine with the built-in rules and default options.
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    /// Create an engine with the built-in rules and the given options.
    pub fn with_options(options: EngineOptions) -> Self {
        let mut block = BlockRuler::new();
        block.push(FenceRule);
        block.push(ParagraphRule);

        Self {
            block,
            renderer: Renderer::new(),
            options,
        }
    }

    /// Install a plugin, returning `self` for chaining.
    pub fn use_plugin(&mut self, plugin: &impl Plugin) -> &mut Self {
        plugin.install(self);
        self
    }

    /// Engine options.
    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Tokenize a document.
    pub fn parse(&self, src: &str) -> Document {
        let mut state = BlockState::new(src, &self.block, self.options.max_nesting);
        let end = state.line_max;
        state.tokenize(0, end);
        let (tokens, warnings) = state.finish();
        Document { tokens, warnings }
    }

    /// Render an already tokenized stream.
    pub fn render_tokens(&self, tokens: &[Token], env: &mut RenderEnv) -> String {
        self.renderer.render(tokens, env)
    }

    /// Parse and render a document.
    pub fn render(&self, src: &str) -> RenderResult {
        let Document { tokens, mut warnings } = self.parse(src);
        let mut env = RenderEnv::default();
        let html = self.render_tokens(&tokens, &mut env);
        warnings.append(&mut env.warnings);
        RenderResult { html, warnings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockRule;
    use pretty_assertions::assert_eq;

    /// Turns `!!` lines into `<hr>`-like markers.
    struct Bang;

    impl BlockRule for Bang {
        fn name(&self) -> &str {
            "bang"
        }

        fn terminates_paragraph(&self) -> bool {
            true
        }

        fn run(&self, state: &mut BlockState<'_>, start: usize, _end: usize, silent: bool) -> bool {
            if state.line_text(start) != "!!" {
                return false;
            }
            if !silent {
                state.push("bang", "hr", 0);
                state.line = start + 1;
            }
            true
        }
    }

    impl Plugin for Bang {
        fn install(&self, md: &mut MarkdownEngine) {
            md.block.before("paragraph", Bang);
            md.renderer.set_rule("bang", |_, _, _| "<hr class=\"bang\">".to_owned());
        }
    }

    #[test]
    fn test_default_rules() {
        let md = MarkdownEngine::new();
        assert_eq!(md.block.rule_names(), vec!["fence", "paragraph"]);
        assert_eq!(md.options().max_nesting, DEFAULT_MAX_NESTING);
    }

    #[test]
    fn test_render_plain_markdown() {
        let md = MarkdownEngine::new();
        let result = md.render("Some *text*.\n\nMore.");
        assert_eq!(result.html, "<p>Some <em>text</em>.</p>\n<p>More.</p>\n");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let md = MarkdownEngine::new();
        assert!(md.parse("").tokens.is_empty());
        assert_eq!(md.render("\n\n").html, "");
    }

    #[test]
    fn test_plugin_interrupts_paragraph() {
        let mut md = MarkdownEngine::new();
        md.use_plugin(&Bang);

        let result = md.render("before\n!!\nafter");

        assert_eq!(result.html, "<p>before</p>\n<hr class=\"bang\"><p>after</p>\n");
    }

    #[test]
    fn test_plugins_are_scoped_to_engine() {
        let mut with_plugin = MarkdownEngine::new();
        with_plugin.use_plugin(&Bang);
        let plain = MarkdownEngine::new();

        assert_eq!(with_plugin.block.rule_names(), vec!["fence", "bang", "paragraph"]);
        assert_eq!(plain.render("!!").html, "<p>!!</p>\n");
    }
}
