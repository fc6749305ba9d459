//! Token stream to HTML.
//!
//! Each token kind maps to one render function. Plugins register functions
//! for the token kinds they emit and may wrap an existing function by taking
//! it out with [`Renderer::take_rule`] and calling it from the replacement.

use std::collections::HashMap;

use pulldown_cmark::{Options, Parser, html};

use crate::token::Token;

/// Render function for one token kind.
///
/// Receives the whole token list and the index of the token being rendered,
/// so open rules can look ahead and close rules can look back.
pub type RenderFn = Box<dyn Fn(&[Token], usize, &mut RenderEnv) -> String + Send + Sync>;

/// Per-render environment passed to every render function.
#[derive(Debug, Default)]
pub struct RenderEnv {
    /// Diagnostics raised while rendering.
    pub warnings: Vec<String>,
}

impl RenderEnv {
    /// Record a render diagnostic.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Registry of render functions keyed by token kind.
pub struct Renderer {
    rules: HashMap<String, RenderFn>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a renderer with the built-in `markdown` and `fence` rules.
    pub fn new() -> Self {
        let mut renderer = Self {
            rules: HashMap::new(),
        };
        renderer.set_rule("markdown", |tokens, idx, _env| render_markdown(&tokens[idx].content));
        renderer.set_rule("fence", |tokens, idx, _env| {
            let token = &tokens[idx];
            let lang = token.info.split_whitespace().next();
            code_block(lang, &token.content)
        });
        renderer
    }

    /// Register or replace the render function for `kind`.
    pub fn set_rule<F>(&mut self, kind: impl Into<String>, rule: F)
    where
        F: Fn(&[Token], usize, &mut RenderEnv) -> String + Send + Sync + 'static,
    {
        self.rules.insert(kind.into(), Box::new(rule));
    }

    /// Remove and return the render function for `kind`.
    pub fn take_rule(&mut self, kind: &str) -> Option<RenderFn> {
        self.rules.remove(kind)
    }

    /// Render a token stream.
    pub fn render(&self, tokens: &[Token], env: &mut RenderEnv) -> String {
        let mut out = String::new();
        for (idx, token) in tokens.iter().enumerate() {
            match self.rules.get(&token.kind) {
                Some(rule) => out.push_str(&rule(tokens, idx, env)),
                None => out.push_str(&render_fallback(token)),
            }
        }
        out
    }
}

/// Render a markdown run with `CommonMark` plus GFM-style extensions.
fn render_markdown(content: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    let parser = Parser::new_ext(content, options);
    let mut out = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Render a code block with an optional language class.
fn code_block(lang: Option<&str>, content: &str) -> String {
    match lang {
        Some(lang) => format!(
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            escape_html(lang),
            escape_html(content)
        ),
        None => format!("<pre><code>{}</code></pre>", escape_html(content)),
    }
}

/// Plain tag emission for token kinds without a registered function.
fn render_fallback(token: &Token) -> String {
    if token.tag.is_empty() {
        return escape_html(&token.content);
    }
    match token.nesting {
        1 => format!("<{}>", token.tag),
        -1 => format!("</{}>", token.tag),
        _ => format!("<{0}>{1}</{0}>", token.tag, escape_html(&token.content)),
    }
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
