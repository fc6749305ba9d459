//! Mind-map code fences.
//!
//! ```` ```markmap ```` blocks render as a client-side `MarkMapView` whose
//! source travels percent-encoded in an attribute. Other fences go to the
//! previously registered fence renderer.

use folio_markdown::{MarkdownEngine, Plugin, escape_html};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left unescaped by URI component encoding: A-Z a-z 0-9 - _ . ! ~ * ' ( )
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Fence renderer override for `markmap`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Markmap;

impl Plugin for Markmap {
    fn install(&self, md: &mut MarkdownEngine) {
        let previous = md.renderer.take_rule("fence");
        md.renderer.set_rule("fence", move |tokens, idx, env| {
            let token = &tokens[idx];
            if token.info.trim() == "markmap" {
                let encoded = utf8_percent_encode(&token.content, URI_COMPONENT);
                return format!("<ClientOnly><MarkMapView markdown=\"{encoded}\" /></ClientOnly>");
            }
            match &previous {
                Some(render) => render(tokens, idx, env),
                None => format!("<pre><code>{}</code></pre>", escape_html(&token.content)),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_markmap_fence() {
        let mut md = MarkdownEngine::new();
        md.use_plugin(&Markmap);

        let html = md.render("```markmap\n# Root\n## Leaf (1)\n```").html;

        assert_eq!(
            html,
            "<ClientOnly><MarkMapView markdown=\"%23%20Root%0A%23%23%20Leaf%20(1)%0A\" /></ClientOnly>"
        );
    }

    #[test]
    fn test_other_fences_chain() {
        let mut md = MarkdownEngine::new();
        md.use_plugin(&Markmap);

        assert_eq!(
            md.render("```rust\nlet x = 1;\n```").html,
            "<pre><code class=\"language-rust\">let x = 1;\n</code></pre>"
        );
    }

    #[test]
    fn test_quotes_are_encoded() {
        let mut md = MarkdownEngine::new();
        md.use_plugin(&Markmap);

        let html = md.render("```markmap\n\"q\" <b>\n```").html;

        assert!(html.contains("%22q%22%20%3Cb%3E%0A"));
    }
}
