//! Catch-all rule for plain markdown runs.

use crate::BlockRule;
use crate::rules::PARAGRAPH;
use crate::state::BlockState;

/// Collects consecutive lines into one `markdown` token.
///
/// A run ends at the first line where a paragraph-terminating rule matches,
/// at a line indented below the current block, or at `end`. Blank lines stay
/// inside the run so loose lists and multi-paragraph text render as a unit.
pub struct ParagraphRule;

impl BlockRule for ParagraphRule {
    fn name(&self) -> &str {
        PARAGRAPH
    }

    fn run(&self, state: &mut BlockState<'_>, start: usize, end: usize, silent: bool) -> bool {
        if silent {
            return false;
        }

        let mut next = start + 1;
        let mut last = start;
        while next < end {
            if state.is_empty(next) {
                next += 1;
                continue;
            }
            if state.s_count[next] < state.blk_indent || state.interrupts_paragraph(next, end) {
                break;
            }
            last = next;
            next += 1;
        }

        let content = state.get_lines(start, last + 1, state.blk_indent);
        let token = state.push("markdown", "", 0);
        token.content = content;
        token.map = Some((start, last + 1));

        state.line = last + 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::MarkdownEngine;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_lines_stay_in_run() {
        let md = MarkdownEngine::new();
        let doc = md.parse("first\n\n- a\n\n- b\n\n\n");

        assert_eq!(doc.tokens.len(), 1);
        assert_eq!(doc.tokens[0].kind, "markdown");
        assert_eq!(doc.tokens[0].content, "first\n\n- a\n\n- b\n");
        assert_eq!(doc.tokens[0].map, Some((0, 5)));
    }

    #[test]
    fn test_fence_ends_run() {
        let md = MarkdownEngine::new();
        let doc = md.parse("text\n```\ncode\n```\nmore\n");

        let kinds: Vec<&str> = doc.tokens.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, vec!["markdown", "fence", "markdown"]);
        assert_eq!(doc.tokens[0].content, "text\n");
        assert_eq!(doc.tokens[2].content, "more\n");
    }
}
