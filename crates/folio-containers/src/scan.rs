//! Delimiter scanning shared by container and tab rules.

use folio_markdown::{BlockState, FenceTracker};

/// Shortest delimiter run that opens a block.
pub(crate) const MIN_MARKER_LEN: usize = 3;

/// Length of the leading `:` run.
pub(crate) fn marker_len(text: &str) -> usize {
    text.bytes().take_while(|&b| b == b':').count()
}

/// Return the text after `name` if `info` starts with it as a whole word.
///
/// The name must be followed by the end of the line, whitespace, or one of
/// `boundaries`, so `timeline` does not claim `timeline-item` lines.
pub(crate) fn strip_name<'t>(info: &'t str, name: &str, boundaries: &[char]) -> Option<&'t str> {
    let rest = info.strip_prefix(name)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() || boundaries.contains(&c) => Some(rest),
        Some(_) => None,
    }
}

/// Where a delimited block ends.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct BlockEnd {
    /// First line after the interior: the closing line, or the line where scanning stopped.
    pub next: usize,
    /// Whether `next` is a closing delimiter line to consume.
    pub closed: bool,
}

/// Find the closing delimiter for a block opened at `start`.
///
/// A line closes the block when its leading `:` run is exactly
/// `marker` long and it is not inside a fenced code block. A non-empty
/// line indented below the current block ends the scan unclosed, as does
/// reaching `end`.
pub(crate) fn find_block_end(state: &BlockState<'_>, start: usize, end: usize, marker: usize) -> BlockEnd {
    let mut fences = FenceTracker::new();
    let mut next = start + 1;

    while next < end {
        if !state.is_empty(next) && state.s_count[next] < state.blk_indent {
            break;
        }

        let text = state.line_text(next);
        if !fences.in_fence() && marker_len(text) == marker {
            return BlockEnd { next, closed: true };
        }
        fences.update(text);
        next += 1;
    }

    BlockEnd { next, closed: false }
}
