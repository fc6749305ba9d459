//! Fenced code blocks and fence tracking.
//!
//! Code fences use backticks or tildes (three or more). The closing fence
//! must use the same character and be at least as long as the opening one.

use crate::rules::FENCE;
use crate::state::BlockState;
use crate::BlockRule;

/// Tracks code fence state during line-by-line scanning.
///
/// Container rules use this to skip `:::` lines that appear inside code.
#[derive(Debug, Default)]
pub struct FenceTracker {
    /// Character of the open fence.
    fence_char: Option<char>,
    /// Length of the opening fence (minimum length for closing).
    fence_len: usize,
}

impl FenceTracker {
    /// Create a tracker outside any fence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the scan is currently inside a fenced code block.
    pub fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Feed one line. Returns `true` if it opened or closed a fence.
    pub fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();

        match self.fence_char {
            Some(ch) if is_fence_line(trimmed, ch, self.fence_len) => {
                self.fence_char = None;
                self.fence_len = 0;
                true
            }
            Some(_) => false,
            None => match detect_fence(trimmed) {
                Some((ch, len)) => {
                    self.fence_char = Some(ch);
                    self.fence_len = len;
                    true
                }
                None => false,
            },
        }
    }
}

/// Detect a fence opener. Returns the fence character and run length.
pub(crate) fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

/// Whether `trimmed` closes a fence of `expected_char` at least `min_len` long.
///
/// Only whitespace may follow the fence characters.
fn is_fence_line(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}

/// Block rule for fenced code.
///
/// Emits one `fence` token whose `info` is the text after the opening
/// fence and whose `content` is the body. A fence without a closing line
/// runs to the end of the enclosing block.
pub struct FenceRule;

impl BlockRule for FenceRule {
    fn name(&self) -> &str {
        FENCE
    }

    fn terminates_paragraph(&self) -> bool {
        true
    }

    fn run(&self, state: &mut BlockState<'_>, start: usize, end: usize, silent: bool) -> bool {
        let text = state.line_text(start);
        let Some((ch, len)) = detect_fence(text) else {
            return false;
        };

        let info = text[len..].trim();
        if ch == '`' && info.contains('`') {
            return false;
        }
        if silent {
            return true;
        }

        let indent = state.s_count[start];
        let mut next = start + 1;
        let mut closed = false;
        while next < end {
            if !state.is_empty(next) && state.s_count[next] < state.blk_indent {
                break;
            }
            if is_fence_line(state.line_text(next), ch, len) {
                closed = true;
                break;
            }
            next += 1;
        }

        let content = state.get_lines(start + 1, next, indent);
        let token = state.push("fence", "code", 0);
        token.markup = ch.to_string().repeat(len);
        token.info = info.to_owned();
        token.content = content;
        token.map = Some((start, next + usize::from(closed)));

        state.line = next + usize::from(closed);
        true
    }
}
