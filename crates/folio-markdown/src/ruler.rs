//! Ordered block rule chain.
//!
//! Rules are tried in order at each line. The first rule that matches
//! consumes one or more lines and advances [`BlockState::line`].

use crate::state::BlockState;

/// A block-level parsing rule.
///
/// `run` is called with `silent == true` when another rule only needs to know
/// whether this rule would match at `start` (e.g. to end a paragraph). In that
/// mode the rule must not push tokens or move `state.line`.
pub trait BlockRule: Send + Sync {
    /// Unique rule name used for ordering.
    fn name(&self) -> &str;

    /// Try to match at line `start`, bounded by `end`.
    ///
    /// Returns `true` if the rule matched. In non-silent mode the rule must
    /// also advance `state.line` past the consumed lines.
    fn run(&self, state: &mut BlockState<'_>, start: usize, end: usize, silent: bool) -> bool;

    /// Whether a match of this rule ends an open paragraph.
    fn terminates_paragraph(&self) -> bool {
        false
    }
}

/// Ordered collection of block rules.
#[derive(Default)]
pub struct BlockRuler {
    rules: Vec<Box<dyn BlockRule>>,
}

impl BlockRuler {
    /// Create an empty rule chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule at the end of the chain.
    pub fn push<R: BlockRule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    /// Insert a rule directly before the rule named `anchor`.
    ///
    /// Falls back to appending when `anchor` is not registered.
    pub fn before<R: BlockRule + 'static>(&mut self, anchor: &str, rule: R) {
        match self.rules.iter().position(|r| r.name() == anchor) {
            Some(index) => self.rules.insert(index, Box::new(rule)),
            None => {
                tracing::warn!(anchor, rule = rule.name(), "Anchor rule not found, appending");
                self.rules.push(Box::new(rule));
            }
        }
    }

    /// Names of registered rules, in order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Tokenize lines `[start, end)`.
    pub(crate) fn tokenize(&self, state: &mut BlockState<'_>, start: usize, end: usize) {
        let mut line = start;

        while line < end {
            line = state.skip_empty_lines(line);
            if line >= end {
                break;
            }
            // Dedented content belongs to an enclosing block.
            if state.s_count[line] < state.blk_indent {
                break;
            }

            state.line = line;
            let mut advanced = false;
            for rule in &self.rules {
                if rule.run(state, line, end, false) {
                    if state.line > line {
                        advanced = true;
                        break;
                    }
                    tracing::warn!(rule = rule.name(), line, "Block rule matched without consuming input");
                }
            }

            if !advanced {
                state.line = line + 1;
            }
            line = state.line;
        }
    }

    /// Silently try paragraph-terminating rules at `line`.
    pub(crate) fn any_terminator_matches(&self, state: &mut BlockState<'_>, line: usize, end: usize) -> bool {
        self.rules
            .iter()
            .filter(|r| r.terminates_paragraph())
            .any(|r| r.run(state, line, end, true))
    }
}
