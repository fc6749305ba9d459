//! Built-in block rules.

mod fence;
mod paragraph;

pub use fence::{FenceRule, FenceTracker};
pub use paragraph::ParagraphRule;

/// Name of the fenced code rule.
pub const FENCE: &str = "fence";

/// Name of the catch-all paragraph rule. Plugins insert their rules before it.
pub const PARAGRAPH: &str = "paragraph";
