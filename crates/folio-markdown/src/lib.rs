//! Line-oriented markdown block tokenizer with pluggable rules.
//!
//! Documents are split into block tokens by an ordered chain of
//! [`BlockRule`]s and rendered to HTML by per-kind render functions.
//! Plain markdown runs are rendered with pulldown-cmark.
//!
//! # Architecture
//!
//! - [`BlockState`]: per-line cursors (`b_marks`, `e_marks`, `t_shift`,
//!   `s_count`) plus the token stream for one document
//! - [`BlockRuler`]: ordered rules; plugins insert theirs before `paragraph`
//! - [`Renderer`]: render functions keyed by token kind
//! - [`MarkdownEngine`]: the registry a [`Plugin`] installs itself on
//!
//! Block rules can recurse into a line sub-range with
//! [`BlockState::tokenize`], which is how container extensions nest
//! arbitrary markdown inside their fences.
//!
//! # Example
//!
//! ```
//! use folio_markdown::MarkdownEngine;
//!
//! let md = MarkdownEngine::new();
//! let result = md.render("```rust\nfn main() {}\n```");
//! assert_eq!(
//!     result.html,
//!     "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>"
//! );
//! ```

mod engine;
mod meta;
mod renderer;
mod ruler;
pub mod rules;
mod state;
mod token;

pub use engine::{DEFAULT_MAX_NESTING, Document, EngineOptions, MarkdownEngine, Plugin, RenderResult};
pub use meta::{BlockConfig, ChartSpec, ConfigValue, TabData, TabsInfo, TokenMeta};
pub use renderer::{RenderEnv, RenderFn, Renderer, escape_html};
pub use ruler::{BlockRule, BlockRuler};
pub use rules::FenceTracker;
pub use state::{BlockState, ParentType};
pub use token::Token;
