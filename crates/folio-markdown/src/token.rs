//! Block tokens produced by the tokenizer.

use crate::meta::TokenMeta;

/// A structured unit of the block stream, consumed by the [`Renderer`](crate::Renderer).
///
/// Container-like constructs are represented as a pair of tokens: an opening
/// token (`nesting == 1`) and a closing token (`nesting == -1`) at the same
/// depth. Leaf constructs use a single token with `nesting == 0`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Token {
    /// Token type, e.g. `markdown`, `fence`, `container_note_open`.
    pub kind: String,
    /// HTML tag hint used by the fallback renderer.
    pub tag: String,
    /// `1` for opening, `0` for self-contained, `-1` for closing.
    pub nesting: i8,
    /// Delimiter text that produced this token (e.g. `:::`, `` ``` ``).
    pub markup: String,
    /// Raw text following the delimiter on the opening line.
    pub info: String,
    /// Body text for leaf tokens.
    pub content: String,
    /// Source line range `[start, end)`.
    pub map: Option<(usize, usize)>,
    /// Whether this is a block-level token.
    pub block: bool,
    /// Typed metadata attached by the rule that produced the token.
    pub meta: Option<TokenMeta>,
}

impl Token {
    /// Create a token with the given type, tag, and nesting.
    #[must_use]
    pub fn new(kind: impl Into<String>, tag: impl Into<String>, nesting: i8) -> Self {
        Self {
            kind: kind.into(),
            tag: tag.into(),
            nesting,
            ..Self::default()
        }
    }

    /// Whether this token opens a nested region.
    pub fn is_open(&self) -> bool {
        self.nesting > 0
    }

    /// Whether this token closes a nested region.
    pub fn is_close(&self) -> bool {
        self.nesting < 0
    }
}
