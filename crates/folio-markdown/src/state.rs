//! Block-level parser state with per-line cursors.

use crate::ruler::BlockRuler;
use crate::token::Token;

/// Tab stops are every four columns.
const TAB_WIDTH: usize = 4;

/// Kind of block currently enclosing the tokenizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParentType {
    /// Top level of the document.
    #[default]
    Root,
    /// Inside a quote-like container; nested paragraphs are block children.
    Container,
    /// Inside a tab section.
    Tab,
}

/// Mutable state shared by block rules during one document's parse pass.
///
/// Line `i` spans `src[b_marks[i]..e_marks[i]]` (line terminator excluded).
/// `t_shift[i]` is the byte offset of its first non-whitespace character and
/// `s_count[i]` its indentation in columns with tabs expanded.
pub struct BlockState<'a> {
    /// Full document source.
    pub src: &'a str,
    /// Tokens pushed so far.
    pub tokens: Vec<Token>,
    /// Byte offset of each line start.
    pub b_marks: Vec<usize>,
    /// Byte offset of each line end.
    pub e_marks: Vec<usize>,
    /// Leading whitespace length of each line, in bytes.
    pub t_shift: Vec<usize>,
    /// Leading whitespace width of each line, in columns.
    pub s_count: Vec<usize>,
    /// Required indentation of the current block.
    pub blk_indent: usize,
    /// Current line; rules advance it past what they consume.
    pub line: usize,
    /// Upper line bound for the current tokenize pass.
    pub line_max: usize,
    /// Kind of the enclosing block.
    pub parent_type: ParentType,
    /// Current container nesting depth.
    pub depth: usize,
    /// Maximum container nesting depth.
    pub max_nesting: usize,
    /// Diagnostics collected during the pass.
    pub warnings: Vec<String>,
    ruler: &'a BlockRuler,
}

impl<'a> BlockState<'a> {
    /// Scan `src` into line cursors.
    pub(crate) fn new(src: &'a str, ruler: &'a BlockRuler, max_nesting: usize) -> Self {
        let mut b_marks = Vec::new();
        let mut e_marks = Vec::new();
        let mut t_shift = Vec::new();
        let mut s_count = Vec::new();

        let mut pos = 0;
        for raw in src.split_inclusive('\n') {
            let line = raw.strip_suffix('\n').unwrap_or(raw);
            let line = line.strip_suffix('\r').unwrap_or(line);

            let mut shift = 0;
            let mut columns = 0;
            for byte in line.bytes() {
                match byte {
                    b' ' => columns += 1,
                    b'\t' => columns += TAB_WIDTH - columns % TAB_WIDTH,
                    _ => break,
                }
                shift += 1;
            }

            b_marks.push(pos);
            e_marks.push(pos + line.len());
            t_shift.push(shift);
            s_count.push(columns);
            pos += raw.len();
        }

        let line_max = b_marks.len();

        Self {
            src,
            tokens: Vec::new(),
            b_marks,
            e_marks,
            t_shift,
            s_count,
            blk_indent: 0,
            line: 0,
            line_max,
            parent_type: ParentType::Root,
            depth: 0,
            max_nesting,
            warnings: Vec::new(),
            ruler,
        }
    }

    /// Run the block rules over lines `[start, end)`.
    pub fn tokenize(&mut self, start: usize, end: usize) {
        let ruler = self.ruler;
        ruler.tokenize(self, start, end);
    }

    /// Check whether any paragraph-terminating rule matches at `line` (silent lookahead).
    pub fn interrupts_paragraph(&mut self, line: usize, end: usize) -> bool {
        let ruler = self.ruler;
        ruler.any_terminator_matches(self, line, end)
    }

    /// Whether the line is indented far enough to be an indented code block.
    pub fn is_code_indent(&self, line: usize) -> bool {
        self.s_count[line] >= self.blk_indent + 4
    }

    /// Whether the line has no content besides whitespace.
    pub fn is_empty(&self, line: usize) -> bool {
        self.b_marks[line] + self.t_shift[line] >= self.e_marks[line]
    }

    /// First non-empty line at or after `from`, bounded by `line_max`.
    pub fn skip_empty_lines(&self, mut from: usize) -> usize {
        while from < self.line_max && self.is_empty(from) {
            from += 1;
        }
        from
    }

    /// Line content after its indentation.
    pub fn line_text(&self, line: usize) -> &'a str {
        &self.src[self.b_marks[line] + self.t_shift[line]..self.e_marks[line]]
    }

    /// Full line content, including indentation.
    pub fn raw_line(&self, line: usize) -> &'a str {
        &self.src[self.b_marks[line]..self.e_marks[line]]
    }

    /// Join lines `[begin, end)`, stripping up to `indent` columns from each.
    ///
    /// Every line, including the last, is terminated with `\n`.
    pub fn get_lines(&self, begin: usize, end: usize, indent: usize) -> String {
        let mut out = String::new();
        for line in begin..end.min(self.line_max) {
            let raw = self.raw_line(line);
            out.push_str(strip_indent(raw, indent));
            out.push('\n');
        }
        out
    }

    /// Push a new block token and return it for further setup.
    pub fn push(&mut self, kind: impl Into<String>, tag: impl Into<String>, nesting: i8) -> &mut Token {
        let mut token = Token::new(kind, tag, nesting);
        token.block = true;
        self.tokens.push(token);
        let last = self.tokens.len() - 1;
        &mut self.tokens[last]
    }

    /// Record a diagnostic for this document.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Consume the state, returning tokens and diagnostics.
    pub(crate) fn finish(self) -> (Vec<Token>, Vec<String>) {
        (self.tokens, self.warnings)
    }
}

/// Remove up to `indent` columns of leading whitespace.
fn strip_indent(line: &str, indent: usize) -> &str {
    let mut columns = 0;
    let mut cut = 0;
    for byte in line.bytes() {
        let next = match byte {
            b' ' => columns + 1,
            b'\t' => columns + TAB_WIDTH - columns % TAB_WIDTH,
            _ => break,
        };
        if next > indent {
            break;
        }
        columns = next;
        cut += 1;
    }
    &line[cut..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn with_state(src: &str, f: impl FnOnce(&mut BlockState<'_>)) {
        let ruler = BlockRuler::new();
        let mut state = BlockState::new(src, &ruler, 20);
        f(&mut state);
    }

    #[test]
    fn test_line_marks() {
        with_state("abc\n  def\n\tghi", |state| {
            assert_eq!(state.line_max, 3);
            assert_eq!(state.b_marks, vec![0, 4, 10]);
            assert_eq!(state.e_marks, vec![3, 9, 14]);
            assert_eq!(state.t_shift, vec![0, 2, 1]);
            assert_eq!(state.s_count, vec![0, 2, 4]);
            assert_eq!(state.line_text(1), "def");
            assert_eq!(state.raw_line(1), "  def");
        });
    }

    #[test]
    fn test_trailing_newline_adds_no_line() {
        with_state("abc\n", |state| {
            assert_eq!(state.line_max, 1);
        });
        with_state("", |state| {
            assert_eq!(state.line_max, 0);
        });
    }

    #[test]
    fn test_crlf_lines() {
        with_state("a\r\nb\r\n", |state| {
            assert_eq!(state.line_max, 2);
            assert_eq!(state.line_text(0), "a");
            assert_eq!(state.line_text(1), "b");
        });
    }

    #[test]
    fn test_empty_lines() {
        with_state("a\n\n   \nb", |state| {
            assert!(!state.is_empty(0));
            assert!(state.is_empty(1));
            assert!(state.is_empty(2));
            assert_eq!(state.skip_empty_lines(1), 3);
        });
    }

    #[test]
    fn test_get_lines_strips_indent() {
        with_state("  a\n    b\nc", |state| {
            assert_eq!(state.get_lines(0, 3, 2), "a\n  b\nc\n");
            assert_eq!(state.get_lines(0, 3, 0), "  a\n    b\nc\n");
        });
    }

    #[test]
    fn test_code_indent() {
        with_state("    a\n   b\n\tc", |state| {
            assert!(state.is_code_indent(0));
            assert!(!state.is_code_indent(1));
            assert!(state.is_code_indent(2));
        });
    }

    #[test]
    fn test_push_marks_block() {
        with_state("", |state| {
            let token = state.push("test_open", "div", 1);
            token.markup = ":::".to_owned();
            assert_eq!(state.tokens.len(), 1);
            assert!(state.tokens[0].block);
            assert_eq!(state.tokens[0].markup, ":::");
        });
    }
}
