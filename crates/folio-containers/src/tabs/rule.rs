//! Block rule for tab containers.
//!
//! ```text
//! ::: tabs#install
//! @tab Linux
//! ...
//! @tab:active macOS#mac
//! ...
//! :::
//! ```

use folio_markdown::{BlockRule, BlockState, FenceTracker, ParentType, TabData, TabsInfo, TokenMeta};

use crate::scan::{MIN_MARKER_LEN, find_block_end, marker_len, strip_name};

/// Recognizes `::: name[#]id` blocks split by `@tab` marker lines.
pub(crate) struct TabsRule {
    pub(crate) name: String,
    pub(crate) rule_name: String,
}

impl TabsRule {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            rule_name: format!("tabs_{name}"),
        }
    }
}

impl BlockRule for TabsRule {
    fn name(&self) -> &str {
        &self.rule_name
    }

    fn terminates_paragraph(&self) -> bool {
        true
    }

    fn run(&self, state: &mut BlockState<'_>, start: usize, end: usize, silent: bool) -> bool {
        if state.is_code_indent(start) {
            return false;
        }
        let text = state.line_text(start);
        let marker = marker_len(text);
        if marker < MIN_MARKER_LEN {
            return false;
        }

        let info = text[marker..].trim();
        let Some(rest) = strip_name(info, &self.name, &['#', '{']) else {
            return false;
        };

        if state.depth >= state.max_nesting {
            if !silent {
                tracing::warn!(tabs = %self.name, line = start, "Nesting limit reached");
                state.warn(format!(
                    "[{}] Nesting limit of {} reached at line {}",
                    self.name,
                    state.max_nesting,
                    start + 1
                ));
            }
            return false;
        }
        if silent {
            return true;
        }

        let rest = rest.trim();
        let id = rest.strip_prefix('#').unwrap_or(rest).trim();
        let block_end = find_block_end(state, start, end, marker);
        let markers = find_tab_markers(state, start + 1, block_end.next);

        let first_section = markers.first().map_or(block_end.next, |(line, _)| *line);
        if (start + 1..first_section).any(|line| !state.is_empty(line)) {
            tracing::warn!(tabs = %self.name, line = start, "Content before first @tab dropped");
            state.warn(format!(
                "[{}] Content before the first @tab marker at line {} was dropped",
                self.name,
                start + 1
            ));
        }

        let data: Vec<TabData> = markers.iter().map(|(_, tab)| tab.clone()).collect();
        let active = data.iter().position(|tab| tab.is_active).unwrap_or(0);
        let markup = ":".repeat(marker);

        let token = state.push(format!("{}_tabs_open", self.name), "div", 1);
        token.markup.clone_from(&markup);
        token.info = info.to_owned();
        token.map = Some((start, block_end.next));
        token.meta = Some(TokenMeta::Tabs(TabsInfo {
            id: id.to_owned(),
            active,
            data,
        }));

        let old_parent = state.parent_type;
        let old_line_max = state.line_max;
        state.parent_type = ParentType::Tab;
        state.depth += 1;

        for (i, (marker_line, tab)) in markers.iter().enumerate() {
            let section_end = markers.get(i + 1).map_or(block_end.next, |(line, _)| *line);

            let token = state.push(format!("{}_tab_open", self.name), "div", 1);
            token.info.clone_from(&tab.title);
            token.map = Some((*marker_line, section_end));
            token.meta = Some(TokenMeta::Tab(tab.clone()));

            state.line_max = section_end;
            state.tokenize(marker_line + 1, section_end);

            let token = state.push(format!("{}_tab_close", self.name), "div", -1);
            token.meta = Some(TokenMeta::Tab(tab.clone()));
        }

        state.depth -= 1;
        state.line_max = old_line_max;
        state.parent_type = old_parent;

        let token = state.push(format!("{}_tabs_close", self.name), "div", -1);
        token.markup = markup;

        state.line = block_end.next + usize::from(block_end.closed);
        true
    }
}

/// Find `@tab` marker lines belonging to this container.
///
/// Markers inside code fences or nested `:::` blocks are skipped.
fn find_tab_markers(state: &BlockState<'_>, begin: usize, end: usize) -> Vec<(usize, TabData)> {
    let mut fences = FenceTracker::new();
    let mut nested: Vec<usize> = Vec::new();
    let mut markers = Vec::new();

    for line in begin..end {
        let text = state.line_text(line);
        if fences.in_fence() {
            fences.update(text);
            continue;
        }
        if fences.update(text) {
            continue;
        }

        let run = marker_len(text);
        if run >= MIN_MARKER_LEN {
            if !text[run..].trim().is_empty() {
                nested.push(run);
            } else if nested.last() == Some(&run) {
                nested.pop();
            }
            continue;
        }

        if nested.is_empty()
            && let Some((title, id, is_active)) = parse_tab_marker(text)
        {
            let index = markers.len();
            markers.push((
                line,
                TabData {
                    title: title.to_owned(),
                    index,
                    id: id.map(str::to_owned),
                    is_active,
                },
            ));
        }
    }

    markers
}

/// Parse `@tab[:active] Title[#id]`.
fn parse_tab_marker(text: &str) -> Option<(&str, Option<&str>, bool)> {
    let rest = text.strip_prefix("@tab")?;
    let (rest, is_active) = match rest.strip_prefix(":active") {
        Some(rest) => (rest, true),
        None => (rest, false),
    };
    if rest.chars().next().is_some_and(|c| !c.is_whitespace()) {
        return None;
    }

    let title = rest.trim();
    match title.rsplit_once('#') {
        Some((name, id)) if !id.is_empty() && !id.contains(char::is_whitespace) => {
            Some((name.trim(), Some(id), is_active))
        }
        _ => Some((title, None, is_active)),
    }
}
