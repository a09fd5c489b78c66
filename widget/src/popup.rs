//! Suggestion popup for the tag input field.
//!
//! The popup filters a small static vocabulary by case-insensitive substring
//! match against the normalized field text and lets the user pick a candidate
//! with Up/Down + Enter. It never opens on its own while the field is empty,
//! and candidates already present in the collection are not offered again.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::WidgetRef;

use crate::render::sanitize_display;

/// Cap on visible candidate rows.
const MAX_POPUP_ROWS: usize = 6;

/// Stateful popup over the filtered vocabulary.
///
/// `selected` is `None` until the user navigates: a visible popup without an
/// explicit selection must not steal the Enter key from the plain
/// "add what I typed" path.
pub(crate) struct SuggestPopup {
    query: String,
    matches: Vec<String>,
    selected: Option<usize>,
}

impl SuggestPopup {
    pub(crate) fn new(vocabulary: &[String], query: &str, existing: &[String]) -> Self {
        let mut popup = Self {
            query: String::new(),
            matches: Vec::new(),
            selected: None,
        };
        popup.set_query(vocabulary, query, existing);
        popup
    }

    /// Refilter for a new query. An unchanged query keeps the selection;
    /// a changed one resets it.
    pub(crate) fn set_query(&mut self, vocabulary: &[String], query: &str, existing: &[String]) {
        if self.query != query {
            self.selected = None;
        }
        self.query = query.to_string();
        self.matches = vocabulary
            .iter()
            .filter(|candidate| candidate.to_lowercase().contains(query))
            .filter(|candidate| {
                let normalized = crate::normalize(candidate);
                !existing.iter().any(|tag| *tag == normalized)
            })
            .cloned()
            .collect();
        if let Some(idx) = self.selected
            && idx >= self.matches.len()
        {
            self.selected = None;
        }
    }

    pub(crate) fn query(&self) -> &str {
        &self.query
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub(crate) fn move_up(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => self.matches.len() - 1,
            Some(idx) => idx - 1,
        });
    }

    pub(crate) fn move_down(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            None => 0,
            Some(idx) if idx + 1 >= self.matches.len() => 0,
            Some(idx) => idx + 1,
        });
    }

    pub(crate) fn selected(&self) -> Option<&str> {
        self.selected
            .and_then(|idx| self.matches.get(idx))
            .map(String::as_str)
    }

    pub(crate) fn candidate_at(&self, idx: usize) -> Option<&str> {
        self.matches.get(idx).map(String::as_str)
    }

    /// One rect per visible candidate row, matching where `render_ref` draws
    /// them. Callers cache these for mouse hit-testing.
    pub(crate) fn row_rects(&self, area: Rect) -> Vec<Rect> {
        let mut rects = Vec::new();
        for idx in 0..self.matches.len().min(MAX_POPUP_ROWS) {
            let y = area.y + idx as u16;
            if y >= area.bottom() {
                break;
            }
            rects.push(Rect::new(area.x, y, area.width, 1));
        }
        rects
    }

    /// Rows plus the trailing hint line.
    pub(crate) fn desired_height(&self) -> u16 {
        let rows = self.matches.len().clamp(1, MAX_POPUP_ROWS);
        rows as u16 + 1
    }

    /// Line for one candidate, with the matched substring highlighted.
    fn candidate_line(&self, idx: usize) -> Line<'static> {
        let candidate = sanitize_display(&self.matches[idx]).into_owned();
        let is_selected = self.selected == Some(idx);
        let marker = if is_selected { "› " } else { "  " };

        let mut spans: Vec<Span<'static>> = vec![marker.into()];
        match match_range(&candidate, &self.query) {
            Some((start, end)) => {
                spans.push(candidate[..start].to_string().into());
                spans.push(Span::from(candidate[start..end].to_string()).bold());
                spans.push(candidate[end..].to_string().into());
            }
            None => spans.push(candidate.into()),
        }

        let line = Line::from(spans);
        if is_selected { line.cyan() } else { line }
    }
}

impl WidgetRef for &SuggestPopup {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }

        let visible = self.matches.len().min(MAX_POPUP_ROWS);
        let mut y = area.y;
        if visible == 0 {
            Line::from("  no matches").dim().render_ref(
                Rect::new(area.x, y, area.width, 1),
                buf,
            );
            y += 1;
        }
        for idx in 0..visible {
            if y >= area.bottom() {
                return;
            }
            self.candidate_line(idx)
                .render_ref(Rect::new(area.x, y, area.width, 1), buf);
            y += 1;
        }

        if y < area.bottom() {
            popup_hint_line().render_ref(Rect::new(area.x, y, area.width, 1), buf);
        }
    }
}

fn popup_hint_line() -> Line<'static> {
    Line::from(vec![
        "  ".into(),
        Span::from("↑/↓").bold(),
        " select  ".into(),
        Span::from("enter").bold(),
        " add  ".into(),
        Span::from("esc").bold(),
        " close".into(),
    ])
    .dim()
}

/// Byte range of the first case-insensitive occurrence of `query_lower`
/// (already lowercased) within `candidate`.
fn match_range(candidate: &str, query_lower: &str) -> Option<(usize, usize)> {
    let query_len = query_lower.chars().count();
    if query_len == 0 {
        return None;
    }
    let indexed: Vec<(usize, char)> = candidate.char_indices().collect();
    for start in 0..indexed.len() {
        let window: String = indexed[start..].iter().map(|(_, ch)| *ch).take(query_len).collect();
        if window.chars().count() == query_len && window.to_lowercase() == query_lower {
            let (start_byte, _) = indexed[start];
            let end_byte = indexed
                .get(start + query_len)
                .map(|(byte, _)| *byte)
                .unwrap_or(candidate.len());
            return Some((start_byte, end_byte));
        }
    }
    None
}
