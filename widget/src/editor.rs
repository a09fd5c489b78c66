//! The tag editor is the stateful tag-input component.
//!
//! It owns the ordered tag collection, the input field, transient error
//! state, and the suggestion popup, and it mediates every key/mouse event
//! into state mutations. Data flow is unidirectional: event → normalize and
//! validate → mutate → render → emit a domain event for subscribers.
//!
//! # Key event routing
//!
//! [`TagEditor::handle_key_event`] dispatches on the current focus (the input
//! field or one of the rendered chips), consulting the suggestion popup
//! first when it is visible. After every handled key the popup is re-synced
//! against the latest field text, so popup state always follows the input.
//!
//! # Time-based error banner
//!
//! The error banner is deadline-based rather than event-based: it may become
//! invisible without any further input, so the host schedules a redraw at
//! [`TagEditor::error_deadline`] (the same contract as any transient,
//! timer-expired hint). A newer error replaces the message and restarts the
//! window; `destroy` clears the deadline so nothing fires against a
//! torn-down editor.

use std::cell::RefCell;
use std::time::Duration;
use std::time::Instant;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use ratatui::buffer::Buffer;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::WidgetRef;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::unbounded_channel;
use unicode_width::UnicodeWidthStr;

use crate::events::TagEvent;
use crate::events::TagEventSender;
use crate::field::FieldState;
use crate::normalize::normalize;
use crate::options::TagEditorOptions;
use crate::popup::SuggestPopup;
use crate::render::Renderable;
use crate::render::sanitize_display;
use crate::validation::validate;

/// How long a validation error stays visible without a newer error.
pub const ERROR_TIMEOUT: Duration = Duration::from_millis(3000);

/// Which input surface currently receives keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Field,
    Chip(usize),
}

/// Popup state – at most one can be visible at any time.
enum ActivePopup {
    None,
    Suggest(SuggestPopup),
}

struct ErrorBanner {
    message: String,
    expires_at: Instant,
}

/// Geometry captured during render, consulted for mouse hit-testing. Every
/// rect is clipped to the rendered area: what was not drawn is not clickable.
#[derive(Clone, Debug, Default)]
struct ChipLayout {
    /// Full widget area of the last render.
    widget: Rect,
    /// One rect per chip, insertion order.
    chips: Vec<Rect>,
    /// The remove affordance cell of each chip.
    removes: Vec<Rect>,
    /// One rect per visible suggestion row.
    popup_rows: Vec<Rect>,
}

pub struct TagEditor {
    tags: Vec<String>,
    options: TagEditorOptions,
    field: FieldState,
    focus: Focus,
    active_popup: ActivePopup,
    /// Query the user dismissed the popup for; suppresses reopening until the
    /// field text changes.
    dismissed_query: Option<String>,
    error: Option<ErrorBanner>,
    subscribers: Vec<TagEventSender>,
    chip_layout: RefCell<ChipLayout>,
    /// Once set, the editor is inert: no mutation, no rendering, no events.
    destroyed: bool,
}

impl TagEditor {
    pub fn new(options: TagEditorOptions) -> Self {
        let mut tags: Vec<String> = Vec::new();
        for raw in &options.initial_tags {
            let candidate = normalize(raw);
            match validate(&candidate, &tags, &options) {
                Ok(()) => tags.push(candidate),
                Err(reason) => tracing::warn!("skipping initial tag {raw:?}: {reason}"),
            }
        }

        Self {
            tags,
            options,
            field: FieldState::new(),
            focus: Focus::Field,
            active_popup: ActivePopup::None,
            dismissed_query: None,
            error: None,
            subscribers: Vec::new(),
            chip_layout: RefCell::new(ChipLayout::default()),
            destroyed: false,
        }
    }

    /// The current tag sequence, in insertion order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The options this editor was constructed with.
    pub fn options(&self) -> &TagEditorOptions {
        &self.options
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Register a listener for [`TagEvent`]s.
    ///
    /// The returned channel closes when the editor is destroyed, which is how
    /// a host knows its listener has been detached.
    pub fn subscribe(&mut self) -> UnboundedReceiver<TagEvent> {
        let (tx, rx) = unbounded_channel();
        self.subscribers.push(TagEventSender::new(tx));
        rx
    }

    fn emit(&mut self, event: TagEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()));
    }

    /// Normalize, validate, and append a tag.
    ///
    /// On success the input field is cleared, `TagEvent::Added` carries a
    /// snapshot of the collection, and `true` is returned. On rejection the
    /// rule-specific message is shown in the error banner, no state changes,
    /// and `false` is returned.
    pub fn add_tag(&mut self, raw: &str) -> bool {
        if self.destroyed {
            return false;
        }
        let candidate = normalize(raw);
        if let Err(reason) = validate(&candidate, &self.tags, &self.options) {
            tracing::debug!("rejected tag {raw:?}: {reason}");
            self.show_error(reason.to_string());
            return false;
        }

        self.tags.push(candidate);
        self.field.clear();
        self.active_popup = ActivePopup::None;
        self.dismissed_query = None;
        self.emit(TagEvent::Added {
            tags: self.tags.clone(),
        });
        true
    }

    /// Remove the tag at `index`, preserving the order of the rest.
    ///
    /// Out-of-range indices are a caller error, not a user error: the call is
    /// a silent no-op returning `false`. On success focus returns to the
    /// input field and `TagEvent::Removed` carries the post-removal snapshot
    /// plus the removed value.
    pub fn remove_tag(&mut self, index: usize) -> bool {
        if self.destroyed || index >= self.tags.len() {
            return false;
        }
        let removed_tag = self.tags.remove(index);
        self.focus = Focus::Field;
        self.emit(TagEvent::Removed {
            tags: self.tags.clone(),
            removed_tag,
        });
        true
    }

    fn show_error(&mut self, message: String) {
        // A newer error replaces the message and restarts the window.
        self.error = Some(ErrorBanner {
            message,
            expires_at: Instant::now() + ERROR_TIMEOUT,
        });
    }

    /// Whether the error banner is visible at `now`.
    pub fn error_visible_at(&self, now: Instant) -> bool {
        self.error.as_ref().is_some_and(|err| now < err.expires_at)
    }

    /// The error message visible at `now`, if any.
    pub fn error_message_at(&self, now: Instant) -> Option<&str> {
        self.error
            .as_ref()
            .filter(|err| now < err.expires_at)
            .map(|err| err.message.as_str())
    }

    /// When the current error banner expires.
    ///
    /// Hosts schedule a redraw at this instant so the banner disappears even
    /// when the UI is otherwise idle. `None` when no banner is pending.
    pub fn error_deadline(&self) -> Option<Instant> {
        if self.destroyed {
            return None;
        }
        self.error.as_ref().map(|err| err.expires_at)
    }

    /// Tear the editor down: cancel the error deadline, detach every
    /// subscriber, and clear the view. Idempotent; the editor ignores all
    /// input afterwards.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.error = None;
        self.active_popup = ActivePopup::None;
        self.dismissed_query = None;
        // Dropping the senders closes every subscriber channel.
        self.subscribers.clear();
        self.field.clear();
        self.tags.clear();
        *self.chip_layout.borrow_mut() = ChipLayout::default();
    }

    /// Handle a key event. Returns whether the view needs a redraw.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if self.destroyed || key.kind == KeyEventKind::Release {
            return false;
        }
        let redraw = match self.focus {
            Focus::Chip(index) => self.handle_chip_key(index, key),
            Focus::Field => self.handle_field_key(key),
        };
        // Popup state follows the latest field text.
        self.sync_popup();
        redraw
    }

    fn handle_field_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up => {
                if let ActivePopup::Suggest(popup) = &mut self.active_popup {
                    popup.move_up();
                    return true;
                }
                false
            }
            KeyCode::Down => {
                if let ActivePopup::Suggest(popup) = &mut self.active_popup {
                    popup.move_down();
                    return true;
                }
                false
            }
            KeyCode::Esc => {
                if let ActivePopup::Suggest(popup) = &self.active_popup {
                    // Remember the query so the popup does not immediately
                    // reopen for the same text.
                    self.dismissed_query = Some(popup.query().to_string());
                    self.active_popup = ActivePopup::None;
                    return true;
                }
                false
            }
            KeyCode::Enter => {
                if let ActivePopup::Suggest(popup) = &self.active_popup
                    && let Some(candidate) = popup.selected()
                {
                    let candidate = candidate.to_string();
                    self.add_tag(&candidate);
                    return true;
                }
                if self.field.is_empty() {
                    return false;
                }
                let raw = self.field.text().to_string();
                self.add_tag(&raw);
                true
            }
            KeyCode::Char(',')
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                // Comma submits like Enter; the separator itself is consumed
                // and never inserted. With an empty field it falls through to
                // normal typing.
                if self.field.is_empty() {
                    return self.field.handle_key(key);
                }
                let raw = self.field.text().to_string();
                self.add_tag(&raw);
                true
            }
            KeyCode::Backspace if self.field.is_empty() && !self.tags.is_empty() => {
                self.remove_tag(self.tags.len() - 1);
                true
            }
            KeyCode::Left if self.field.cursor_at_start() && !self.tags.is_empty() => {
                self.focus = Focus::Chip(self.tags.len() - 1);
                true
            }
            _ => self.field.handle_key(key),
        }
    }

    fn handle_chip_key(&mut self, index: usize, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Delete | KeyCode::Backspace => {
                // remove_tag returns focus to the field.
                self.remove_tag(index);
                true
            }
            KeyCode::Left => {
                if index > 0 {
                    self.focus = Focus::Chip(index - 1);
                    return true;
                }
                false
            }
            KeyCode::Right => {
                self.focus = if index + 1 < self.tags.len() {
                    Focus::Chip(index + 1)
                } else {
                    Focus::Field
                };
                true
            }
            KeyCode::Esc => {
                self.focus = Focus::Field;
                true
            }
            _ => false,
        }
    }

    /// Handle a mouse event. Returns whether the view needs a redraw.
    ///
    /// Hit-testing uses the geometry cached by the last render: a left click
    /// on a chip's remove affordance removes that chip, a click on a
    /// suggestion row adds that candidate, and a click anywhere outside the
    /// widget closes the suggestion popup.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> bool {
        if self.destroyed || !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return false;
        }
        let pos = Position::new(mouse.column, mouse.row);
        let layout = self.chip_layout.borrow().clone();

        if let Some(index) = layout.removes.iter().position(|rect| rect.contains(pos)) {
            self.remove_tag(index);
            self.sync_popup();
            return true;
        }

        if let Some(row) = layout.popup_rows.iter().position(|rect| rect.contains(pos))
            && let ActivePopup::Suggest(popup) = &self.active_popup
            && let Some(candidate) = popup.candidate_at(row)
        {
            let candidate = candidate.to_string();
            self.add_tag(&candidate);
            self.sync_popup();
            return true;
        }

        if !layout.widget.contains(pos) {
            if let ActivePopup::Suggest(popup) = &self.active_popup {
                self.dismissed_query = Some(popup.query().to_string());
                self.active_popup = ActivePopup::None;
                return true;
            }
        }
        false
    }

    /// Reconcile popup visibility with the current field text.
    fn sync_popup(&mut self) {
        let query = normalize(self.field.text());
        let field_focused = self.focus == Focus::Field;
        if query.is_empty() || !field_focused || self.options.suggestions.is_empty() {
            self.active_popup = ActivePopup::None;
            self.dismissed_query = None;
            return;
        }
        if self.dismissed_query.as_deref() == Some(query.as_str()) {
            self.active_popup = ActivePopup::None;
            return;
        }
        self.dismissed_query = None;

        match &mut self.active_popup {
            ActivePopup::Suggest(popup) => {
                popup.set_query(&self.options.suggestions, &query, &self.tags);
                if popup.is_empty() {
                    self.active_popup = ActivePopup::None;
                }
            }
            ActivePopup::None => {
                let popup = SuggestPopup::new(&self.options.suggestions, &query, &self.tags);
                if !popup.is_empty() {
                    self.active_popup = ActivePopup::Suggest(popup);
                }
            }
        }
    }

    fn popup_height(&self) -> u16 {
        match &self.active_popup {
            ActivePopup::Suggest(popup) => popup.desired_height(),
            ActivePopup::None => 0,
        }
    }

    /// Place chips into `area`, flowing left to right and wrapping onto new
    /// rows. Returns the per-chip rects, the remove-affordance rects, and the
    /// number of rows used.
    fn layout_chips(&self, area: Rect) -> (Vec<Rect>, Vec<Rect>, u16) {
        let mut chips = Vec::with_capacity(self.tags.len());
        let mut removes = Vec::with_capacity(self.tags.len());
        let mut x = area.x;
        let mut row = 0u16;
        for tag in &self.tags {
            let label = sanitize_display(tag);
            // " tag ✕" — padding, label, separator, remove affordance.
            let chip_w = (UnicodeWidthStr::width(label.as_ref()) as u16).saturating_add(4);
            let chip_w = chip_w.min(area.width.max(1));
            if x + chip_w > area.right() && x > area.x {
                x = area.x;
                row += 1;
            }
            let y = area.y + row;
            chips.push(Rect::new(x, y, chip_w, 1));
            removes.push(Rect::new((x + chip_w).saturating_sub(2), y, 1, 1));
            x += chip_w + 1;
        }
        let rows = if self.tags.is_empty() { 0 } else { row + 1 };
        (chips, removes, rows)
    }

    fn chip_rows(&self, width: u16) -> u16 {
        let probe = Rect::new(0, 0, width.max(1), u16::MAX);
        let (_, _, rows) = self.layout_chips(probe);
        rows
    }

    fn render_chips(&self, chips: &[Rect], buf: &mut Buffer, area: Rect) {
        let chip_style = Style::new().on_dark_gray();
        for (index, (tag, rect)) in self.tags.iter().zip(chips.iter()).enumerate() {
            let rect = rect.intersection(area);
            if rect.is_empty() {
                continue;
            }
            let label = sanitize_display(tag).into_owned();
            let focused = self.focus == Focus::Chip(index);
            let body_style = if focused {
                chip_style.reversed()
            } else {
                chip_style
            };
            let line = Line::from(vec![
                Span::styled(format!(" {label} "), body_style),
                Span::styled("✕", body_style.dim()),
                Span::styled(" ", body_style),
            ]);
            line.render_ref(rect, buf);
        }
    }

    fn counter_text(&self) -> String {
        format!("{} / {}", self.tags.len(), self.options.max_tags)
    }
}

impl Renderable for TagEditor {
    /// Project the whole widget: chip rows, the input line, the suggestion
    /// popup, and the error/counter line. The view is fully regenerated from
    /// state; rendering twice without a mutation produces identical buffers.
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if self.destroyed || area.is_empty() {
            *self.chip_layout.borrow_mut() = ChipLayout::default();
            return;
        }

        let (chips, removes, chip_rows) = self.layout_chips(area);
        self.render_chips(&chips, buf, area);

        // Input line under the chips.
        let field_y = area.y + chip_rows;
        if field_y < area.bottom() {
            let field_rect = Rect::new(area.x, field_y, area.width, 1);
            let prompt = Span::from("› ").bold();
            let text_line = if self.field.is_empty() {
                Line::from(vec![
                    prompt,
                    Span::from(sanitize_display(&self.options.placeholder).into_owned()).dim(),
                ])
            } else {
                Line::from(vec![
                    prompt,
                    Span::from(sanitize_display(self.field.text()).into_owned()),
                ])
            };
            text_line.render_ref(field_rect, buf);
        }

        // Suggestion popup directly below the input line.
        let mut popup_rows = Vec::new();
        if let ActivePopup::Suggest(popup) = &self.active_popup {
            let popup_y = field_y + 1;
            if popup_y < area.bottom() {
                let height = popup
                    .desired_height()
                    .min(area.bottom().saturating_sub(popup_y));
                let popup_rect = Rect::new(area.x, popup_y, area.width, height);
                popup.render_ref(popup_rect, buf);
                popup_rows = popup.row_rects(popup_rect);
            }
        }

        // Bottom line: error banner on the left, counter on the right.
        let status_y = area.bottom() - 1;
        let counter = self.counter_text();
        let counter_w = UnicodeWidthStr::width(counter.as_str()) as u16;
        if area.width > counter_w {
            let counter_rect = Rect::new(area.right() - counter_w, status_y, counter_w, 1);
            Line::from(counter).dim().render_ref(counter_rect, buf);
        }
        if let Some(message) = self.error_message_at(Instant::now()) {
            let message_w = area.width.saturating_sub(counter_w + 1);
            if message_w > 0 {
                let message_rect = Rect::new(area.x, status_y, message_w, 1);
                Line::from(sanitize_display(message).into_owned())
                    .red()
                    .render_ref(message_rect, buf);
            }
        }

        // Clip the cached rects to what was actually drawn so clicks on
        // clipped-away rows cannot hit anything.
        *self.chip_layout.borrow_mut() = ChipLayout {
            widget: area,
            chips: chips.iter().map(|rect| rect.intersection(area)).collect(),
            removes: removes.iter().map(|rect| rect.intersection(area)).collect(),
            popup_rows,
        };
    }

    /// Chip rows + input line + popup + status line.
    fn desired_height(&self, width: u16) -> u16 {
        if self.destroyed {
            return 0;
        }
        self.chip_rows(width) + 1 + self.popup_height() + 1
    }

    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        if self.destroyed || self.focus != Focus::Field || area.is_empty() {
            return None;
        }
        let field_y = area.y + self.chip_rows(area.width);
        if field_y >= area.bottom() {
            return None;
        }
        let x = (area.x + 2 + self.field.cursor_col()).min(area.right().saturating_sub(1));
        Some((x, field_y))
    }
}

#[cfg(test)]
mod tests;
