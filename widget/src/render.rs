//! Rendering seam shared by the widget and its hosts.

use std::borrow::Cow;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

/// A view that projects its state into a buffer region.
///
/// Render is a pure projection of current state: calling it twice with
/// unchanged state must produce identical buffers. Hosts size the widget with
/// `desired_height` before rendering and place the terminal cursor with
/// `cursor_pos`.
pub trait Renderable {
    fn render(&self, area: Rect, buf: &mut Buffer);
    fn desired_height(&self, width: u16) -> u16;
    fn cursor_pos(&self, _area: Rect) -> Option<(u16, u16)> {
        None
    }
}

/// Strip control and escape characters from text before it reaches the
/// buffer.
///
/// Stored tags are already normalized, but the renderer must not rely on
/// that: any string drawn into a chip, the field, or the banner goes through
/// this filter so it cannot smuggle terminal control sequences into the
/// host's output. Returns the input unchanged (borrowed) in the common case.
pub(crate) fn sanitize_display(text: &str) -> Cow<'_, str> {
    if text.chars().any(char::is_control) {
        Cow::Owned(text.chars().filter(|ch| !ch.is_control()).collect())
    } else {
        Cow::Borrowed(text)
    }
}
