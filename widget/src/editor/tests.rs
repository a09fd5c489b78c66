use super::*;
use pretty_assertions::assert_eq;
use ratatui::buffer::Buffer;
use tokio::sync::mpsc::error::TryRecvError;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_str(editor: &mut TagEditor, text: &str) {
    for ch in text.chars() {
        editor.handle_key_event(key(KeyCode::Char(ch)));
    }
}

fn options_with(max_tags: usize, max_len: usize) -> TagEditorOptions {
    TagEditorOptions {
        max_tags: std::num::NonZeroUsize::new(max_tags).expect("nonzero"),
        max_len: std::num::NonZeroUsize::new(max_len).expect("nonzero"),
        ..TagEditorOptions::default()
    }
}

fn render_to_text(editor: &TagEditor, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    editor.render(area, &mut buf);
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

#[test]
fn add_tag_normalizes_before_storing() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(editor.add_tag("  Tag   One  "));
    assert_eq!(editor.tags(), ["tag one"]);
}

#[test]
fn add_tag_strips_markup_and_renders_no_markup() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(editor.add_tag("<script>alert('x')</script>"));
    let stored = &editor.tags()[0];
    for ch in ['<', '>', '"', '\'', '&'] {
        assert!(!stored.contains(ch), "{ch:?} survived into storage");
    }

    let text = render_to_text(&editor, 60, 4);
    assert!(!text.contains('<'));
    assert!(!text.contains('>'));
    assert!(!text.contains('&'));
}

#[test]
fn duplicate_add_is_rejected_case_insensitively() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(editor.add_tag("Rust"));
    assert!(!editor.add_tag("RUST"));
    assert_eq!(editor.tags(), ["rust"]);
    assert_eq!(
        editor.error_message_at(Instant::now()),
        Some("Cannot add a duplicate tag")
    );
}

#[test]
fn limit_rejection_uses_the_configured_count() {
    let mut editor = TagEditor::new(options_with(2, 50));
    assert!(editor.add_tag("one"));
    assert!(editor.add_tag("two"));
    // The first two adds succeed silently.
    assert!(!editor.error_visible_at(Instant::now()));

    assert!(!editor.add_tag("three"));
    assert_eq!(editor.tags().len(), 2);
    assert_eq!(
        editor.error_message_at(Instant::now()),
        Some("Can add at most 2 tags")
    );
}

#[test]
fn over_length_rejection_names_the_limit() {
    let mut editor = TagEditor::new(options_with(10, 5));
    assert!(!editor.add_tag("toolongtag"));
    assert_eq!(
        editor.error_message_at(Instant::now()),
        Some("Length cannot exceed 5 characters")
    );
    assert!(editor.tags().is_empty());
}

#[test]
fn blank_add_is_rejected() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(!editor.add_tag("   "));
    assert!(!editor.add_tag("<>\"'&"));
    assert_eq!(
        editor.error_message_at(Instant::now()),
        Some("Tag cannot be blank")
    );
}

#[test]
fn remove_tag_preserves_order_and_reports_the_removed_value() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    let mut events = editor.subscribe();
    assert!(editor.add_tag("a"));
    assert!(editor.add_tag("b"));
    while events.try_recv().is_ok() {}

    assert!(editor.remove_tag(0));
    assert_eq!(editor.tags(), ["b"]);
    assert_eq!(
        events.try_recv(),
        Ok(TagEvent::Removed {
            tags: vec!["b".to_string()],
            removed_tag: "a".to_string(),
        })
    );
}

#[test]
fn out_of_range_removal_is_a_silent_no_op() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    let mut events = editor.subscribe();
    assert!(editor.add_tag("a"));
    while events.try_recv().is_ok() {}

    assert!(!editor.remove_tag(5));
    assert_eq!(editor.tags(), ["a"]);
    assert!(!editor.error_visible_at(Instant::now()));
    assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
}

#[test]
fn added_event_carries_a_snapshot() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    let mut events = editor.subscribe();
    assert!(editor.add_tag("a"));
    let Ok(TagEvent::Added { tags }) = events.try_recv() else {
        panic!("expected an Added event");
    };
    assert_eq!(tags, ["a"]);

    // The payload is a copy: later mutations must not show through.
    assert!(editor.add_tag("b"));
    assert_eq!(tags, ["a"]);
}

#[test]
fn enter_submits_the_field_text() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    type_str(&mut editor, "Rust Lang");
    editor.handle_key_event(key(KeyCode::Enter));
    assert_eq!(editor.tags(), ["rust lang"]);
    // Field cleared on success.
    assert!(editor.field.is_empty());
}

#[test]
fn comma_submits_and_is_never_inserted() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    type_str(&mut editor, "rust");
    editor.handle_key_event(key(KeyCode::Char(',')));
    assert_eq!(editor.tags(), ["rust"]);
    assert!(editor.field.is_empty());
}

#[test]
fn enter_on_an_empty_field_does_nothing() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(!editor.handle_key_event(key(KeyCode::Enter)));
    assert!(editor.tags().is_empty());
    assert!(!editor.error_visible_at(Instant::now()));
}

#[test]
fn rejected_submission_keeps_the_field_text() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(editor.add_tag("rust"));
    type_str(&mut editor, "rust");
    editor.handle_key_event(key(KeyCode::Enter));
    assert_eq!(editor.field.text(), "rust");
    assert!(editor.error_visible_at(Instant::now()));
}

#[test]
fn backspace_on_an_empty_field_removes_the_last_tag() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(editor.add_tag("a"));
    assert!(editor.add_tag("b"));
    editor.handle_key_event(key(KeyCode::Backspace));
    assert_eq!(editor.tags(), ["a"]);
}

#[test]
fn chips_gain_focus_and_delete_removes_the_focused_chip() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(editor.add_tag("a"));
    assert!(editor.add_tag("b"));
    assert!(editor.add_tag("c"));

    // Left from the empty field focuses the last chip; move to the middle.
    editor.handle_key_event(key(KeyCode::Left));
    editor.handle_key_event(key(KeyCode::Left));
    assert_eq!(editor.focus, Focus::Chip(1));

    editor.handle_key_event(key(KeyCode::Delete));
    assert_eq!(editor.tags(), ["a", "c"]);
    // Removal returns focus to the field.
    assert_eq!(editor.focus, Focus::Field);
}

#[test]
fn right_past_the_last_chip_returns_to_the_field() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(editor.add_tag("a"));
    editor.handle_key_event(key(KeyCode::Left));
    assert_eq!(editor.focus, Focus::Chip(0));
    editor.handle_key_event(key(KeyCode::Right));
    assert_eq!(editor.focus, Focus::Field);
}

#[test]
fn popup_opens_for_matching_input_and_enter_adds_the_selection() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    type_str(&mut editor, "jav");
    assert!(matches!(editor.active_popup, ActivePopup::Suggest(_)));

    editor.handle_key_event(key(KeyCode::Down));
    editor.handle_key_event(key(KeyCode::Enter));
    assert_eq!(editor.tags(), ["javascript"]);
    assert!(editor.field.is_empty());
    assert!(matches!(editor.active_popup, ActivePopup::None));
}

#[test]
fn enter_without_a_popup_selection_adds_the_typed_text() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    type_str(&mut editor, "jav");
    assert!(matches!(editor.active_popup, ActivePopup::Suggest(_)));
    editor.handle_key_event(key(KeyCode::Enter));
    assert_eq!(editor.tags(), ["jav"]);
}

#[test]
fn esc_dismisses_the_popup_until_the_query_changes() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    type_str(&mut editor, "jav");
    assert!(matches!(editor.active_popup, ActivePopup::Suggest(_)));

    editor.handle_key_event(key(KeyCode::Esc));
    assert!(matches!(editor.active_popup, ActivePopup::None));

    // Same query stays dismissed; a changed query reopens.
    editor.handle_key_event(key(KeyCode::Char('a')));
    assert!(matches!(editor.active_popup, ActivePopup::Suggest(_)));
}

#[test]
fn error_banner_expires_after_the_timeout() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(!editor.add_tag(""));
    let shown_at = Instant::now();

    assert!(editor.error_visible_at(shown_at + Duration::from_millis(2900)));
    assert!(!editor.error_visible_at(shown_at + ERROR_TIMEOUT + Duration::from_millis(100)));
}

#[test]
fn a_newer_error_restarts_the_window() {
    let mut editor = TagEditor::new(options_with(1, 50));
    assert!(!editor.add_tag(""));
    let first_deadline = editor.error_deadline().expect("deadline");

    assert!(editor.add_tag("a"));
    assert!(!editor.add_tag("b"));
    let second_deadline = editor.error_deadline().expect("deadline");
    assert!(second_deadline >= first_deadline);
    assert_eq!(
        editor.error_message_at(Instant::now()),
        Some("Can add at most 1 tags")
    );
}

#[test]
fn render_shows_chips_in_order_and_the_counter() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(editor.add_tag("alpha"));
    assert!(editor.add_tag("beta"));

    let text = render_to_text(&editor, 40, 4);
    let alpha = text.find("alpha").expect("alpha rendered");
    let beta = text.find("beta").expect("beta rendered");
    assert!(alpha < beta, "insertion order must define render order");
    assert_eq!(text.matches('✕').count(), 2);
    assert!(text.contains("2 / 10"));
}

#[test]
fn render_is_idempotent() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(editor.add_tag("alpha"));
    type_str(&mut editor, "jav");

    let first = render_to_text(&editor, 40, 8);
    let second = render_to_text(&editor, 40, 8);
    assert_eq!(first, second);
}

#[test]
fn placeholder_shows_while_the_field_is_empty() {
    let editor = TagEditor::new(TagEditorOptions {
        placeholder: "add a tag".to_string(),
        ..TagEditorOptions::default()
    });
    let text = render_to_text(&editor, 40, 2);
    assert!(text.contains("add a tag"));
    assert!(text.contains("0 / 10"));
}

#[test]
fn chips_wrap_when_the_row_is_full() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(editor.add_tag("aaaaaaaa"));
    assert!(editor.add_tag("bbbbbbbb"));
    // 12 columns fits one chip per row.
    assert_eq!(editor.chip_rows(12), 2);
    assert_eq!(editor.desired_height(12), 4);
    assert_eq!(editor.chip_rows(40), 1);
}

#[test]
fn mouse_click_on_the_remove_affordance_removes_that_chip() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(editor.add_tag("ab"));
    // Render to populate the hit-test layout: chip " ab ✕ " at x 0..6.
    let _ = render_to_text(&editor, 40, 3);

    let click = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 4,
        row: 0,
        modifiers: KeyModifiers::NONE,
    };
    assert!(editor.handle_mouse_event(click));
    assert!(editor.tags().is_empty());
}

#[test]
fn mouse_click_on_a_suggestion_row_adds_that_candidate() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    type_str(&mut editor, "jav");
    // Field at row 0, candidate rows at 1 ("javascript") and 2 ("java").
    let _ = render_to_text(&editor, 40, 8);

    let click = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 5,
        row: 2,
        modifiers: KeyModifiers::NONE,
    };
    assert!(editor.handle_mouse_event(click));
    assert_eq!(editor.tags(), ["java"]);
    assert!(editor.field.is_empty());
    assert!(matches!(editor.active_popup, ActivePopup::None));
}

#[test]
fn clicks_on_clipped_away_chips_hit_nothing() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    assert!(editor.add_tag("aaaaaaaa"));
    assert!(editor.add_tag("bbbbbbbb"));
    // 12 columns wraps the second chip to row 1, which a 1-row area clips.
    let _ = render_to_text(&editor, 12, 1);

    let click = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 10,
        row: 1,
        modifiers: KeyModifiers::NONE,
    };
    assert!(!editor.handle_mouse_event(click));
    assert_eq!(editor.tags().len(), 2);
}

#[test]
fn mouse_click_outside_the_widget_closes_the_popup() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    type_str(&mut editor, "jav");
    let _ = render_to_text(&editor, 40, 8);
    assert!(matches!(editor.active_popup, ActivePopup::Suggest(_)));

    let click = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column: 5,
        row: 20,
        modifiers: KeyModifiers::NONE,
    };
    assert!(editor.handle_mouse_event(click));
    assert!(matches!(editor.active_popup, ActivePopup::None));
}

#[test]
fn initial_tags_are_normalized_and_invalid_seeds_are_skipped() {
    let editor = TagEditor::new(TagEditorOptions {
        initial_tags: vec![
            "  Rust  ".to_string(),
            "rust".to_string(), // duplicate after normalization
            "   ".to_string(),  // blank
            "x".repeat(60),     // over length
            "Go".to_string(),
        ],
        ..TagEditorOptions::default()
    });
    assert_eq!(editor.tags(), ["rust", "go"]);
}

#[test]
fn initial_tags_respect_the_collection_limit() {
    let editor = TagEditor::new(TagEditorOptions {
        initial_tags: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        ..options_with(2, 50)
    });
    assert_eq!(editor.tags(), ["a", "b"]);
}

#[test]
fn destroy_makes_the_editor_inert() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    let mut events = editor.subscribe();
    assert!(editor.add_tag("a"));
    assert!(!editor.add_tag("")); // arm the error deadline
    assert!(editor.error_deadline().is_some());

    editor.destroy();
    assert!(editor.is_destroyed());
    assert!(editor.error_deadline().is_none());

    // No handler mutates state after teardown.
    assert!(!editor.handle_key_event(key(KeyCode::Char('x'))));
    assert!(!editor.add_tag("later"));
    assert!(!editor.remove_tag(0));
    assert!(editor.tags().is_empty());

    // Subscribers observe the channel closing (after the buffered event).
    while let Ok(_event) = events.try_recv() {}
    assert_eq!(events.try_recv(), Err(TryRecvError::Disconnected));

    // Destroyed editors render nothing and take no space.
    assert_eq!(editor.desired_height(40), 0);
    let text = render_to_text(&editor, 40, 3);
    assert_eq!(text.trim(), "");
}

#[test]
fn destroy_is_idempotent() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    editor.destroy();
    editor.destroy();
    assert!(editor.is_destroyed());
}

#[test]
fn cursor_follows_the_field_text() {
    let mut editor = TagEditor::new(TagEditorOptions::default());
    let area = Rect::new(0, 0, 40, 4);
    assert_eq!(editor.cursor_pos(area), Some((2, 0)));

    type_str(&mut editor, "ab");
    assert_eq!(editor.cursor_pos(area), Some((4, 0)));

    // Chip focus hides the field cursor.
    assert!(editor.add_tag("tag"));
    editor.handle_key_event(key(KeyCode::Left));
    assert_eq!(editor.cursor_pos(area), None);
}
