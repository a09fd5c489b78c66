mod config;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use ratatui::DefaultTerminal;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::WidgetRef;
use tagfield_tui::EditorRegistry;
use tagfield_tui::HostId;
use tagfield_tui::Renderable;
use tagfield_tui::TagEditor;
use tagfield_tui::TagEditorOptions;
use tagfield_tui::TagEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::StreamExt;

use crate::config::ConfigStore;

#[derive(Parser, Debug)]
#[command(version, about = "Interactive tag input for the terminal")]
struct Cli {
    /// Maximum number of tags the collection accepts.
    #[arg(long)]
    max_tags: Option<NonZeroUsize>,

    /// Maximum tag length, counted in characters.
    #[arg(long)]
    max_len: Option<NonZeroUsize>,

    /// Placeholder shown while the input field is empty.
    #[arg(long)]
    placeholder: Option<String>,

    /// Seed tag; repeat the flag to seed several.
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Config file to read defaults from (default: ~/.tagfield/config.toml).
    #[arg(long, env = "TAGFIELD_CONFIG")]
    config: Option<PathBuf>,
}

/// Flag beats config beats built-in default.
fn resolve_options(cli: &Cli, store: &ConfigStore) -> anyhow::Result<TagEditorOptions> {
    let defaults = TagEditorOptions::default();
    let max_tags = match cli.max_tags {
        Some(value) => value,
        None => store.max_tags()?.unwrap_or(defaults.max_tags),
    };
    let max_len = match cli.max_len {
        Some(value) => value,
        None => store.max_len()?.unwrap_or(defaults.max_len),
    };
    let placeholder = match cli.placeholder.clone() {
        Some(value) => value,
        None => store.placeholder()?.unwrap_or(defaults.placeholder),
    };
    let suggestions = store.suggestions()?.unwrap_or(defaults.suggestions);
    Ok(TagEditorOptions {
        max_tags,
        max_len,
        placeholder,
        initial_tags: cli.tags.clone(),
        suggestions,
    })
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

fn describe_event(event: &TagEvent) -> String {
    match event {
        TagEvent::Added { tags } => format!("added; tags: {}", tags.join(", ")),
        TagEvent::Removed { tags, removed_tag } => {
            format!("removed {removed_tag:?}; tags: {}", tags.join(", "))
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

fn draw(
    terminal: &mut DefaultTerminal,
    registry: &EditorRegistry,
    host: &HostId,
    log: &[String],
) -> anyhow::Result<()> {
    terminal.draw(|frame| {
        let area = frame.area();
        let Some(editor) = registry.get(host) else {
            return;
        };
        let widget_h = editor.desired_height(area.width).min(area.height);
        let widget_area = Rect::new(area.x, area.y, area.width, widget_h);
        editor.render(widget_area, frame.buffer_mut());
        if let Some((x, y)) = editor.cursor_pos(widget_area) {
            frame.set_cursor_position(Position::new(x, y));
        }

        // Scrolling event log under the widget, newest at the bottom.
        let log_top = widget_area.bottom().saturating_add(1);
        let capacity = usize::from(area.bottom().saturating_sub(log_top));
        let start = log.len().saturating_sub(capacity);
        for (row, entry) in log[start..].iter().enumerate() {
            let rect = Rect::new(area.x, log_top + row as u16, area.width, 1);
            Line::from(entry.as_str()).dim().render_ref(rect, frame.buffer_mut());
        }
    })?;
    Ok(())
}

async fn run(
    terminal: &mut DefaultTerminal,
    registry: &mut EditorRegistry,
    host: &HostId,
    tag_events: &mut UnboundedReceiver<TagEvent>,
) -> anyhow::Result<Vec<String>> {
    let mut input = EventStream::new();
    let mut log: Vec<String> = Vec::new();

    loop {
        draw(terminal, registry, host, &log)?;
        let deadline = registry.get(host).and_then(TagEditor::error_deadline);

        tokio::select! {
            maybe_event = input.next() => {
                let Some(event) = maybe_event else {
                    break;
                };
                match event.context("read terminal event")? {
                    Event::Key(key) if is_quit(&key) => break,
                    Event::Key(key) => {
                        if let Some(editor) = registry.get_mut(host) {
                            editor.handle_key_event(key);
                        }
                    }
                    Event::Mouse(mouse) => {
                        if let Some(editor) = registry.get_mut(host) {
                            editor.handle_mouse_event(mouse);
                        }
                    }
                    _ => {}
                }
            }
            Some(event) = tag_events.recv() => {
                log.push(describe_event(&event));
            }
            // Wakes exactly when the error banner expires so the redraw at
            // the top of the loop clears it.
            () = sleep_until_deadline(deadline) => {}
        }
    }

    Ok(registry
        .get(host)
        .map(|editor| editor.tags().to_vec())
        .unwrap_or_default())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let store = match &cli.config {
        Some(path) => ConfigStore::new(path.clone()),
        None => ConfigStore::new_default()?,
    };
    let options = resolve_options(&cli, &store)?;

    let mut registry = EditorRegistry::new();
    let host = HostId::new("demo");
    let editor = registry.mount(host.clone(), options);
    let mut tag_events = editor.subscribe();

    let mut terminal = ratatui::init();
    let _ = crossterm::execute!(std::io::stdout(), EnableMouseCapture);

    let result = run(&mut terminal, &mut registry, &host, &mut tag_events).await;

    let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    registry.unmount(&host);

    let tags = result?;
    for tag in &tags {
        println!("{tag}");
    }
    Ok(())
}
