// Copyright 2026 The gangway authors
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use gangway_app::{Column, InputMode, Node, SessionCommand, SessionState};
use gangway_inventory::InventorySource;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

pub const DEFAULT_PAGE_ROWS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiOptions {
    pub profile: String,
    pub page_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    InventoryLoaded(Result<Vec<Node>, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Ignored,
    Quit,
    Confirm,
    Refresh,
    Dispatch(SessionCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ViewUi {
    fetching: bool,
    scroll: usize,
}

/// Runs the interactive session until the operator confirms a host or quits.
/// Returns the confirmed hostname, or `None` on quit.
pub fn run_app(
    state: &mut SessionState,
    source: Arc<dyn InventorySource>,
    options: &UiOptions,
) -> Result<Option<String>> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let (internal_tx, internal_rx) = mpsc::channel();
    let mut view = ViewUi {
        fetching: true,
        scroll: 0,
    };
    spawn_fetch(Arc::clone(&source), internal_tx.clone(), false);

    let mut result = Ok(None);
    'session: loop {
        while let Ok(internal) = internal_rx.try_recv() {
            match internal {
                InternalEvent::InventoryLoaded(Ok(nodes)) => {
                    view.fetching = false;
                    view.scroll = 0;
                    state.dispatch(SessionCommand::ReplaceInventory(nodes));
                }
                InternalEvent::InventoryLoaded(Err(error)) => {
                    result = Err(anyhow!(error).context("fetch inventory"));
                    break 'session;
                }
            }
        }

        if let Err(error) = terminal.draw(|frame| render(frame, state, options, &view)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if !has_event {
            continue;
        }
        let Event::Key(key) = event::read().context("read event")? else {
            continue;
        };

        match map_key(state.mode(), key) {
            KeyAction::Quit => break,
            KeyAction::Confirm => {
                // With an empty visible set there is nothing to confirm.
                if let Some(hostname) = state.selected_hostname() {
                    result = Ok(Some(hostname.to_owned()));
                    break;
                }
            }
            KeyAction::Refresh => {
                if !view.fetching {
                    view.fetching = true;
                    spawn_fetch(Arc::clone(&source), internal_tx.clone(), true);
                }
            }
            KeyAction::Dispatch(command) => {
                state.dispatch(command);
                sync_scroll(&mut view, state, options.page_rows);
            }
            KeyAction::Ignored => {}
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn spawn_fetch(source: Arc<dyn InventorySource>, tx: Sender<InternalEvent>, refresh: bool) {
    thread::spawn(move || {
        let loaded = source
            .fetch_nodes(refresh)
            .map_err(|error| format!("{error:#}"));
        let _ = tx.send(InternalEvent::InventoryLoaded(loaded));
    });
}

/// Keyboard decoding, pure over the current input mode. Printable keys are
/// query text while searching, so quit/refresh shortcuts only exist outside
/// of it.
pub fn map_key(mode: InputMode, key: KeyEvent) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }

    match mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => KeyAction::Quit,
            KeyCode::Enter => KeyAction::Confirm,
            KeyCode::Char('/') => KeyAction::Dispatch(SessionCommand::BeginSearch),
            KeyCode::Char('c') => KeyAction::Dispatch(SessionCommand::BeginColumnSelect),
            KeyCode::Char('r') => KeyAction::Refresh,
            KeyCode::Up | KeyCode::Char('k') => KeyAction::Dispatch(SessionCommand::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => KeyAction::Dispatch(SessionCommand::CursorDown),
            _ => KeyAction::Ignored,
        },
        InputMode::Searching => match key.code {
            KeyCode::Esc => KeyAction::Dispatch(SessionCommand::Cancel),
            KeyCode::Enter => KeyAction::Confirm,
            KeyCode::Backspace => KeyAction::Dispatch(SessionCommand::DeleteQueryChar),
            KeyCode::Up => KeyAction::Dispatch(SessionCommand::CursorUp),
            KeyCode::Down => KeyAction::Dispatch(SessionCommand::CursorDown),
            KeyCode::Char(character) => {
                KeyAction::Dispatch(SessionCommand::AppendQueryChar(character))
            }
            _ => KeyAction::Ignored,
        },
        InputMode::ColumnSelecting => match key.code {
            KeyCode::Esc => KeyAction::Dispatch(SessionCommand::Cancel),
            KeyCode::Enter => KeyAction::Confirm,
            KeyCode::Char('q') => KeyAction::Quit,
            KeyCode::Char(digit @ '1'..='9') => {
                KeyAction::Dispatch(SessionCommand::SelectColumn(digit as usize - '0' as usize))
            }
            KeyCode::Up | KeyCode::Char('k') => KeyAction::Dispatch(SessionCommand::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => KeyAction::Dispatch(SessionCommand::CursorDown),
            _ => KeyAction::Ignored,
        },
    }
}

fn sync_scroll(view: &mut ViewUi, state: &SessionState, page_rows: usize) {
    let page = page_rows.max(1);
    if view.scroll >= state.filtered_count() {
        view.scroll = 0;
    }
    if state.cursor() < view.scroll {
        view.scroll = state.cursor();
    } else if state.cursor() >= view.scroll + page {
        view.scroll = state.cursor() + 1 - page;
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &SessionState, options: &UiOptions, view: &ViewUi) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_table(frame, layout[0], state, options, view);

    let prompt = Paragraph::new(format!("{}{}", state.prompt(), state.query()))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(prompt, layout[1]);

    let status = Paragraph::new(status_text(state, options, view))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &SessionState,
    options: &UiOptions,
    view: &ViewUi,
) {
    let columns = state.columns();
    let column_select = state.mode() == InputMode::ColumnSelecting;

    let header_cells = columns.iter().map(|column| {
        Cell::from(header_label(column, column_select)).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let page = options.page_rows.max(1);
    let rows = state
        .visible_rows()
        .into_iter()
        .enumerate()
        .skip(view.scroll)
        .take(page)
        .map(|(row_index, cells)| {
            let style = if row_index == state.cursor() {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            Row::new(cells.into_iter().map(Cell::from).collect::<Vec<_>>()).style(style)
        });

    let widths = vec![Constraint::Min(8); columns.len().max(1)];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(options.profile.clone()),
        );
    frame.render_widget(table, area);
}

// In column-select mode the header shows the digit that picks it; this is a
// display substitution only, the layout itself is unchanged.
fn header_label(column: &Column, column_select: bool) -> String {
    if column_select {
        (column.index + 1).to_string()
    } else {
        column.title.clone()
    }
}

fn status_text(state: &SessionState, options: &UiOptions, view: &ViewUi) -> String {
    if view.fetching {
        return format!("{} | loading inventory...", options.profile);
    }
    format!(
        "{} | {} | {} | {}",
        options.profile,
        state.counters_text(),
        state.mode().label(),
        key_hints(state.mode()),
    )
}

const fn key_hints(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Normal => "/ search  c columns  r refresh  enter connect  q quit",
        InputMode::Searching => "esc clear  enter connect",
        InputMode::ColumnSelecting => "1-9 choose column  esc cancel",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        KeyAction, UiOptions, ViewUi, header_label, key_hints, map_key, status_text, sync_scroll,
    };
    use gangway_app::{Column, InputMode, Node, SessionCommand, SessionState};
    use std::collections::HashMap;

    fn key(code: crossterm::event::KeyCode) -> crossterm::event::KeyEvent {
        crossterm::event::KeyEvent::new(code, crossterm::event::KeyModifiers::NONE)
    }

    fn ctrl(character: char) -> crossterm::event::KeyEvent {
        crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char(character),
            crossterm::event::KeyModifiers::CONTROL,
        )
    }

    fn loaded_state(count: usize) -> SessionState {
        let nodes = (0..count)
            .map(|index| Node {
                hostname: format!("host{index}"),
                ip: format!("10.0.0.{index}"),
                os: "Ubuntu".to_owned(),
                labels: HashMap::new(),
            })
            .collect();
        let mut state = SessionState::default();
        state.dispatch(SessionCommand::ReplaceInventory(nodes));
        state
    }

    #[test]
    fn normal_mode_maps_picker_shortcuts() {
        use crossterm::event::KeyCode;

        assert_eq!(map_key(InputMode::Normal, key(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(
            map_key(InputMode::Normal, key(KeyCode::Char('/'))),
            KeyAction::Dispatch(SessionCommand::BeginSearch),
        );
        assert_eq!(
            map_key(InputMode::Normal, key(KeyCode::Char('c'))),
            KeyAction::Dispatch(SessionCommand::BeginColumnSelect),
        );
        assert_eq!(map_key(InputMode::Normal, key(KeyCode::Char('r'))), KeyAction::Refresh);
        assert_eq!(map_key(InputMode::Normal, key(KeyCode::Enter)), KeyAction::Confirm);
        assert_eq!(
            map_key(InputMode::Normal, key(KeyCode::Char('j'))),
            KeyAction::Dispatch(SessionCommand::CursorDown),
        );
    }

    #[test]
    fn searching_mode_treats_shortcut_letters_as_query_text() {
        use crossterm::event::KeyCode;

        assert_eq!(
            map_key(InputMode::Searching, key(KeyCode::Char('q'))),
            KeyAction::Dispatch(SessionCommand::AppendQueryChar('q')),
        );
        assert_eq!(
            map_key(InputMode::Searching, key(KeyCode::Char('7'))),
            KeyAction::Dispatch(SessionCommand::AppendQueryChar('7')),
        );
        assert_eq!(
            map_key(InputMode::Searching, key(KeyCode::Backspace)),
            KeyAction::Dispatch(SessionCommand::DeleteQueryChar),
        );
        assert_eq!(
            map_key(InputMode::Searching, key(KeyCode::Esc)),
            KeyAction::Dispatch(SessionCommand::Cancel),
        );
    }

    #[test]
    fn column_select_mode_maps_digits_to_ordinals() {
        use crossterm::event::KeyCode;

        assert_eq!(
            map_key(InputMode::ColumnSelecting, key(KeyCode::Char('1'))),
            KeyAction::Dispatch(SessionCommand::SelectColumn(1)),
        );
        assert_eq!(
            map_key(InputMode::ColumnSelecting, key(KeyCode::Char('9'))),
            KeyAction::Dispatch(SessionCommand::SelectColumn(9)),
        );
        assert_eq!(
            map_key(InputMode::ColumnSelecting, key(KeyCode::Char('0'))),
            KeyAction::Ignored,
        );
        assert_eq!(
            map_key(InputMode::ColumnSelecting, key(KeyCode::Esc)),
            KeyAction::Dispatch(SessionCommand::Cancel),
        );
    }

    #[test]
    fn ctrl_c_quits_in_every_mode() {
        for mode in [
            InputMode::Normal,
            InputMode::Searching,
            InputMode::ColumnSelecting,
        ] {
            assert_eq!(map_key(mode, ctrl('c')), KeyAction::Quit);
        }
    }

    #[test]
    fn scroll_follows_the_cursor_within_one_page() {
        let mut state = loaded_state(10);
        let mut view = ViewUi::default();

        for _ in 0..6 {
            state.dispatch(SessionCommand::CursorDown);
            sync_scroll(&mut view, &state, 4);
        }
        assert_eq!(state.cursor(), 6);
        assert_eq!(view.scroll, 3);

        for _ in 0..6 {
            state.dispatch(SessionCommand::CursorUp);
            sync_scroll(&mut view, &state, 4);
        }
        assert_eq!(state.cursor(), 0);
        assert_eq!(view.scroll, 0);
    }

    #[test]
    fn scroll_resets_when_the_visible_set_shrinks() {
        let mut state = loaded_state(10);
        let mut view = ViewUi {
            fetching: false,
            scroll: 8,
        };

        state.dispatch(SessionCommand::BeginSearch);
        state.dispatch(SessionCommand::AppendQueryChar('z'));
        sync_scroll(&mut view, &state, 4);
        assert_eq!(view.scroll, 0);
    }

    #[test]
    fn header_label_substitutes_selection_digits() {
        let column = Column {
            index: 3,
            title: "env".to_owned(),
        };
        assert_eq!(header_label(&column, false), "env");
        assert_eq!(header_label(&column, true), "4");
    }

    #[test]
    fn status_line_reports_loading_then_counters() {
        let options = UiOptions {
            profile: "prod.example.com".to_owned(),
            page_rows: 15,
        };
        let state = loaded_state(2);

        let fetching = ViewUi {
            fetching: true,
            scroll: 0,
        };
        assert_eq!(
            status_text(&state, &options, &fetching),
            "prod.example.com | loading inventory...",
        );

        let idle = ViewUi::default();
        let status = status_text(&state, &options, &idle);
        assert!(status.starts_with("prod.example.com | 1/2 | normal"));
        assert!(status.contains(key_hints(InputMode::Normal)));
    }
}
