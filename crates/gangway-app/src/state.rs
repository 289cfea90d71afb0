// Copyright 2026 The gangway authors
// Licensed under the Apache License, Version 2.0

use crate::model::{Column, Node, derive_columns, row_cells};
use crate::search::{SearchScope, filter_nodes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Searching,
    ColumnSelecting,
}

impl InputMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Searching => "search",
            Self::ColumnSelecting => "columns",
        }
    }
}

pub const DEFAULT_PROMPT: &str = "> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    ReplaceInventory(Vec<Node>),
    BeginSearch,
    BeginColumnSelect,
    /// 1-based column digit as displayed in the header row.
    SelectColumn(usize),
    AppendQueryChar(char),
    DeleteQueryChar,
    Cancel,
    CursorUp,
    CursorDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    InventoryReplaced { total: usize },
    ModeChanged(InputMode),
    ScopeChanged(SearchScope),
    QueryChanged(String),
    VisibleChanged { filtered: usize },
    CursorMoved(usize),
}

/// Session view state. The visible set, column layout, and cursor are derived
/// and recomputed inside `dispatch`; they are never mutated independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    mode: InputMode,
    query: String,
    scope: SearchScope,
    nodes: Vec<Node>,
    columns: Vec<Column>,
    visible: Vec<Node>,
    cursor: usize,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            mode: InputMode::Normal,
            query: String::new(),
            scope: SearchScope::All,
            nodes: Vec::new(),
            columns: derive_columns(&[]),
            visible: Vec::new(),
            cursor: 0,
        }
    }
}

impl SessionState {
    pub fn dispatch(&mut self, command: SessionCommand) -> Vec<SessionEvent> {
        match command {
            SessionCommand::ReplaceInventory(nodes) => self.replace_inventory(nodes),
            SessionCommand::BeginSearch => self.begin_search(),
            SessionCommand::BeginColumnSelect => self.begin_column_select(),
            SessionCommand::SelectColumn(digit) => self.select_column(digit),
            SessionCommand::AppendQueryChar(character) => self.append_query_char(character),
            SessionCommand::DeleteQueryChar => self.delete_query_char(),
            SessionCommand::Cancel => self.cancel(),
            SessionCommand::CursorUp => self.move_cursor(-1),
            SessionCommand::CursorDown => self.move_cursor(1),
        }
    }

    /// Wholesale inventory replacement (initial fetch or explicit refresh).
    /// The search resets entirely so a column scope can never outlive a
    /// changed label layout.
    fn replace_inventory(&mut self, nodes: Vec<Node>) -> Vec<SessionEvent> {
        self.nodes = nodes;
        self.columns = derive_columns(&self.nodes);
        self.mode = InputMode::Normal;
        self.query.clear();
        self.scope = SearchScope::All;
        self.cursor = 0;
        self.visible = self.nodes.clone();
        vec![
            SessionEvent::InventoryReplaced {
                total: self.nodes.len(),
            },
            SessionEvent::VisibleChanged {
                filtered: self.visible.len(),
            },
        ]
    }

    fn begin_search(&mut self) -> Vec<SessionEvent> {
        if self.mode != InputMode::Normal {
            return Vec::new();
        }
        self.mode = InputMode::Searching;
        vec![SessionEvent::ModeChanged(self.mode)]
    }

    fn begin_column_select(&mut self) -> Vec<SessionEvent> {
        if self.mode != InputMode::Normal {
            return Vec::new();
        }
        self.mode = InputMode::ColumnSelecting;
        vec![SessionEvent::ModeChanged(self.mode)]
    }

    fn select_column(&mut self, digit: usize) -> Vec<SessionEvent> {
        // Out-of-range digits and repeat choices are silent no-ops so
        // keystroke handling stays total.
        if self.mode != InputMode::ColumnSelecting || self.scope != SearchScope::All {
            return Vec::new();
        }
        if digit == 0 || digit > self.columns.len() {
            return Vec::new();
        }
        self.scope = SearchScope::Column(digit - 1);
        self.mode = InputMode::Searching;
        let mut events = vec![
            SessionEvent::ScopeChanged(self.scope),
            SessionEvent::ModeChanged(self.mode),
        ];
        self.refresh_view(&mut events);
        events
    }

    fn append_query_char(&mut self, character: char) -> Vec<SessionEvent> {
        if self.mode != InputMode::Searching {
            return Vec::new();
        }
        self.query.push(character);
        let mut events = vec![SessionEvent::QueryChanged(self.query.clone())];
        self.refresh_view(&mut events);
        events
    }

    fn delete_query_char(&mut self) -> Vec<SessionEvent> {
        if self.mode != InputMode::Searching || self.query.pop().is_none() {
            return Vec::new();
        }
        let mut events = vec![SessionEvent::QueryChanged(self.query.clone())];
        self.refresh_view(&mut events);
        events
    }

    fn cancel(&mut self) -> Vec<SessionEvent> {
        if self.mode == InputMode::Normal {
            return Vec::new();
        }
        self.mode = InputMode::Normal;
        self.query.clear();
        self.scope = SearchScope::All;
        let mut events = vec![
            SessionEvent::ModeChanged(self.mode),
            SessionEvent::QueryChanged(String::new()),
            SessionEvent::ScopeChanged(self.scope),
        ];
        self.refresh_view(&mut events);
        events
    }

    fn move_cursor(&mut self, delta: isize) -> Vec<SessionEvent> {
        let moved = if delta < 0 {
            self.cursor.checked_sub(1)
        } else {
            Some(self.cursor + 1)
        };
        match moved {
            Some(next) if next < self.visible.len() => {
                self.cursor = next;
                vec![SessionEvent::CursorMoved(self.cursor)]
            }
            _ => Vec::new(),
        }
    }

    fn refresh_view(&mut self, events: &mut Vec<SessionEvent>) {
        let filtered_before = self.visible.len();
        self.visible = filter_nodes(&self.nodes, &self.columns, &self.query, self.scope);
        if self.visible.len() != filtered_before {
            events.push(SessionEvent::VisibleChanged {
                filtered: self.visible.len(),
            });
        }

        let cursor_before = self.cursor;
        // Reset-to-top when the cursor falls off a shrunken result set.
        if self.cursor >= self.visible.len() {
            self.cursor = 0;
        }
        if self.cursor != cursor_before {
            events.push(SessionEvent::CursorMoved(self.cursor));
        }
    }

    pub const fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub const fn scope(&self) -> SearchScope {
        self.scope
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn visible(&self) -> &[Node] {
        &self.visible
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn filtered_count(&self) -> usize {
        self.visible.len()
    }

    pub fn total_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn selected_hostname(&self) -> Option<&str> {
        self.visible.get(self.cursor).map(|node| node.hostname.as_str())
    }

    pub fn visible_rows(&self) -> Vec<Vec<String>> {
        self.visible
            .iter()
            .map(|node| row_cells(node, &self.columns))
            .collect()
    }

    pub fn prompt(&self) -> String {
        match self.scope {
            SearchScope::All => DEFAULT_PROMPT.to_owned(),
            SearchScope::Column(index) => self
                .columns
                .get(index)
                .map(|column| format!("{}> ", column.title))
                .unwrap_or_else(|| DEFAULT_PROMPT.to_owned()),
        }
    }

    pub fn counters_text(&self) -> String {
        let position = if self.visible.is_empty() {
            0
        } else {
            self.cursor + 1
        };
        if self.filtered_count() == self.total_count() {
            format!("{position}/{}", self.total_count())
        } else {
            format!(
                "{position}/{} (total: {})",
                self.filtered_count(),
                self.total_count(),
            )
        }
    }
}
