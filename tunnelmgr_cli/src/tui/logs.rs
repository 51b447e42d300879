//! Log viewer view-model
//!
//! The log buffer is fetched once and kept newest first. Every checkbox toggle
//! recomputes the visible lines from that buffer without touching the network.

use super::dashboard::step;
use super::event::{Action, Completion, TuiEvent};
use super::shell::Shell;
use super::ui;
use super::Screen;
use crate::api::{ApiRequest, ApiResponse};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use ratatui::Frame;
use std::time::Instant;
use tunnelmgr_common::{filter_logs, LogSelection, Provider, Severity};

pub const NO_MATCHES: &str = "No logs match the current filters.";

const PAGE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkbox<T> {
    pub value: T,
    pub checked: bool,
}

impl<T> Checkbox<T> {
    fn checked(value: T) -> Self {
        Self {
            value,
            checked: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFocus {
    Providers,
    Levels,
    Entries,
}

impl LogFocus {
    fn next(self) -> Self {
        match self {
            LogFocus::Providers => LogFocus::Levels,
            LogFocus::Levels => LogFocus::Entries,
            LogFocus::Entries => LogFocus::Providers,
        }
    }
}

pub struct LogViewer {
    pub shell: Shell,
    /// Newest line first
    pub logs: Vec<String>,
    pub logs_loaded: bool,
    pub providers: Vec<Checkbox<String>>,
    pub levels: Vec<Checkbox<Severity>>,
    /// Lines passing the current selection
    pub filtered: Vec<String>,
    pub focus: LogFocus,
    pub provider_cursor: usize,
    pub level_cursor: usize,
    /// First visible row of each checkbox list
    pub provider_offset: usize,
    pub level_offset: usize,
    /// First visible entry
    pub offset: usize,
    should_quit: bool,
}

impl Default for LogViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogViewer {
    pub fn new() -> Self {
        Self {
            shell: Shell::default(),
            logs: Vec::new(),
            logs_loaded: false,
            providers: Vec::new(),
            levels: Severity::ALL.into_iter().map(Checkbox::checked).collect(),
            filtered: Vec::new(),
            focus: LogFocus::Providers,
            provider_cursor: 0,
            level_cursor: 0,
            provider_offset: 0,
            level_offset: 0,
            offset: 0,
            should_quit: false,
        }
    }

    pub fn selection(&self) -> LogSelection {
        LogSelection::new(
            self.providers
                .iter()
                .filter(|c| c.checked)
                .map(|c| c.value.as_str()),
            self.levels.iter().filter(|c| c.checked).map(|c| c.value),
        )
    }

    /// Recompute the visible lines from the in-memory buffer
    pub fn refilter(&mut self) {
        let selection = self.selection();
        self.filtered = filter_logs(&self.logs, &selection)
            .into_iter()
            .map(str::to_string)
            .collect();
        self.offset = self.offset.min(self.filtered.len().saturating_sub(1));
    }

    pub fn set_logs(&mut self, mut logs: Vec<String>) {
        logs.reverse();
        self.logs = logs;
        self.logs_loaded = true;
        self.offset = 0;
        self.refilter();
    }

    pub fn set_providers(&mut self, providers: Vec<Provider>) {
        self.providers = providers
            .into_iter()
            .map(|p| Checkbox::checked(p.provider))
            .collect();
        self.provider_cursor = self.provider_cursor.min(self.providers.len().saturating_sub(1));
        self.follow_cursors();
        self.refilter();
    }

    /// Scroll both checkbox lists so their cursors stay visible
    fn follow_cursors(&mut self) {
        let panels = ui::log_panels(self.shell.area);
        self.provider_offset = scroll_into_view(
            self.provider_offset,
            self.provider_cursor,
            list_rows(panels.providers),
        );
        self.level_offset =
            scroll_into_view(self.level_offset, self.level_cursor, list_rows(panels.levels));
    }

    pub fn toggle_provider(&mut self, index: usize) {
        if let Some(checkbox) = self.providers.get_mut(index) {
            checkbox.checked = !checkbox.checked;
            self.refilter();
        }
    }

    pub fn toggle_level(&mut self, index: usize) {
        if let Some(checkbox) = self.levels.get_mut(index) {
            checkbox.checked = !checkbox.checked;
            self.refilter();
        }
    }

    /// Check or clear every box of the focused group
    fn set_all(&mut self, checked: bool) {
        match self.focus {
            LogFocus::Providers => self.providers.iter_mut().for_each(|c| c.checked = checked),
            LogFocus::Levels => self.levels.iter_mut().for_each(|c| c.checked = checked),
            LogFocus::Entries => return,
        }
        self.refilter();
    }

    fn scroll(&mut self, delta: isize) {
        self.offset = step(self.offset, delta, self.filtered.len());
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            LogFocus::Providers => {
                self.provider_cursor = step(self.provider_cursor, delta, self.providers.len())
            }
            LogFocus::Levels => self.level_cursor = step(self.level_cursor, delta, self.levels.len()),
            LogFocus::Entries => self.scroll(delta),
        }
        self.follow_cursors();
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Vec::new();
        }

        if self.shell.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.shell.alert = None;
            }
            return Vec::new();
        }

        if self.shell.is_loading() {
            if key.code == KeyCode::Char('q') {
                self.should_quit = true;
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::PageUp => self.scroll(-(PAGE as isize)),
            KeyCode::PageDown => self.scroll(PAGE as isize),
            KeyCode::Home => self.offset = 0,
            KeyCode::End => self.offset = self.filtered.len().saturating_sub(1),
            KeyCode::Char(' ') | KeyCode::Enter => match self.focus {
                LogFocus::Providers => self.toggle_provider(self.provider_cursor),
                LogFocus::Levels => self.toggle_level(self.level_cursor),
                LogFocus::Entries => {}
            },
            KeyCode::Char('a') => self.set_all(true),
            KeyCode::Char('n') => self.set_all(false),
            KeyCode::Char('g') => return vec![self.shell.fetch(ApiRequest::Logs, true)],
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.shell.is_loading() || self.shell.alert.is_some() {
            return;
        }

        let panels = ui::log_panels(self.shell.area);
        let position = Position::new(mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(row) = row_at(panels.providers, position) {
                    self.focus = LogFocus::Providers;
                    let index = self.provider_offset + row;
                    if index < self.providers.len() {
                        self.provider_cursor = index;
                        self.toggle_provider(index);
                    }
                } else if let Some(row) = row_at(panels.levels, position) {
                    self.focus = LogFocus::Levels;
                    let index = self.level_offset + row;
                    if index < self.levels.len() {
                        self.level_cursor = index;
                        self.toggle_level(index);
                    }
                } else if panels.entries.contains(position) {
                    self.focus = LogFocus::Entries;
                }
            }
            MouseEventKind::ScrollUp if panels.entries.contains(position) => self.scroll(-1),
            MouseEventKind::ScrollDown if panels.entries.contains(position) => self.scroll(1),
            _ => {}
        }
    }

    fn handle_completion(&mut self, completion: Completion, now: Instant) {
        match self.shell.settle(completion, now) {
            Some(ApiResponse::Logs(logs)) => self.set_logs(logs),
            Some(ApiResponse::Providers(providers)) => self.set_providers(providers),
            Some(other) => tracing::debug!("Log viewer ignores {:?}", other),
            None => {}
        }
    }
}

/// Rows available inside a bordered list
fn list_rows(area: Rect) -> usize {
    area.height.saturating_sub(2) as usize
}

/// First row to show so that `cursor` stays inside a window of `rows`
fn scroll_into_view(offset: usize, cursor: usize, rows: usize) -> usize {
    if rows == 0 || cursor < offset {
        cursor
    } else if cursor >= offset + rows {
        cursor + 1 - rows
    } else {
        offset
    }
}

/// Visible row inside a bordered list, if `position` hits one
fn row_at(area: Rect, position: Position) -> Option<usize> {
    if !area.contains(position) || area.height < 3 {
        return None;
    }
    let first = area.y + 1;
    let last = area.y + area.height - 1;
    (position.y >= first && position.y < last).then(|| (position.y - first) as usize)
}

impl Screen for LogViewer {
    fn init(&mut self) -> Vec<Action> {
        vec![
            self.shell.fetch(ApiRequest::Logs, true),
            self.shell.fetch(ApiRequest::ListProviders, true),
        ]
    }

    fn handle_event(&mut self, event: TuiEvent, now: Instant) -> Vec<Action> {
        match event {
            TuiEvent::Key(key) => return self.handle_key(key),
            TuiEvent::Mouse(mouse) => self.handle_mouse(mouse),
            TuiEvent::Resize(width, height) => {
                self.shell.resize(width, height);
                self.follow_cursors();
            }
            TuiEvent::Tick => self.shell.toasts.expire(now),
            TuiEvent::LoadingFinished => self.shell.finish_loading(),
            TuiEvent::Completed(completion) => self.handle_completion(completion, now),
            TuiEvent::Notify(message, kind) => self.shell.notify(message, kind, now),
            TuiEvent::Alert(message) => self.shell.alert(message),
            TuiEvent::Refresh | TuiEvent::ProgressTick(_) => {}
        }
        Vec::new()
    }

    fn draw(&self, frame: &mut Frame, now: Instant) {
        ui::draw_log_viewer(frame, self, now);
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }
}
