//! Terminal User Interface for the tunnel manager

mod app;
mod dashboard;
mod event;
mod fetch;
mod info;
mod logs;
mod shell;
mod timer;
mod toast;
mod ui;

pub use app::run;
pub use dashboard::Dashboard;
pub use logs::LogViewer;

use event::{Action, TuiEvent};
use ratatui::Frame;
use std::time::Instant;

/// A full-screen view driven by the runtime
///
/// Views never perform I/O themselves: they update their state from events
/// and return the side effects they want carried out.
pub trait Screen {
    /// Requests issued when the view opens
    fn init(&mut self) -> Vec<Action>;

    fn handle_event(&mut self, event: TuiEvent, now: Instant) -> Vec<Action>;

    fn draw(&self, frame: &mut Frame, now: Instant);

    fn should_quit(&self) -> bool;
}
