//! Terminal runtime: owns the terminal, the event loop and every side effect

use super::event::{Action, TuiEvent};
use super::fetch::Fetcher;
use super::timer::ProgressTimer;
use super::toast::ToastKind;
use super::Screen;
use crate::api::ApiClient;
use crate::clipboard::{Clipboard, SystemClipboard};
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, interval_at, Interval};

const INPUT_POLL: Duration = Duration::from_millis(100);
const HOUSEKEEPING: Duration = Duration::from_secs(1);

/// Carries out the actions a view returns
struct Effects<C> {
    fetcher: Fetcher,
    progress: ProgressTimer,
    clipboard: C,
    tx: UnboundedSender<TuiEvent>,
}

impl<C: Clipboard> Effects<C> {
    fn new(api: ApiClient, clipboard: C, tx: UnboundedSender<TuiEvent>) -> Self {
        Self {
            fetcher: Fetcher::new(api, tx.clone()),
            progress: ProgressTimer::new(tx.clone()),
            clipboard,
            tx,
        }
    }

    fn apply(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Fetch { request, preload } => {
                    self.fetcher.dispatch(request, preload);
                }
                Action::Copy { text, success } => match self.clipboard.copy(&text) {
                    Ok(()) => self.post(TuiEvent::Notify(success.to_string(), ToastKind::Neutral)),
                    Err(e) => {
                        tracing::error!("Failed to copy: {}", e);
                        self.post(TuiEvent::Alert(format!("Failed to copy: {}", e)));
                    }
                },
                Action::OpenUrl(url) => {
                    if let Err(e) = open::that(&url) {
                        tracing::warn!("Failed to open browser: {}", e);
                        self.post(TuiEvent::Notify(
                            format!("Could not open {}", url),
                            ToastKind::Error,
                        ));
                    }
                }
                Action::StartProgress(generation) => self.progress.start(generation),
                Action::StopProgress => self.progress.cancel(),
            }
        }
    }

    fn post(&self, event: TuiEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Event loop is gone");
        }
    }
}

/// Restores the terminal when dropped, also on error paths
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

/// Run `screen` full-screen until it asks to quit
pub async fn run<S: Screen>(mut screen: S, api: ApiClient, refresh: Option<Duration>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut effects = Effects::new(api, SystemClipboard, tx);

    let mut guard = TerminalGuard::enter()?;
    let size = guard.terminal.size()?;
    screen.handle_event(TuiEvent::Resize(size.width, size.height), Instant::now());

    let actions = screen.init();
    effects.apply(actions);

    event_loop(&mut guard.terminal, &mut screen, &mut effects, &mut rx, refresh).await
}

async fn event_loop<S: Screen, C: Clipboard>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    screen: &mut S,
    effects: &mut Effects<C>,
    rx: &mut UnboundedReceiver<TuiEvent>,
    refresh: Option<Duration>,
) -> Result<()> {
    let mut input = interval(INPUT_POLL);
    let mut housekeeping = interval(HOUSEKEEPING);
    let mut refresh = refresh.map(|period| interval_at(tokio::time::Instant::now() + period, period));

    loop {
        let now = Instant::now();
        terminal.draw(|f| screen.draw(f, now))?;

        let events = tokio::select! {
            _ = input.tick() => read_input()?,
            _ = housekeeping.tick() => vec![TuiEvent::Tick],
            _ = next_refresh(&mut refresh) => vec![TuiEvent::Refresh],
            Some(event) = rx.recv() => vec![event],
        };

        for event in events {
            let actions = screen.handle_event(event, Instant::now());
            effects.apply(actions);

            if screen.should_quit() {
                return Ok(());
            }
        }
    }
}

/// Drain pending terminal input without blocking
fn read_input() -> io::Result<Vec<TuiEvent>> {
    let mut events = Vec::new();
    while event::poll(Duration::from_millis(0))? {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => events.push(TuiEvent::Key(key)),
            Event::Mouse(mouse) => events.push(TuiEvent::Mouse(mouse)),
            Event::Resize(width, height) => events.push(TuiEvent::Resize(width, height)),
            _ => {}
        }
    }
    Ok(events)
}

async fn next_refresh(refresh: &mut Option<Interval>) {
    match refresh {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
