//! Dashboard view-model: tunnel cards, provider panel and the detail modal

use super::event::{Action, Completion, TuiEvent};
use super::info::{DetailState, InfoModal};
use super::shell::{Shell, FETCH_FAILED};
use super::toast::ToastKind;
use super::ui;
use super::Screen;
use crate::api::{ApiRequest, ApiResponse};
use crate::clock::wall_clock_ms;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;
use ratatui::Frame;
use std::time::Instant;
use tunnelmgr_common::constants::{EXPIRY_MAX_MINUTES, EXPIRY_MIN_MINUTES};
use tunnelmgr_common::{Provider, ProviderToggle, RestartScope, StatusMessage, Tunnel, TunnelDetail};

pub const COPIED: &str = "Copied to clipboard!";
pub const COPIED_ALL: &str = "All tunnels copied to clipboard!";
pub const UNAVAILABLE: &str = "This tunnel is unavailable.";
pub const STOPPED: &str = "Tunnel stopped successfully.";
pub const STOPPED_ALL: &str = "All tunnels stopped successfully.";
pub const RESTARTED_ALL: &str = "All tunnels restarted successfully.";

/// Which list receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tunnels,
    Providers,
}

pub struct Dashboard {
    pub shell: Shell,
    pub tunnels: Vec<Tunnel>,
    /// False until the first tunnel list arrived
    pub tunnels_loaded: bool,
    pub providers: Vec<Provider>,
    pub show_providers: bool,
    pub focus: Focus,
    pub selected_tunnel: usize,
    pub selected_provider: usize,
    pub modal: Option<InfoModal>,
    /// Incremented on every modal open
    generation: u64,
    clock: fn() -> f64,
    should_quit: bool,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::with_clock(wall_clock_ms)
    }

    /// Dashboard evaluating expiry against `clock` instead of the system time
    pub fn with_clock(clock: fn() -> f64) -> Self {
        Self {
            shell: Shell::default(),
            tunnels: Vec::new(),
            tunnels_loaded: false,
            providers: Vec::new(),
            show_providers: true,
            focus: Focus::Tunnels,
            selected_tunnel: 0,
            selected_provider: 0,
            modal: None,
            generation: 0,
            clock,
            should_quit: false,
        }
    }

    /// Backend id of the tunnel at `index`; the list position when the backend omits it
    fn tunnel_id(&self, index: usize) -> Option<u32> {
        self.tunnels
            .get(index)
            .map(|t| t.id.unwrap_or(index as u32))
    }

    fn refresh_tunnels(&mut self) -> Action {
        self.shell.fetch(ApiRequest::ListTunnels, true)
    }

    fn open_info(&mut self, id: u32) -> Vec<Action> {
        self.generation += 1;
        self.modal = Some(InfoModal::loading(id, self.generation));
        vec![
            Action::StopProgress,
            self.shell.fetch(
                ApiRequest::TunnelDetail {
                    id,
                    generation: self.generation,
                },
                false,
            ),
        ]
    }

    /// Close the modal; the progress timer goes with it
    fn close_modal(&mut self) -> Vec<Action> {
        self.modal = None;
        vec![Action::StopProgress]
    }

    fn copy_tunnel(&mut self, now: Instant) -> Vec<Action> {
        let Some(tunnel) = self.tunnels.get(self.selected_tunnel) else {
            return Vec::new();
        };

        if !tunnel.is_running() {
            self.shell.notify(UNAVAILABLE, ToastKind::Neutral, now);
            return Vec::new();
        }

        vec![Action::Copy {
            text: tunnel.url.clone(),
            success: COPIED,
        }]
    }

    fn notify_status(&mut self, status: &StatusMessage, now: Instant) {
        let kind = if status.is_error() {
            ToastKind::Error
        } else {
            ToastKind::Neutral
        };
        self.shell.notify(status.message(), kind, now);
    }

    /// Fixed success text unless the backend reports an error
    fn notify_fixed(&mut self, status: &StatusMessage, success: &str, now: Instant) {
        if status.is_error() {
            self.shell.notify(status.message(), ToastKind::Error, now);
        } else {
            self.shell.notify(success, ToastKind::Neutral, now);
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Action> {
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

        if self.modal.is_some() {
            return self.handle_modal_key(key);
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            KeyCode::Tab if self.show_providers => {
                self.focus = match self.focus {
                    Focus::Tunnels => Focus::Providers,
                    Focus::Providers => Focus::Tunnels,
                };
                Vec::new()
            }
            KeyCode::Char('h') => {
                self.show_providers = !self.show_providers;
                if !self.show_providers {
                    self.focus = Focus::Tunnels;
                }
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                Vec::new()
            }
            KeyCode::Enter | KeyCode::Char(' ') if self.focus == Focus::Providers => {
                match self.providers.get(self.selected_provider) {
                    Some(provider) => {
                        let id = provider.id;
                        vec![self.shell.fetch(ApiRequest::ToggleProvider(id), false)]
                    }
                    None => Vec::new(),
                }
            }
            KeyCode::Enter | KeyCode::Char('i') => match self.tunnel_id(self.selected_tunnel) {
                Some(id) => self.open_info(id),
                None => Vec::new(),
            },
            KeyCode::Char('r') => match self.tunnel_id(self.selected_tunnel) {
                Some(id) => vec![self.shell.fetch(ApiRequest::RestartTunnel(id), true)],
                None => Vec::new(),
            },
            KeyCode::Char('s') => match self.tunnel_id(self.selected_tunnel) {
                Some(id) => vec![self.shell.fetch(ApiRequest::StopTunnel(id), true)],
                None => Vec::new(),
            },
            KeyCode::Char('c') | KeyCode::Char('y') => self.copy_tunnel(now),
            KeyCode::Char('R') => {
                vec![self.shell.fetch(ApiRequest::RestartAll(RestartScope::All), false)]
            }
            KeyCode::Char('E') => {
                vec![self.shell.fetch(ApiRequest::RestartAll(RestartScope::Enabled), false)]
            }
            KeyCode::Char('S') => vec![self.shell.fetch(ApiRequest::StopAll, false)],
            KeyCode::Char('a') => vec![self.shell.fetch(ApiRequest::Subscription, false)],
            KeyCode::Char('g') => vec![
                self.refresh_tunnels(),
                self.shell.fetch(ApiRequest::ListProviders, true),
            ],
            _ => Vec::new(),
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let Some(modal) = self.modal.as_mut() else {
            return Vec::new();
        };
        let id = modal.id;

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('x') => self.close_modal(),
            KeyCode::Left | KeyCode::Char('h') => {
                modal.expiry.adjust(-1);
                Vec::new()
            }
            KeyCode::Right | KeyCode::Char('l') => {
                modal.expiry.adjust(1);
                Vec::new()
            }
            KeyCode::PageDown => {
                modal.expiry.adjust(-60);
                Vec::new()
            }
            KeyCode::PageUp => {
                modal.expiry.adjust(60);
                Vec::new()
            }
            KeyCode::Home => {
                modal.expiry.set(EXPIRY_MIN_MINUTES);
                Vec::new()
            }
            KeyCode::End => {
                modal.expiry.set(EXPIRY_MAX_MINUTES);
                Vec::new()
            }
            KeyCode::Enter => {
                let minutes = modal.expiry.value();
                self.set_expiry(id, minutes)
            }
            KeyCode::Char('p') => self.set_expiry(id, 0),
            KeyCode::Char('r') => vec![self.shell.fetch(ApiRequest::RestartTunnel(id), true)],
            KeyCode::Char('s') => vec![self.shell.fetch(ApiRequest::StopTunnel(id), true)],
            KeyCode::Char('o') => match modal.tunnel().and_then(|t| t.public_url.as_deref()) {
                Some(host) if !host.is_empty() => vec![Action::OpenUrl(browser_url(host))],
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Set the expiry and close the modal
    fn set_expiry(&mut self, id: u32, minutes: u32) -> Vec<Action> {
        let mut actions = vec![self.shell.fetch(ApiRequest::SetTimer { id, minutes }, false)];
        actions.extend(self.close_modal());
        actions
    }

    fn move_selection(&mut self, delta: isize) {
        let (selected, len) = match self.focus {
            Focus::Tunnels => (&mut self.selected_tunnel, self.tunnels.len()),
            Focus::Providers => (&mut self.selected_provider, self.providers.len()),
        };
        *selected = step(*selected, delta, len);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<Action> {
        if self.shell.is_loading() || self.shell.alert.is_some() || self.modal.is_none() {
            return Vec::new();
        }

        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            let modal = ui::modal_area(self.shell.area);
            if !modal.contains(Position::new(mouse.column, mouse.row)) {
                return self.close_modal();
            }
        }
        Vec::new()
    }

    fn handle_completion(&mut self, completion: Completion, now: Instant) -> Vec<Action> {
        if let ApiRequest::TunnelDetail { generation, .. } = completion.request {
            if completion.outcome.is_err() {
                if let Some(modal) = self.modal.as_mut().filter(|m| m.generation == generation) {
                    modal.detail = DetailState::Unavailable(FETCH_FAILED.to_string());
                }
            }
        }

        let Some(response) = self.shell.settle(completion, now) else {
            return Vec::new();
        };

        match response {
            ApiResponse::Tunnels(tunnels) => {
                self.tunnels = tunnels;
                self.tunnels_loaded = true;
                self.selected_tunnel = self.selected_tunnel.min(self.tunnels.len().saturating_sub(1));
                Vec::new()
            }
            ApiResponse::Providers(providers) => {
                self.providers = providers;
                self.selected_provider = self
                    .selected_provider
                    .min(self.providers.len().saturating_sub(1));
                Vec::new()
            }
            ApiResponse::ProviderToggled(toggle) => {
                match toggle {
                    ProviderToggle::Toggled(state) => {
                        self.shell.notify(state.describe(), ToastKind::Neutral, now)
                    }
                    ProviderToggle::Failed(status) => self.notify_status(&status, now),
                }
                vec![self.shell.fetch(ApiRequest::ListProviders, true)]
            }
            ApiResponse::Restarted(status) | ApiResponse::TimerSet(status) => {
                self.notify_status(&status, now);
                vec![self.refresh_tunnels()]
            }
            ApiResponse::RestartedAll(status) => {
                self.notify_fixed(&status, RESTARTED_ALL, now);
                vec![self.refresh_tunnels()]
            }
            ApiResponse::Stopped(status) => {
                self.notify_fixed(&status, STOPPED, now);
                vec![self.refresh_tunnels()]
            }
            ApiResponse::StoppedAll(status) => {
                self.notify_fixed(&status, STOPPED_ALL, now);
                vec![self.refresh_tunnels()]
            }
            ApiResponse::TunnelDetail { generation, detail } => {
                self.handle_detail(generation, detail, now)
            }
            ApiResponse::Subscription(text) => vec![Action::Copy {
                text,
                success: COPIED_ALL,
            }],
            ApiResponse::Logs(_) => Vec::new(),
        }
    }

    fn handle_detail(&mut self, generation: u64, detail: TunnelDetail, now: Instant) -> Vec<Action> {
        let now_ms = (self.clock)();
        let Some(modal) = self.modal.as_mut().filter(|m| m.generation == generation) else {
            tracing::debug!("Dropping detail reply of closed modal {}", generation);
            return Vec::new();
        };

        match detail {
            TunnelDetail::Found(tunnel) => {
                modal.populate(tunnel, now_ms);
                let progress = modal.progress;
                match progress {
                    Some(progress) if progress.is_expired() => self.close_modal(),
                    Some(_) => vec![Action::StartProgress(generation)],
                    None => Vec::new(),
                }
            }
            TunnelDetail::Missing(status) => {
                modal.detail = DetailState::Unavailable(status.message().to_string());
                self.shell.notify(status.message(), ToastKind::Error, now);
                Vec::new()
            }
        }
    }

    fn handle_progress_tick(&mut self, generation: u64) -> Vec<Action> {
        let now_ms = (self.clock)();
        let Some(modal) = self.modal.as_mut().filter(|m| m.generation == generation) else {
            return Vec::new();
        };

        match modal.tick(now_ms) {
            Some(progress) if progress.is_expired() => self.close_modal(),
            _ => Vec::new(),
        }
    }
}

impl Screen for Dashboard {
    fn init(&mut self) -> Vec<Action> {
        vec![
            self.refresh_tunnels(),
            self.shell.fetch(ApiRequest::ListProviders, true),
        ]
    }

    fn handle_event(&mut self, event: TuiEvent, now: Instant) -> Vec<Action> {
        match event {
            TuiEvent::Key(key) => self.handle_key(key, now),
            TuiEvent::Mouse(mouse) => self.handle_mouse(mouse),
            TuiEvent::Resize(width, height) => {
                self.shell.resize(width, height);
                Vec::new()
            }
            TuiEvent::Tick => {
                self.shell.toasts.expire(now);
                Vec::new()
            }
            TuiEvent::Refresh if !self.shell.is_loading() => {
                vec![self.shell.fetch(ApiRequest::ListTunnels, false)]
            }
            TuiEvent::Refresh => Vec::new(),
            TuiEvent::LoadingFinished => {
                self.shell.finish_loading();
                Vec::new()
            }
            TuiEvent::Completed(completion) => self.handle_completion(completion, now),
            TuiEvent::ProgressTick(generation) => self.handle_progress_tick(generation),
            TuiEvent::Notify(message, kind) => {
                self.shell.notify(message, kind, now);
                Vec::new()
            }
            TuiEvent::Alert(message) => {
                self.shell.alert(message);
                Vec::new()
            }
        }
    }

    fn draw(&self, frame: &mut Frame, now: Instant) {
        ui::draw_dashboard(frame, self, now);
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }
}

/// Browser URL of a provider hostname
fn browser_url(host: &str) -> String {
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

/// Move `index` by `delta` within `0..len`
pub(crate) fn step(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    index.saturating_add_signed(delta).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::tui::event::Completion;
    use tunnelmgr_common::ProviderState;

    fn key(code: KeyCode) -> TuiEvent {
        TuiEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn tunnel(id: u32, running: bool) -> Tunnel {
        Tunnel {
            id: Some(id),
            provider_instance: format!("Provider{}", id),
            url: format!("vless://uuid@host{}:443#t{}", id, id),
            public_url: Some(format!("host{}.example.com", id)),
            process: running.then(|| serde_json::json!("Popen")),
            tun_start_time: None,
            tun_end_time: None,
        }
    }

    fn ok(request: ApiRequest, response: ApiResponse) -> TuiEvent {
        TuiEvent::Completed(Completion {
            request,
            outcome: Ok(response),
        })
    }

    fn transport_error() -> ApiError {
        ApiError::Login {
            url: "http://127.0.0.1:5000/api/login".to_string(),
        }
    }

    fn loaded(tunnels: Vec<Tunnel>) -> Dashboard {
        fn fixed_clock() -> f64 {
            1_500_000.0
        }
        let mut dashboard = Dashboard::with_clock(fixed_clock);
        dashboard.tunnels = tunnels;
        dashboard.tunnels_loaded = true;
        dashboard
    }

    fn toast(dashboard: &Dashboard, now: Instant) -> Option<(String, ToastKind)> {
        dashboard
            .shell
            .toasts
            .current(now)
            .map(|t| (t.message.clone(), t.kind))
    }

    #[test]
    fn test_init_fetches_with_loading() {
        let mut dashboard = Dashboard::new();
        let actions = dashboard.init();

        assert_eq!(
            actions,
            vec![
                Action::Fetch {
                    request: ApiRequest::ListTunnels,
                    preload: true
                },
                Action::Fetch {
                    request: ApiRequest::ListProviders,
                    preload: true
                },
            ]
        );
        assert!(dashboard.shell.is_loading());
    }

    #[test]
    fn test_copy_running_tunnel() {
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(0, true)]);

        let actions = dashboard.handle_event(key(KeyCode::Char('c')), now);
        assert_eq!(
            actions,
            vec![Action::Copy {
                text: "vless://uuid@host0:443#t0".to_string(),
                success: COPIED,
            }]
        );
    }

    #[test]
    fn test_copy_unavailable_tunnel_is_blocked() {
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(0, true), tunnel(1, false)]);
        dashboard.handle_event(key(KeyCode::Down), now);

        let actions = dashboard.handle_event(key(KeyCode::Char('y')), now);
        assert!(actions.is_empty());
        assert_eq!(
            toast(&dashboard, now),
            Some((UNAVAILABLE.to_string(), ToastKind::Neutral))
        );
    }

    #[test]
    fn test_failed_list_fetch_keeps_previous_list() {
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(0, true), tunnel(1, true)]);

        let actions = dashboard.handle_event(
            TuiEvent::Completed(Completion {
                request: ApiRequest::ListTunnels,
                outcome: Err(transport_error()),
            }),
            now,
        );

        assert!(actions.is_empty());
        assert_eq!(dashboard.tunnels.len(), 2);
        assert_eq!(
            toast(&dashboard, now),
            Some((FETCH_FAILED.to_string(), ToastKind::Error))
        );
    }

    #[test]
    fn test_restart_error_is_styled() {
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(0, true)]);
        let status = StatusMessage {
            code: Some("error".to_string()),
            msg: Some("Unable to start tunnel".to_string()),
            ..StatusMessage::default()
        };

        let actions = dashboard.handle_event(
            ok(ApiRequest::RestartTunnel(0), ApiResponse::Restarted(status)),
            now,
        );

        assert_eq!(
            toast(&dashboard, now),
            Some(("Unable to start tunnel".to_string(), ToastKind::Error))
        );
        assert_eq!(
            actions,
            vec![Action::Fetch {
                request: ApiRequest::ListTunnels,
                preload: true
            }]
        );
    }

    #[test]
    fn test_stop_shows_fixed_message() {
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(0, true)]);
        let status = StatusMessage {
            msg: Some("Tunnel has been reset".to_string()),
            ..StatusMessage::default()
        };

        dashboard.handle_event(ok(ApiRequest::StopTunnel(0), ApiResponse::Stopped(status)), now);
        assert_eq!(
            toast(&dashboard, now),
            Some((STOPPED.to_string(), ToastKind::Neutral))
        );
    }

    #[test]
    fn test_toggle_refetches_providers() {
        let now = Instant::now();
        let mut dashboard = loaded(Vec::new());
        dashboard.providers = vec![Provider {
            id: 3,
            provider: "Zrok".to_string(),
            user_enabled: Some(true),
        }];
        dashboard.handle_event(key(KeyCode::Tab), now);

        let actions = dashboard.handle_event(key(KeyCode::Char(' ')), now);
        assert_eq!(
            actions,
            vec![Action::Fetch {
                request: ApiRequest::ToggleProvider(3),
                preload: false
            }]
        );

        let state = ProviderState {
            provider: "Zrok".to_string(),
            user_enabled: false,
        };
        let actions = dashboard.handle_event(
            ok(
                ApiRequest::ToggleProvider(3),
                ApiResponse::ProviderToggled(ProviderToggle::Toggled(state)),
            ),
            now,
        );
        assert_eq!(
            toast(&dashboard, now),
            Some(("Zrok is now set to disabled.".to_string(), ToastKind::Neutral))
        );
        assert_eq!(
            actions,
            vec![Action::Fetch {
                request: ApiRequest::ListProviders,
                preload: true
            }]
        );
    }

    #[test]
    fn test_toggle_unknown_provider_shows_error_and_refetches() {
        let now = Instant::now();
        let mut dashboard = loaded(Vec::new());

        let status = StatusMessage {
            code: Some("error".to_string()),
            msg: Some("Provider not found".to_string()),
            ..StatusMessage::default()
        };
        let actions = dashboard.handle_event(
            ok(
                ApiRequest::ToggleProvider(42),
                ApiResponse::ProviderToggled(ProviderToggle::Failed(status)),
            ),
            now,
        );

        assert_eq!(
            toast(&dashboard, now),
            Some(("Provider not found".to_string(), ToastKind::Error))
        );
        assert_eq!(
            actions,
            vec![Action::Fetch {
                request: ApiRequest::ListProviders,
                preload: true
            }]
        );
    }

    #[test]
    fn test_info_starts_progress_for_expiring_tunnel() {
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(0, true)]);

        let actions = dashboard.handle_event(key(KeyCode::Enter), now);
        assert_eq!(
            actions,
            vec![
                Action::StopProgress,
                Action::Fetch {
                    request: ApiRequest::TunnelDetail { id: 0, generation: 1 },
                    preload: false
                },
            ]
        );
        assert_eq!(dashboard.modal.as_ref().map(|m| &m.detail), Some(&DetailState::Loading));

        let mut detail = tunnel(0, true);
        detail.id = None;
        detail.tun_start_time = Some(1000.0);
        detail.tun_end_time = Some(2000.0);
        let actions = dashboard.handle_event(
            ok(
                ApiRequest::TunnelDetail { id: 0, generation: 1 },
                ApiResponse::TunnelDetail {
                    generation: 1,
                    detail: TunnelDetail::Found(detail),
                },
            ),
            now,
        );

        assert_eq!(actions, vec![Action::StartProgress(1)]);
        let progress = dashboard.modal.as_ref().and_then(|m| m.progress).unwrap();
        assert_eq!(progress.percentage, 50.0);
    }

    #[test]
    fn test_stale_detail_is_dropped() {
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(0, true), tunnel(1, true)]);

        dashboard.handle_event(key(KeyCode::Char('i')), now);
        dashboard.handle_event(key(KeyCode::Esc), now);
        dashboard.handle_event(key(KeyCode::Down), now);
        dashboard.handle_event(key(KeyCode::Char('i')), now);

        let actions = dashboard.handle_event(
            ok(
                ApiRequest::TunnelDetail { id: 0, generation: 1 },
                ApiResponse::TunnelDetail {
                    generation: 1,
                    detail: TunnelDetail::Found(tunnel(0, true)),
                },
            ),
            now,
        );

        assert!(actions.is_empty());
        let modal = dashboard.modal.as_ref().unwrap();
        assert_eq!(modal.id, 1);
        assert_eq!(modal.detail, DetailState::Loading);
    }

    #[test]
    fn test_every_close_path_stops_progress() {
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(0, true)]);
        dashboard.shell.resize(100, 40);

        dashboard.handle_event(key(KeyCode::Enter), now);
        assert_eq!(dashboard.handle_event(key(KeyCode::Esc), now), vec![Action::StopProgress]);

        dashboard.handle_event(key(KeyCode::Enter), now);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            dashboard.handle_event(TuiEvent::Mouse(click), now),
            vec![Action::StopProgress]
        );
        assert!(dashboard.modal.is_none());

        dashboard.handle_event(key(KeyCode::Enter), now);
        let actions = dashboard.handle_event(key(KeyCode::Char('p')), now);
        assert_eq!(
            actions,
            vec![
                Action::Fetch {
                    request: ApiRequest::SetTimer { id: 0, minutes: 0 },
                    preload: false
                },
                Action::StopProgress,
            ]
        );
        assert!(dashboard.modal.is_none());
    }

    #[test]
    fn test_set_expiry_uses_slider_value() {
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(4, true)]);

        dashboard.handle_event(key(KeyCode::Enter), now);
        dashboard.handle_event(key(KeyCode::Home), now);
        dashboard.handle_event(key(KeyCode::PageUp), now);
        assert_eq!(dashboard.modal.as_ref().unwrap().expiry.label(), "61 min");

        let actions = dashboard.handle_event(key(KeyCode::Enter), now);
        assert_eq!(
            actions[0],
            Action::Fetch {
                request: ApiRequest::SetTimer { id: 4, minutes: 61 },
                preload: false
            }
        );
    }

    #[test]
    fn test_expired_tick_closes_modal() {
        fn late_clock() -> f64 {
            2_500_000.0
        }
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(0, true)]);
        dashboard.handle_event(key(KeyCode::Enter), now);

        let mut detail = tunnel(0, true);
        detail.tun_start_time = Some(1000.0);
        detail.tun_end_time = Some(2000.0);
        dashboard.handle_event(
            ok(
                ApiRequest::TunnelDetail { id: 0, generation: 1 },
                ApiResponse::TunnelDetail {
                    generation: 1,
                    detail: TunnelDetail::Found(detail),
                },
            ),
            now,
        );
        assert!(dashboard.modal.is_some());

        // A tick for another modal is ignored
        assert!(dashboard.handle_event(TuiEvent::ProgressTick(7), now).is_empty());

        dashboard.clock = late_clock;
        assert_eq!(
            dashboard.handle_event(TuiEvent::ProgressTick(1), now),
            vec![Action::StopProgress]
        );
        assert!(dashboard.modal.is_none());
    }

    #[test]
    fn test_missing_tunnel_detail() {
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(0, true)]);
        dashboard.handle_event(key(KeyCode::Enter), now);

        let status = StatusMessage {
            code: Some("error".to_string()),
            msg: Some("Tunnel not found".to_string()),
            ..StatusMessage::default()
        };
        dashboard.handle_event(
            ok(
                ApiRequest::TunnelDetail { id: 0, generation: 1 },
                ApiResponse::TunnelDetail {
                    generation: 1,
                    detail: TunnelDetail::Missing(status),
                },
            ),
            now,
        );

        assert_eq!(
            dashboard.modal.as_ref().map(|m| &m.detail),
            Some(&DetailState::Unavailable("Tunnel not found".to_string()))
        );
        assert_eq!(
            toast(&dashboard, now).map(|(_, kind)| kind),
            Some(ToastKind::Error)
        );
    }

    #[test]
    fn test_loading_blocks_input() {
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(0, true)]);
        dashboard.init();

        assert!(dashboard.handle_event(key(KeyCode::Char('c')), now).is_empty());
        assert!(dashboard.modal.is_none());

        dashboard.handle_event(TuiEvent::LoadingFinished, now);
        dashboard.handle_event(TuiEvent::LoadingFinished, now);
        assert!(!dashboard.handle_event(key(KeyCode::Char('c')), now).is_empty());
    }

    #[test]
    fn test_alert_is_dismissed_with_enter() {
        let now = Instant::now();
        let mut dashboard = loaded(vec![tunnel(0, true)]);
        dashboard.handle_event(TuiEvent::Alert("Failed to copy: no clipboard".to_string()), now);

        assert!(dashboard.handle_event(key(KeyCode::Char('c')), now).is_empty());
        dashboard.handle_event(key(KeyCode::Enter), now);
        assert!(dashboard.shell.alert.is_none());
    }

    #[test]
    fn test_subscription_is_copied() {
        let now = Instant::now();
        let mut dashboard = loaded(Vec::new());

        let actions = dashboard.handle_event(
            ok(
                ApiRequest::Subscription,
                ApiResponse::Subscription("vless://a\nvless://b".to_string()),
            ),
            now,
        );
        assert_eq!(
            actions,
            vec![Action::Copy {
                text: "vless://a\nvless://b".to_string(),
                success: COPIED_ALL,
            }]
        );
    }

    #[test]
    fn test_step() {
        assert_eq!(step(0, -1, 3), 0);
        assert_eq!(step(2, 1, 3), 2);
        assert_eq!(step(1, 1, 3), 2);
        assert_eq!(step(5, 1, 0), 0);
    }

    #[test]
    fn test_browser_url() {
        assert_eq!(browser_url("abc.trycloudflare.com"), "https://abc.trycloudflare.com");
        assert_eq!(browser_url("http://x.link"), "http://x.link");
    }
}
