//! TUI rendering functions

use super::dashboard::{Dashboard, Focus};
use super::info::{DetailState, InfoModal};
use super::logs::{LogFocus, LogViewer, NO_MATCHES};
use super::shell::Shell;
use super::toast::ToastKind;
use crate::clock::{created_label, expiry_label};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;
use tunnelmgr_common::text::{sanitize, truncate};
use tunnelmgr_common::{Band, Severity, Tunnel};

const AMBER: Color = Color::Rgb(255, 176, 0);
const SELECTED_BG: Color = Color::Rgb(40, 40, 60);
const PROVIDER_PANEL_WIDTH: u16 = 30;
const LOG_FILTER_WIDTH: u16 = 28;
const SLIDER_WIDTH: usize = 30;

/// Area of the tunnel detail modal within the terminal area
pub fn modal_area(area: Rect) -> Rect {
    centered_rect(80, 80, area)
}

/// Rect of `percent_x` x `percent_y` centered in `r`
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Fixed-size rect centered in `r`, clipped to it
fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect::new(
        r.x + (r.width - width) / 2,
        r.y + (r.height - height) / 2,
        width,
        height,
    )
}

fn main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(3),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

fn band_color(band: Band) -> Color {
    match band {
        Band::Green => Color::Green,
        Band::Amber => AMBER,
        Band::Red => Color::Red,
    }
}

fn severity_style(line: &str) -> Style {
    match Severity::classify(line) {
        Some(Severity::Error) => Style::default().fg(Color::Red),
        Some(Severity::Warning) => Style::default().fg(AMBER),
        _ => Style::default(),
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn hints(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let spans = pairs
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(*key, Style::default().fg(Color::Cyan)),
                Span::styled(format!(" {}  ", label), Style::default().fg(Color::DarkGray)),
            ]
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

fn title_bar(title: &'static str, detail: String) -> Paragraph<'static> {
    Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", title),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(detail, Style::default().fg(Color::DarkGray)),
    ]))
}

/// Draw the dashboard
pub fn draw_dashboard(frame: &mut Frame, dashboard: &Dashboard, now: Instant) {
    let [title, body, footer] = main_chunks(frame.area());

    let running = dashboard.tunnels.iter().filter(|t| t.is_running()).count();
    frame.render_widget(
        title_bar(
            "TUNNELMGR",
            format!("{} tunnels, {} running", dashboard.tunnels.len(), running),
        ),
        title,
    );

    if dashboard.show_providers {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(PROVIDER_PANEL_WIDTH)])
            .split(body);
        draw_tunnels(frame, dashboard, columns[0]);
        draw_providers(frame, dashboard, columns[1]);
    } else {
        draw_tunnels(frame, dashboard, body);
    }

    let footer_hints = if dashboard.modal.is_some() {
        hints(&[
            ("←/→", "Expiry"),
            ("Enter", "Set expiry"),
            ("p", "Perma"),
            ("r", "Restart"),
            ("s", "Stop"),
            ("o", "Open"),
            ("Esc", "Close"),
        ])
    } else {
        hints(&[
            ("↑/↓", "Select"),
            ("Enter", "Info"),
            ("c", "Copy"),
            ("r", "Restart"),
            ("s", "Stop"),
            ("R/E", "Restart all/enabled"),
            ("S", "Stop all"),
            ("a", "Copy all"),
            ("h", "Providers"),
            ("q", "Quit"),
        ])
    };
    frame.render_widget(Paragraph::new(footer_hints), footer);

    if let Some(modal) = &dashboard.modal {
        draw_modal(frame, modal, modal_area(frame.area()));
    }

    draw_overlays(frame, &dashboard.shell, now);
}

fn tunnel_card(tunnel: &Tunnel, width: usize) -> ListItem<'static> {
    let available = tunnel.is_running();
    let (name_style, text_style) = if available {
        (
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::Green),
        )
    } else {
        (
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::DarkGray),
        )
    };

    let status = if available {
        Span::styled("  running", Style::default().fg(Color::Green))
    } else {
        Span::styled("  unavailable", Style::default().fg(Color::Red))
    };

    let public_url = tunnel.public_url.as_deref().map(sanitize).unwrap_or_default();

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(sanitize(&tunnel.provider_instance), name_style),
            status,
        ]),
        Line::from(Span::styled(truncate(&sanitize(&tunnel.url), width), text_style)),
        Line::from(Span::styled(
            truncate(&public_url, width),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ])
}

fn draw_tunnels(frame: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let block = Block::default()
        .title(" Tunnels ")
        .borders(Borders::ALL)
        .border_style(border_style(dashboard.focus == Focus::Tunnels));

    if dashboard.tunnels.is_empty() {
        let text = if dashboard.tunnels_loaded {
            "No tunnels available."
        } else {
            ""
        };
        let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let width = (area.width as usize).saturating_sub(4);
    let items: Vec<ListItem> = dashboard
        .tunnels
        .iter()
        .map(|t| tunnel_card(t, width))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(SELECTED_BG))
        .highlight_symbol("▌");

    let mut state = ListState::default().with_selected(Some(dashboard.selected_tunnel));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_providers(frame: &mut Frame, dashboard: &Dashboard, area: Rect) {
    let focused = dashboard.focus == Focus::Providers;
    let block = Block::default()
        .title(" Providers ")
        .borders(Borders::ALL)
        .border_style(border_style(focused));

    let items: Vec<ListItem> = dashboard
        .providers
        .iter()
        .map(|p| {
            let (mark, style) = if p.is_enabled() {
                ("[x] ", Style::default().fg(Color::Green))
            } else {
                ("[ ] ", Style::default().fg(Color::DarkGray))
            };
            ListItem::new(Line::from(vec![
                Span::styled(mark, style),
                Span::raw(sanitize(&p.provider)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(SELECTED_BG));

    let mut state = ListState::default();
    if focused {
        state.select(Some(dashboard.selected_provider));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn detail_line(label: &'static str, value: String, style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, style),
    ])
}

fn draw_modal(frame: &mut Frame, modal: &InfoModal, area: Rect) {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" Tunnel {} ", modal.id))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let tunnel = match &modal.detail {
        DetailState::Loading => {
            let text = Paragraph::new(Span::styled(
                "Loading tunnel details...",
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(text, inner);
            return;
        }
        DetailState::Unavailable(message) => {
            let text = Paragraph::new(Span::styled(sanitize(message), Style::default().fg(Color::Red)))
                .wrap(Wrap { trim: true });
            frame.render_widget(text, inner);
            return;
        }
        DetailState::Loaded(tunnel) => tunnel,
    };

    let qr_width = modal
        .qr_lines
        .first()
        .map(|l| l.chars().count() as u16 + 2)
        .unwrap_or(0);
    let show_qr = qr_width > 0 && inner.width >= qr_width + 30;

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(if show_qr {
            vec![Constraint::Min(30), Constraint::Length(qr_width)]
        } else {
            vec![Constraint::Min(1)]
        })
        .split(inner);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Details
            Constraint::Length(3), // Progress
            Constraint::Length(2), // Expiry slider
            Constraint::Min(0),
        ])
        .split(columns[0]);

    let width = (rows[0].width as usize).saturating_sub(12);
    let status_style = if tunnel.is_running() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };
    let white = Style::default().fg(Color::White);
    let public_url = tunnel.public_url.as_deref().map(sanitize).unwrap_or_default();

    let details = vec![
        detail_line("Provider", sanitize(&tunnel.provider_instance), white),
        detail_line("URL", truncate(&sanitize(&tunnel.url), width), Style::default().fg(Color::Green)),
        detail_line("Public URL", truncate(&public_url, width), Style::default().fg(Color::Magenta)),
        detail_line("Status", tunnel.status_label().to_string(), status_style),
        detail_line("Created", created_label(tunnel), white),
        detail_line("Expires", expiry_label(tunnel), white),
    ];
    frame.render_widget(Paragraph::new(details), rows[0]);

    if let Some(progress) = modal.progress {
        let gauge = Gauge::default()
            .block(Block::default().title(" Time left ").borders(Borders::ALL))
            .gauge_style(Style::default().fg(band_color(progress.band)))
            .percent(progress.percent())
            .label(format!("{:.0}%", progress.percentage));
        frame.render_widget(gauge, rows[1]);
    }

    let filled = (modal.expiry.ratio() * SLIDER_WIDTH as f64).round() as usize;
    let slider = Line::from(vec![
        Span::styled(format!("{:<12}", "Expiry"), Style::default().fg(Color::DarkGray)),
        Span::styled("━".repeat(filled), Style::default().fg(Color::Cyan)),
        Span::styled("●", Style::default().fg(Color::White)),
        Span::styled(
            "─".repeat(SLIDER_WIDTH - filled),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!(" {}", modal.expiry.label()), white),
    ]);
    frame.render_widget(Paragraph::new(slider), rows[2]);

    if show_qr {
        let qr_lines: Vec<Line> = modal
            .qr_lines
            .iter()
            .take(columns[1].height as usize)
            .map(|line| Line::from(Span::styled(line.as_str(), white)))
            .collect();
        let qr = Paragraph::new(qr_lines).block(
            Block::default()
                .borders(Borders::LEFT)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        frame.render_widget(qr, columns[1]);
    }
}

/// Areas of the log viewer, shared by drawing and mouse hit-testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogPanels {
    pub providers: Rect,
    pub levels: Rect,
    pub entries: Rect,
}

pub fn log_panels(area: Rect) -> LogPanels {
    let [_, body, _] = main_chunks(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LOG_FILTER_WIDTH), Constraint::Min(20)])
        .split(body);
    let filters = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(Severity::ALL.len() as u16 + 2),
        ])
        .split(columns[0]);

    LogPanels {
        providers: filters[0],
        levels: filters[1],
        entries: columns[1],
    }
}

fn checkbox_item(label: String, checked: bool) -> ListItem<'static> {
    let mark = if checked { "[x] " } else { "[ ] " };
    ListItem::new(Line::from(vec![
        Span::styled(mark, Style::default().fg(Color::Cyan)),
        Span::raw(label),
    ]))
}

/// Draw the log viewer
pub fn draw_log_viewer(frame: &mut Frame, viewer: &LogViewer, now: Instant) {
    let [title, _, footer] = main_chunks(frame.area());
    let panels = log_panels(frame.area());

    frame.render_widget(
        title_bar(
            "TUNNELMGR LOGS",
            format!("{} of {} lines", viewer.filtered.len(), viewer.logs.len()),
        ),
        title,
    );

    let providers: Vec<ListItem> = viewer
        .providers
        .iter()
        .map(|c| checkbox_item(sanitize(&c.value), c.checked))
        .collect();
    let mut state = ListState::default()
        .with_offset(viewer.provider_offset)
        .with_selected((viewer.focus == LogFocus::Providers).then_some(viewer.provider_cursor));
    frame.render_stateful_widget(
        List::new(providers)
            .block(
                Block::default()
                    .title(" Providers ")
                    .borders(Borders::ALL)
                    .border_style(border_style(viewer.focus == LogFocus::Providers)),
            )
            .highlight_style(Style::default().bg(SELECTED_BG)),
        panels.providers,
        &mut state,
    );

    let levels: Vec<ListItem> = viewer
        .levels
        .iter()
        .map(|c| checkbox_item(c.value.to_string(), c.checked))
        .collect();
    let mut state = ListState::default()
        .with_offset(viewer.level_offset)
        .with_selected((viewer.focus == LogFocus::Levels).then_some(viewer.level_cursor));
    frame.render_stateful_widget(
        List::new(levels)
            .block(
                Block::default()
                    .title(" Levels ")
                    .borders(Borders::ALL)
                    .border_style(border_style(viewer.focus == LogFocus::Levels)),
            )
            .highlight_style(Style::default().bg(SELECTED_BG)),
        panels.levels,
        &mut state,
    );

    let entries_block = Block::default()
        .title(" Logs (newest first) ")
        .borders(Borders::ALL)
        .border_style(border_style(viewer.focus == LogFocus::Entries));

    if viewer.filtered.is_empty() {
        let placeholder = if viewer.logs_loaded || !viewer.shell.is_loading() {
            NO_MATCHES
        } else {
            ""
        };
        frame.render_widget(
            Paragraph::new(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))
                .block(entries_block),
            panels.entries,
        );
    } else {
        let visible = panels.entries.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = viewer
            .filtered
            .iter()
            .skip(viewer.offset)
            .take(visible)
            .map(|line| Line::from(Span::styled(sanitize(line), severity_style(line))))
            .collect();
        frame.render_widget(
            Paragraph::new(lines)
                .block(entries_block)
                .wrap(Wrap { trim: false }),
            panels.entries,
        );
    }

    frame.render_widget(
        Paragraph::new(hints(&[
            ("Tab", "Focus"),
            ("Space", "Toggle"),
            ("a/n", "All/none"),
            ("↑/↓", "Scroll"),
            ("g", "Reload"),
            ("q", "Quit"),
        ])),
        footer,
    );

    draw_overlays(frame, &viewer.shell, now);
}

/// Loading indicator, toast and alert on top of a view
fn draw_overlays(frame: &mut Frame, shell: &Shell, now: Instant) {
    let area = frame.area();

    if shell.is_loading() {
        let rect = centered_fixed(20, 3, area);
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(Span::styled(" Loading...", Style::default().fg(Color::White)))
                .block(Block::default().borders(Borders::ALL)),
            rect,
        );
    }

    if let Some(toast) = shell.toasts.current(now) {
        let message = sanitize(&toast.message);
        let width = (message.chars().count() as u16 + 4).min(area.width);
        let rect = Rect::new(area.x + area.width - width, area.y + 1, width, 3).intersection(area);

        let background = match toast.kind {
            ToastKind::Neutral => Color::DarkGray,
            ToastKind::Error => Color::Red,
        };
        let mut style = Style::default().fg(Color::White).bg(background);
        if toast.is_fading(now) {
            style = style.add_modifier(Modifier::DIM);
        }

        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(format!(" {}", message))
                .style(style)
                .block(Block::default().borders(Borders::ALL).border_style(style)),
            rect,
        );
    }

    if let Some(message) = &shell.alert {
        let rect = centered_fixed(60, 7, area);
        frame.render_widget(Clear, rect);
        let lines = vec![
            Line::from(Span::styled(sanitize(message), Style::default().fg(Color::White))),
            Line::from(""),
            hints(&[("Enter", "OK")]),
        ];
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(
                Block::default()
                    .title(" Alert ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            ),
            rect,
        );
    }
}
