//! Single-slot toast notifications

use std::time::{Duration, Instant};
use tunnelmgr_common::constants::{TOAST_DURATION_MS, TOAST_FADE_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    #[default]
    Neutral,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: Instant,
}

impl Toast {
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.shown_at)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.age(now) >= Duration::from_millis(TOAST_DURATION_MS)
    }

    /// In the last stretch before removal the toast is drawn faded
    pub fn is_fading(&self, now: Instant) -> bool {
        self.age(now) >= Duration::from_millis(TOAST_DURATION_MS - TOAST_FADE_MS)
    }
}

/// Holds at most one toast; showing a new one replaces the current one
#[derive(Debug, Default)]
pub struct Toasts {
    current: Option<Toast>,
}

impl Toasts {
    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) {
        self.current = Some(Toast {
            message: message.into(),
            kind,
            shown_at: now,
        });
    }

    /// The toast still visible at `now`
    pub fn current(&self, now: Instant) -> Option<&Toast> {
        self.current.as_ref().filter(|t| !t.is_expired(now))
    }

    /// Drop the toast once its time is up
    pub fn expire(&mut self, now: Instant) {
        if self.current.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.current = None;
        }
    }
}
