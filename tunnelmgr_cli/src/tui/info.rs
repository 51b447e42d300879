//! Tunnel detail modal state

use crate::qr;
use tunnelmgr_common::constants::{EXPIRY_MAX_MINUTES, EXPIRY_MIN_MINUTES};
use tunnelmgr_common::{ExpiryProgress, Tunnel};

/// What the modal currently knows about its tunnel
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(Box<Tunnel>),
    Unavailable(String),
}

/// Expiry slider, 1..=1440 minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryInput {
    value: u32,
    touched: bool,
}

impl Default for ExpiryInput {
    fn default() -> Self {
        Self {
            value: (EXPIRY_MIN_MINUTES + EXPIRY_MAX_MINUTES) / 2,
            touched: false,
        }
    }
}

impl ExpiryInput {
    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn adjust(&mut self, delta: i64) {
        let next = (self.value as i64 + delta)
            .clamp(EXPIRY_MIN_MINUTES as i64, EXPIRY_MAX_MINUTES as i64);
        self.value = next as u32;
        self.touched = true;
    }

    pub fn set(&mut self, minutes: u32) {
        self.value = minutes.clamp(EXPIRY_MIN_MINUTES, EXPIRY_MAX_MINUTES);
        self.touched = true;
    }

    /// "Unknown" until the slider has been moved
    pub fn label(&self) -> String {
        if self.touched {
            format!("{} min", self.value)
        } else {
            "Unknown".to_string()
        }
    }

    /// Slider position as a share of its range
    pub fn ratio(&self) -> f64 {
        (self.value - EXPIRY_MIN_MINUTES) as f64 / (EXPIRY_MAX_MINUTES - EXPIRY_MIN_MINUTES) as f64
    }
}

/// The open detail modal
#[derive(Debug, Clone, PartialEq)]
pub struct InfoModal {
    pub id: u32,
    /// Tags the detail request and progress ticks of this modal
    pub generation: u64,
    pub detail: DetailState,
    pub qr_lines: Vec<String>,
    pub progress: Option<ExpiryProgress>,
    pub expiry: ExpiryInput,
}

impl InfoModal {
    pub fn loading(id: u32, generation: u64) -> Self {
        Self {
            id,
            generation,
            detail: DetailState::Loading,
            qr_lines: Vec::new(),
            progress: None,
            expiry: ExpiryInput::default(),
        }
    }

    /// Fill in the fetched tunnel and evaluate its expiry at `now_ms`
    pub fn populate(&mut self, tunnel: Tunnel, now_ms: f64) {
        self.qr_lines = qr::render_lines(&tunnel.url);
        self.progress = tunnel
            .expiry_window()
            .map(|(start, end)| ExpiryProgress::compute(start, end, now_ms));
        self.detail = DetailState::Loaded(Box::new(tunnel));
    }

    pub fn tunnel(&self) -> Option<&Tunnel> {
        match &self.detail {
            DetailState::Loaded(tunnel) => Some(tunnel),
            _ => None,
        }
    }

    /// Re-evaluate the progress bar; returns the new state if the tunnel expires
    pub fn tick(&mut self, now_ms: f64) -> Option<ExpiryProgress> {
        let (start, end) = self.tunnel()?.expiry_window()?;
        let progress = ExpiryProgress::compute(start, end, now_ms);
        self.progress = Some(progress);
        Some(progress)
    }
}
