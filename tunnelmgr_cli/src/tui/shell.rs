//! State shared by both views: loading indicator, toast and alert
//!
//! Every request a view issues goes through [`Shell::fetch`] and every
//! completion through [`Shell::settle`], so transport failures are handled in
//! one place: logged, reported with one generic toast, and never passed on.

use super::event::{Action, Completion};
use super::toast::{ToastKind, Toasts};
use crate::api::{ApiRequest, ApiResponse};
use ratatui::layout::Rect;
use std::time::Instant;

/// Toast shown for any transport or parse failure
pub const FETCH_FAILED: &str = "Failed to fetch data.";

#[derive(Debug, Default)]
pub struct Shell {
    pub toasts: Toasts,
    /// Requests in flight that show the loading indicator
    pub loading: usize,
    /// Blocking message, dismissed with Enter or Esc
    pub alert: Option<String>,
    /// Last known terminal area
    pub area: Rect,
}

impl Shell {
    /// Request a fetch; the loading indicator is shown before dispatch
    pub fn fetch(&mut self, request: ApiRequest, preload: bool) -> Action {
        if preload {
            self.loading += 1;
        }
        Action::Fetch { request, preload }
    }

    pub fn finish_loading(&mut self) {
        self.loading = self.loading.saturating_sub(1);
    }

    pub fn is_loading(&self) -> bool {
        self.loading > 0
    }

    /// Unwrap a completion, swallowing transport failures
    pub fn settle(&mut self, completion: Completion, now: Instant) -> Option<ApiResponse> {
        match completion.outcome {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::error!("Error fetching data for {:?}: {}", completion.request, e);
                self.toasts.show(FETCH_FAILED, ToastKind::Error, now);
                None
            }
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) {
        self.toasts.show(message, kind, now);
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.area = Rect::new(0, 0, width, height);
    }
}
