//! Events delivered to a view and the side effects it asks for

use super::toast::ToastKind;
use crate::api::{ApiError, ApiRequest, ApiResponse};
use crossterm::event::{KeyEvent, MouseEvent};

/// Outcome of a request issued through the fetcher
#[derive(Debug)]
pub struct Completion {
    pub request: ApiRequest,
    pub outcome: Result<ApiResponse, ApiError>,
}

/// Events that can be sent to a view
#[derive(Debug)]
pub enum TuiEvent {
    /// Key event from terminal
    Key(KeyEvent),
    /// Mouse event from terminal
    Mouse(MouseEvent),
    /// Terminal size changed
    Resize(u16, u16),
    /// Housekeeping tick (toast expiry)
    Tick,
    /// Auto-refresh interval elapsed
    Refresh,
    /// A request shown with the loading indicator has finished
    LoadingFinished,
    /// A request has completed
    Completed(Completion),
    /// The expiry progress timer of the given modal generation fired
    ProgressTick(u64),
    /// Transient message from the runtime
    Notify(String, ToastKind),
    /// Blocking message from the runtime
    Alert(String),
}

/// Side effects requested by a view, carried out by the runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Fetch { request: ApiRequest, preload: bool },
    Copy { text: String, success: &'static str },
    OpenUrl(String),
    StartProgress(u64),
    StopProgress,
}
