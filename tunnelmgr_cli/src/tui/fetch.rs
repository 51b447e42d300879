//! Runs view requests on background tasks

use super::event::{Completion, TuiEvent};
use crate::api::{ApiClient, ApiRequest};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Hides the loading indicator when dropped, however the request ended
struct PreloadGuard {
    tx: UnboundedSender<TuiEvent>,
}

impl Drop for PreloadGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(TuiEvent::LoadingFinished);
    }
}

/// Issues requests and posts their completions back to the view
#[derive(Clone)]
pub struct Fetcher {
    api: ApiClient,
    tx: UnboundedSender<TuiEvent>,
}

impl Fetcher {
    pub fn new(api: ApiClient, tx: UnboundedSender<TuiEvent>) -> Self {
        Self { api, tx }
    }

    /// Spawn `request`; with `preload` a `LoadingFinished` event follows the completion
    pub fn dispatch(&self, request: ApiRequest, preload: bool) -> JoinHandle<()> {
        let guard = preload.then(|| PreloadGuard {
            tx: self.tx.clone(),
        });
        let api = self.api.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let _guard = guard;
            let outcome = api.execute(&request).await;
            if tx.send(TuiEvent::Completed(Completion { request, outcome })).is_err() {
                tracing::debug!("View closed before the response arrived");
            }
        })
    }
}
