//! HTTP access to the tunnel manager backend

mod client;

pub use client::ApiClient;

use tunnelmgr_common::{Provider, ProviderToggle, RestartScope, StatusMessage, Tunnel, TunnelDetail};

/// Failures below the application level
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode request body for {url}: {source}")]
    Encode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Login to {url} was rejected")]
    Login { url: String },
}

/// One backend operation, as issued by a view
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    ListTunnels,
    ListProviders,
    ToggleProvider(u32),
    RestartTunnel(u32),
    RestartAll(RestartScope),
    StopTunnel(u32),
    StopAll,
    SetTimer { id: u32, minutes: u32 },
    /// Tagged with the detail modal that asked for it
    TunnelDetail { id: u32, generation: u64 },
    Subscription,
    Logs,
}

/// Parsed body of a successful request
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Tunnels(Vec<Tunnel>),
    Providers(Vec<Provider>),
    ProviderToggled(ProviderToggle),
    Restarted(StatusMessage),
    RestartedAll(StatusMessage),
    Stopped(StatusMessage),
    StoppedAll(StatusMessage),
    TimerSet(StatusMessage),
    TunnelDetail { generation: u64, detail: TunnelDetail },
    Subscription(String),
    Logs(Vec<String>),
}

impl ApiClient {
    /// Run a view's request and wrap the body in its response variant
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let response = match *request {
            ApiRequest::ListTunnels => ApiResponse::Tunnels(self.list_tunnels().await?),
            ApiRequest::ListProviders => ApiResponse::Providers(self.list_providers().await?),
            ApiRequest::ToggleProvider(id) => {
                ApiResponse::ProviderToggled(self.toggle_provider(id).await?)
            }
            ApiRequest::RestartTunnel(id) => ApiResponse::Restarted(self.restart_tunnel(id).await?),
            ApiRequest::RestartAll(scope) => ApiResponse::RestartedAll(self.restart_all(scope).await?),
            ApiRequest::StopTunnel(id) => ApiResponse::Stopped(self.stop_tunnel(id).await?),
            ApiRequest::StopAll => ApiResponse::StoppedAll(self.stop_all().await?),
            ApiRequest::SetTimer { id, minutes } => {
                ApiResponse::TimerSet(self.set_timer(id, minutes).await?)
            }
            ApiRequest::TunnelDetail { id, generation } => ApiResponse::TunnelDetail {
                generation,
                detail: self.get_tunnel(id).await?,
            },
            ApiRequest::Subscription => ApiResponse::Subscription(self.subscription().await?),
            ApiRequest::Logs => ApiResponse::Logs(self.logs().await?),
        };

        Ok(response)
    }
}
