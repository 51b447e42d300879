//! Typed client for the backend's REST endpoints
//!
//! Only transport and decoding problems are errors here. Application-level
//! failures arrive as ordinary bodies carrying `code: "error"`, whatever the
//! HTTP status, and are left to the caller.

use super::ApiError;
use crate::config::Config;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tunnelmgr_common::{
    constants, provider_path, timer_path, tunnel_path, Provider, ProviderToggle, RestartAllRequest,
    RestartScope, StatusMessage, TimerRequest, Tunnel, TunnelDetail,
};

/// Client for the tunnel manager API mount
#[derive(Clone)]
pub struct ApiClient {
    api_base: String,
    subscription_base: String,
    api_password: String,
    client: Client,
}

/// Form body of the backend's login page
#[derive(Debug, Serialize)]
struct LoginForm<'a> {
    password: &'a str,
}

impl ApiClient {
    /// Create a client for the configured backend
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .cookie_store(true)
            .user_agent(concat!("tunnelmgr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            api_base: config.api_base(),
            subscription_base: config.subscription_base(),
            api_password: config.api_path.trim_matches('/').to_string(),
            client,
        })
    }

    /// Absolute URL of an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Absolute URL of the subscription export
    pub fn subscription_url(&self) -> String {
        format!("{}{}", self.subscription_base, constants::SUBSCRIPTION_PATH)
    }

    async fn send_text(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<String, ApiError> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let transport = |source| ApiError::Transport {
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        tracing::debug!("{} answered {}", url, response.status());
        response.text().await.map_err(transport)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let text = self.send_text(method, &url, body).await?;
        serde_json::from_str(&text).map_err(|source| ApiError::Decode { url, source })
    }

    fn body<B: Serialize>(&self, path: &str, body: &B) -> Result<Option<serde_json::Value>, ApiError> {
        serde_json::to_value(body)
            .map(Some)
            .map_err(|source| ApiError::Encode {
                url: self.url(path),
                source,
            })
    }

    /// GET /tunnels
    pub async fn list_tunnels(&self) -> Result<Vec<Tunnel>, ApiError> {
        self.send_json(Method::GET, constants::TUNNELS_PATH, None).await
    }

    /// GET /tunnels/{id}
    pub async fn get_tunnel(&self, id: u32) -> Result<TunnelDetail, ApiError> {
        let path = tunnel_path(id);
        let value: serde_json::Value = self.send_json(Method::GET, &path, None).await?;
        TunnelDetail::from_value(value).map_err(|source| ApiError::Decode {
            url: self.url(&path),
            source,
        })
    }

    /// POST /tunnels/{id}
    pub async fn restart_tunnel(&self, id: u32) -> Result<StatusMessage, ApiError> {
        self.send_json(Method::POST, &tunnel_path(id), None).await
    }

    /// POST /tunnels with a provider scope
    pub async fn restart_all(&self, scope: RestartScope) -> Result<StatusMessage, ApiError> {
        let body = self.body(constants::TUNNELS_PATH, &RestartAllRequest { providers: scope })?;
        self.send_json(Method::POST, constants::TUNNELS_PATH, body).await
    }

    /// DELETE /tunnels/{id}
    pub async fn stop_tunnel(&self, id: u32) -> Result<StatusMessage, ApiError> {
        self.send_json(Method::DELETE, &tunnel_path(id), None).await
    }

    /// DELETE /tunnels/all
    pub async fn stop_all(&self) -> Result<StatusMessage, ApiError> {
        self.send_json(Method::DELETE, constants::ALL_TUNNELS_PATH, None).await
    }

    /// POST /tunnels/{id}/timer, 0 minutes makes the tunnel permanent
    pub async fn set_timer(&self, id: u32, minutes: u32) -> Result<StatusMessage, ApiError> {
        let path = timer_path(id);
        let body = self.body(&path, &TimerRequest { expire: minutes })?;
        self.send_json(Method::POST, &path, body).await
    }

    /// GET /providers
    pub async fn list_providers(&self) -> Result<Vec<Provider>, ApiError> {
        self.send_json(Method::GET, constants::PROVIDERS_PATH, None).await
    }

    /// POST /providers/{id}
    pub async fn toggle_provider(&self, id: u32) -> Result<ProviderToggle, ApiError> {
        let path = provider_path(id);
        let value: serde_json::Value = self.send_json(Method::POST, &path, None).await?;
        ProviderToggle::from_value(value).map_err(|source| ApiError::Decode {
            url: self.url(&path),
            source,
        })
    }

    /// Plain-text export of every tunnel URL
    pub async fn subscription(&self) -> Result<String, ApiError> {
        self.send_text(Method::GET, &self.subscription_url(), None).await
    }

    /// Sign in through the backend's login form
    ///
    /// A successful login redirects to the dashboard; anything else leaves the
    /// client on the login page.
    pub async fn login(&self) -> Result<(), ApiError> {
        let url = self.url(constants::LOGIN_PATH);
        let response = self
            .client
            .post(&url)
            .form(&LoginForm {
                password: &self.api_password,
            })
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        if response.url().path().ends_with(constants::LOGIN_PATH) {
            return Err(ApiError::Login { url });
        }

        tracing::debug!("Signed in at {}", url);
        Ok(())
    }

    /// Full log buffer, oldest line first
    ///
    /// The log routes sit behind the login form, so a session is opened first.
    /// A rejected login is only logged: backends without the form still answer.
    pub async fn logs(&self) -> Result<Vec<String>, ApiError> {
        if let Err(e) = self.login().await {
            tracing::warn!("Continuing without a session: {}", e);
        }

        self.send_json(Method::GET, constants::LOGS_PATH, None).await
    }
}
