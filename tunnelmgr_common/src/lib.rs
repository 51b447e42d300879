//! Tunnelmgr Common - Shared data model for the tunnel manager client
//!
//! This crate contains the wire types returned by the tunnel manager backend,
//! the log filter used by the log viewer, and the expiry progress computation
//! used by the tunnel detail view. Nothing in here performs I/O.

pub mod filter;
pub mod progress;
pub mod text;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use filter::{filter_logs, LogSelection, Severity};
pub use progress::{Band, ExpiryProgress};

/// Model errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown restart scope: {0} (expected `all` or `enabled`)")]
    UnknownScope(String),

    #[error("Unknown severity: {0} (expected `error`, `warning` or `info`)")]
    UnknownSeverity(String),
}

/// A tunnel as reported by the backend
///
/// The backend serialises its tunnel objects loosely: the single-tunnel
/// endpoint omits `id`, a stopped tunnel has a null `process` and
/// `public_url`, and permanent tunnels have no end time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tunnel {
    /// Position in the backend's tunnel table (absent on the detail endpoint)
    #[serde(default)]
    pub id: Option<u32>,

    /// Name of the provider hosting this tunnel
    #[serde(default)]
    pub provider_instance: String,

    /// Subscription URL served through the tunnel
    #[serde(default)]
    pub url: String,

    /// Public hostname assigned by the provider
    #[serde(default)]
    pub public_url: Option<String>,

    /// Opaque process handle; present while the tunnel runs
    #[serde(default)]
    pub process: Option<serde_json::Value>,

    /// Unix seconds the tunnel was started
    #[serde(default)]
    pub tun_start_time: Option<f64>,

    /// Unix seconds the tunnel expires
    #[serde(default)]
    pub tun_end_time: Option<f64>,
}

impl Tunnel {
    /// A tunnel without a process is unavailable
    pub fn is_running(&self) -> bool {
        matches!(&self.process, Some(v) if !v.is_null())
    }

    /// Start and end of the expiry window in milliseconds, if the tunnel expires
    pub fn expiry_window(&self) -> Option<(f64, f64)> {
        match (self.tun_start_time, self.tun_end_time) {
            (Some(start), Some(end)) => Some((start * 1000.0, end * 1000.0)),
            _ => None,
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_running() {
            "Running"
        } else {
            "Stopped"
        }
    }
}

/// A provider entry from `GET /providers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: u32,
    pub provider: String,

    /// Only reported by the dashboard endpoint
    #[serde(default)]
    pub user_enabled: Option<bool>,
}

impl Provider {
    pub fn is_enabled(&self) -> bool {
        self.user_enabled.unwrap_or(false)
    }
}

/// Authoritative provider state returned after a toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderState {
    pub provider: String,
    pub user_enabled: bool,
}

impl ProviderState {
    pub fn describe(&self) -> String {
        format!(
            "{} is now set to {}.",
            self.provider,
            if self.user_enabled { "enabled" } else { "disabled" }
        )
    }
}

/// Status body returned by mutating endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub msg: Option<String>,

    /// Some not-found responses carry only an `error` field
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub details: Option<String>,
}

impl StatusMessage {
    /// Only an explicit `"error"` code counts as an application failure
    pub fn is_error(&self) -> bool {
        self.code.as_deref() == Some(constants::ERROR_CODE)
    }

    pub fn message(&self) -> &str {
        self.msg
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("No message from server.")
    }
}

/// Reply of `GET /tunnels/{id}`: the tunnel, or an error body for unknown ids
#[derive(Debug, Clone, PartialEq)]
pub enum TunnelDetail {
    Found(Tunnel),
    Missing(StatusMessage),
}

impl TunnelDetail {
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let is_error = value
            .get("code")
            .and_then(|code| code.as_str())
            .is_some_and(|code| code == constants::ERROR_CODE);

        if is_error {
            Ok(TunnelDetail::Missing(serde_json::from_value(value)?))
        } else {
            Ok(TunnelDetail::Found(serde_json::from_value(value)?))
        }
    }
}

/// Reply of `POST /providers/{id}`: the new state, or an error body for unknown ids
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderToggle {
    Toggled(ProviderState),
    Failed(StatusMessage),
}

impl ProviderToggle {
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let is_error = value
            .get("code")
            .and_then(|code| code.as_str())
            .is_some_and(|code| code == constants::ERROR_CODE);

        if is_error {
            Ok(ProviderToggle::Failed(serde_json::from_value(value)?))
        } else {
            Ok(ProviderToggle::Toggled(serde_json::from_value(value)?))
        }
    }
}

/// Which tunnels `POST /tunnels` restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestartScope {
    #[default]
    All,
    Enabled,
}

impl RestartScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartScope::All => "all",
            RestartScope::Enabled => "enabled",
        }
    }
}

impl fmt::Display for RestartScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestartScope {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(RestartScope::All),
            "enabled" => Ok(RestartScope::Enabled),
            _ => Err(ModelError::UnknownScope(s.to_string())),
        }
    }
}

/// Body of `POST /tunnels`
#[derive(Debug, Clone, Serialize)]
pub struct RestartAllRequest {
    pub providers: RestartScope,
}

/// Body of `POST /tunnels/{id}/timer`
#[derive(Debug, Clone, Serialize)]
pub struct TimerRequest {
    /// Minutes until expiry, 0 makes the tunnel permanent
    pub expire: u32,
}

/// Constants shared by the client views
pub mod constants {
    /// Application-level failure code in status bodies
    pub const ERROR_CODE: &str = "error";

    /// Provider collection
    pub const PROVIDERS_PATH: &str = "/providers";

    /// Tunnel collection
    pub const TUNNELS_PATH: &str = "/tunnels";

    /// Pseudo-id addressing every tunnel on DELETE
    pub const ALL_TUNNELS_PATH: &str = "/tunnels/all";

    /// Log viewer mount, relative to the API path
    pub const LOGS_PATH: &str = "/logs/all";

    /// Form login, relative to the API path
    pub const LOGIN_PATH: &str = "/login";

    /// Subscription export, relative to the subscription path
    pub const SUBSCRIPTION_PATH: &str = "/subscription";

    /// How long a toast stays visible
    pub const TOAST_DURATION_MS: u64 = 3000;

    /// Length of the toast fade before removal
    pub const TOAST_FADE_MS: u64 = 500;

    /// Expiry progress refresh interval
    pub const PROGRESS_TICK_MS: u64 = 1000;

    /// Expiry slider bounds in minutes
    pub const EXPIRY_MIN_MINUTES: u32 = 1;
    pub const EXPIRY_MAX_MINUTES: u32 = 1440;

    /// Subscription passwords shorter than this are hashed by the backend
    pub const MIN_SUBSCRIPTION_PASSWORD_LEN: usize = 16;
}

/// Path of a single tunnel
pub fn tunnel_path(id: u32) -> String {
    format!("{}/{}", constants::TUNNELS_PATH, id)
}

/// Path of a tunnel's timer sub-resource
pub fn timer_path(id: u32) -> String {
    format!("{}/{}/timer", constants::TUNNELS_PATH, id)
}

/// Path of a single provider
pub fn provider_path(id: u32) -> String {
    format!("{}/{}", constants::PROVIDERS_PATH, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tunnel_list_entry() {
        let json = r#"{
            "id": 2,
            "provider_instance": "CloudflareTunnel",
            "url": "vless://abc@host:443?type=ws#cf",
            "public_url": "abc.trycloudflare.com",
            "process": "Popen",
            "start_time": 1700000000.5,
            "logs": []
        }"#;

        let tunnel: Tunnel = serde_json::from_str(json).unwrap();
        assert_eq!(tunnel.id, Some(2));
        assert_eq!(tunnel.provider_instance, "CloudflareTunnel");
        assert!(tunnel.is_running());
        assert_eq!(tunnel.status_label(), "Running");
        assert!(tunnel.expiry_window().is_none());
    }

    #[test]
    fn test_stopped_tunnel_detail() {
        let json = r#"{
            "provider_instance": "PinggyTunnel",
            "url": "vmess://xyz",
            "public_url": null,
            "process": null,
            "tun_start_time": 1000,
            "tun_end_time": 2000
        }"#;

        let tunnel: Tunnel = serde_json::from_str(json).unwrap();
        assert_eq!(tunnel.id, None);
        assert!(!tunnel.is_running());
        assert_eq!(tunnel.public_url, None);
        assert_eq!(tunnel.expiry_window(), Some((1_000_000.0, 2_000_000.0)));
    }

    #[test]
    fn test_tunnel_detail_reply() {
        let found = TunnelDetail::from_value(serde_json::json!({
            "provider_instance": "ZrokTunnel",
            "url": "vless://a",
            "process": "Popen"
        }))
        .unwrap();
        assert!(matches!(found, TunnelDetail::Found(ref t) if t.is_running()));

        let missing = TunnelDetail::from_value(serde_json::json!({
            "msg": "Tunnel not found",
            "code": "error"
        }))
        .unwrap();
        match missing {
            TunnelDetail::Missing(status) => assert_eq!(status.message(), "Tunnel not found"),
            other => panic!("Expected missing tunnel, got {:?}", other),
        }
    }

    #[test]
    fn test_provider_without_enabled_flag() {
        let provider: Provider = serde_json::from_str(r#"{"id": 0, "provider": "Zrok"}"#).unwrap();
        assert_eq!(provider.user_enabled, None);
        assert!(!provider.is_enabled());
    }

    #[test]
    fn test_provider_state_description() {
        let state = ProviderState {
            provider: "LocalTunnel".to_string(),
            user_enabled: false,
        };
        assert_eq!(state.describe(), "LocalTunnel is now set to disabled.");
    }

    #[test]
    fn test_provider_toggle_reply() {
        let toggled = ProviderToggle::from_value(serde_json::json!({
            "id": 1,
            "provider": "Zrok",
            "user_enabled": true
        }))
        .unwrap();
        match toggled {
            ProviderToggle::Toggled(state) => {
                assert_eq!(state.describe(), "Zrok is now set to enabled.")
            }
            other => panic!("Expected new provider state, got {:?}", other),
        }

        let unknown = ProviderToggle::from_value(serde_json::json!({
            "msg": "Provider not found",
            "code": "error"
        }))
        .unwrap();
        match unknown {
            ProviderToggle::Failed(status) => {
                assert!(status.is_error());
                assert_eq!(status.message(), "Provider not found");
            }
            other => panic!("Expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_status_message_code() {
        let failed: StatusMessage =
            serde_json::from_str(r#"{"msg": "Unable to start", "code": "error"}"#).unwrap();
        assert!(failed.is_error());
        assert_eq!(failed.message(), "Unable to start");

        let reset: StatusMessage = serde_json::from_str(r#"{"msg": "Tunnel has been reset"}"#).unwrap();
        assert!(!reset.is_error());

        let missing: StatusMessage = serde_json::from_str(r#"{"error": "Tunnel not found"}"#).unwrap();
        assert!(!missing.is_error());
        assert_eq!(missing.message(), "Tunnel not found");
    }

    #[test]
    fn test_restart_scope() {
        let body = serde_json::to_string(&RestartAllRequest {
            providers: RestartScope::Enabled,
        })
        .unwrap();
        assert_eq!(body, r#"{"providers":"enabled"}"#);

        assert_eq!("ALL".parse::<RestartScope>(), Ok(RestartScope::All));
        assert!("some".parse::<RestartScope>().is_err());
    }

    #[test]
    fn test_paths() {
        assert_eq!(tunnel_path(3), "/tunnels/3");
        assert_eq!(timer_path(3), "/tunnels/3/timer");
        assert_eq!(provider_path(1), "/providers/1");
    }
}
