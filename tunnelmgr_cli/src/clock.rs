//! Wall-clock time and timestamp labels shared by the views and commands

use chrono::{Local, TimeZone};
use tunnelmgr_common::Tunnel;

/// Current wall-clock time in milliseconds
pub fn wall_clock_ms() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64
}

/// Local date and time of a Unix timestamp in seconds
pub fn format_time(unix_secs: f64) -> String {
    let millis = (unix_secs * 1000.0) as i64;
    match Local.timestamp_millis_opt(millis).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "N/A".to_string(),
    }
}

pub fn created_label(tunnel: &Tunnel) -> String {
    tunnel
        .tun_start_time
        .map(format_time)
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn expiry_label(tunnel: &Tunnel) -> String {
    tunnel
        .tun_end_time
        .map(format_time)
        .unwrap_or_else(|| "∞".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tunnel(start: Option<f64>, end: Option<f64>) -> Tunnel {
        Tunnel {
            id: None,
            provider_instance: "PinggyTunnel".to_string(),
            url: "vless://uuid@a.pinggy.link:443?type=ws#pinggy".to_string(),
            public_url: Some("a.pinggy.link".to_string()),
            process: None,
            tun_start_time: start,
            tun_end_time: end,
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(created_label(&tunnel(None, None)), "N/A");
        assert_ne!(created_label(&tunnel(Some(1_700_000_000.0), None)), "N/A");
        assert_eq!(expiry_label(&tunnel(Some(1000.0), None)), "∞");
        assert_eq!(
            expiry_label(&tunnel(None, Some(1_700_000_000.0))),
            format_time(1_700_000_000.0)
        );
    }

    #[test]
    fn test_wall_clock_is_after_2020() {
        assert!(wall_clock_ms() > 1_577_836_800_000.0);
    }
}
