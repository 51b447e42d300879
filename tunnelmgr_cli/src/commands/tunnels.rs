//! Tunnel commands (ls, info, restart, stop, timer, subscription)

use super::{print_result, print_status};
use crate::api::ApiClient;
use crate::config::Config;
use crate::qr;
use crate::clock::{created_label, expiry_label, wall_clock_ms};
use anyhow::{Context, Result};
use console::style;
use tunnelmgr_common::text::{sanitize, truncate};
use tunnelmgr_common::{Band, ExpiryProgress, RestartScope, Tunnel, TunnelDetail};

const BAR_WIDTH: usize = 30;

fn client(config: &Config) -> Result<ApiClient> {
    ApiClient::new(config).context("Failed to create API client")
}

/// One row of the `ls` table
fn tunnel_row(index: usize, tunnel: &Tunnel) -> String {
    let id = tunnel.id.unwrap_or(index as u32);
    let status = if tunnel.is_running() {
        "running"
    } else {
        "unavailable"
    };

    format!(
        "{:<4} {:<20} {:<12} {:<40} {}",
        id,
        truncate(&sanitize(&tunnel.provider_instance), 20),
        status,
        truncate(&sanitize(&tunnel.url), 40),
        expiry_label(tunnel)
    )
}

/// Text progress bar with the remaining share filled
fn progress_bar(progress: &ExpiryProgress, width: usize) -> String {
    let filled = (progress.percentage / 100.0 * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// List all tunnels
pub async fn list(config: &Config) -> Result<()> {
    let tunnels = client(config)?
        .list_tunnels()
        .await
        .context("Failed to fetch tunnels")?;

    if tunnels.is_empty() {
        println!("No tunnels available.");
        return Ok(());
    }

    println!(
        "{:<4} {:<20} {:<12} {:<40} {}",
        "ID", "PROVIDER", "STATUS", "URL", "EXPIRES"
    );
    println!("{}", "-".repeat(100));

    for (index, tunnel) in tunnels.iter().enumerate() {
        let row = tunnel_row(index, tunnel);
        if tunnel.is_running() {
            println!("{}", row);
        } else {
            println!("{}", style(row).dim());
        }
    }

    Ok(())
}

/// Show one tunnel with its expiry progress and a QR code of its URL
pub async fn info(config: &Config, id: u32) -> Result<()> {
    let detail = client(config)?
        .get_tunnel(id)
        .await
        .context("Failed to fetch tunnel")?;

    let tunnel = match detail {
        TunnelDetail::Found(tunnel) => tunnel,
        TunnelDetail::Missing(status) => {
            print_status(&status);
            return Ok(());
        }
    };

    let status = if tunnel.is_running() {
        style(tunnel.status_label()).green()
    } else {
        style(tunnel.status_label()).red()
    };

    println!();
    println!("  {}  {}", style("Provider  ").dim(), sanitize(&tunnel.provider_instance));
    println!("  {}  {}", style("URL       ").dim(), style(sanitize(&tunnel.url)).green());
    println!(
        "  {}  {}",
        style("Public URL").dim(),
        style(sanitize(tunnel.public_url.as_deref().unwrap_or_default())).magenta()
    );
    println!("  {}  {}", style("Status    ").dim(), status);
    println!("  {}  {}", style("Created   ").dim(), created_label(&tunnel));
    println!("  {}  {}", style("Expires   ").dim(), expiry_label(&tunnel));

    if let Some((start, end)) = tunnel.expiry_window() {
        let progress = ExpiryProgress::compute(start, end, wall_clock_ms());
        let bar = progress_bar(&progress, BAR_WIDTH);
        let bar = match progress.band {
            Band::Green => style(bar).green(),
            Band::Amber => style(bar).yellow(),
            Band::Red => style(bar).red(),
        };
        println!("  {}  {} {:.0}%", style("Time left ").dim(), bar, progress.percentage);
    }

    qr::print_qr_code(&tunnel.url);
    Ok(())
}

/// Restart one tunnel
pub async fn restart(config: &Config, id: u32) -> Result<()> {
    let status = client(config)?
        .restart_tunnel(id)
        .await
        .context("Failed to restart tunnel")?;
    print_status(&status);
    Ok(())
}

/// Restart every tunnel in `scope`
pub async fn restart_all(config: &Config, scope: RestartScope) -> Result<()> {
    let status = client(config)?
        .restart_all(scope)
        .await
        .context("Failed to restart tunnels")?;
    print_result(&status, "All tunnels restarted successfully.");
    Ok(())
}

/// Stop one tunnel
pub async fn stop(config: &Config, id: u32) -> Result<()> {
    let status = client(config)?
        .stop_tunnel(id)
        .await
        .context("Failed to stop tunnel")?;
    print_result(&status, "Tunnel stopped successfully.");
    Ok(())
}

/// Stop every tunnel
pub async fn stop_all(config: &Config) -> Result<()> {
    let status = client(config)?
        .stop_all()
        .await
        .context("Failed to stop tunnels")?;
    print_result(&status, "All tunnels stopped successfully.");
    Ok(())
}

/// Set a tunnel's expiry in minutes, 0 makes it permanent
pub async fn timer(config: &Config, id: u32, minutes: u32) -> Result<()> {
    let status = client(config)?
        .set_timer(id, minutes)
        .await
        .context("Failed to set expiry")?;
    print_status(&status);
    Ok(())
}

/// Print the subscription export
pub async fn subscription(config: &Config) -> Result<()> {
    let text = client(config)?
        .subscription()
        .await
        .context("Failed to fetch subscription")?;
    print!("{}", text);
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tunnel(id: Option<u32>, running: bool) -> Tunnel {
        Tunnel {
            id,
            provider_instance: "LocalTunnel".to_string(),
            url: "vless://uuid@x.loca.lt:443?type=ws&security=tls#localtunnel-with-a-long-name"
                .to_string(),
            public_url: Some("x.loca.lt".to_string()),
            process: running.then(|| serde_json::json!("Popen")),
            tun_start_time: None,
            tun_end_time: None,
        }
    }

    #[test]
    fn test_tunnel_row() {
        let row = tunnel_row(7, &tunnel(Some(2), true));
        assert!(row.starts_with("2    LocalTunnel"));
        assert!(row.contains("running"));
        assert!(row.contains("..."));
        assert!(row.ends_with("∞"));

        let row = tunnel_row(7, &tunnel(None, false));
        assert!(row.starts_with("7 "));
        assert!(row.contains("unavailable"));
    }

    #[test]
    fn test_progress_bar() {
        let half = ExpiryProgress::compute(0.0, 1000.0, 500.0);
        assert_eq!(progress_bar(&half, 10), "█████░░░░░");

        let full = ExpiryProgress::compute(1000.0, 2000.0, 0.0);
        assert_eq!(progress_bar(&full, 4), "████");

        let done = ExpiryProgress::compute(0.0, 1000.0, 5000.0);
        assert_eq!(progress_bar(&done, 4), "░░░░");
    }
}
