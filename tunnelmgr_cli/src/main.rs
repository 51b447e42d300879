//! Tunnelmgr CLI - Dashboard and log viewer for a tunnel manager backend
//!
//! Usage:
//!   tunnelmgr [dashboard]        Open the tunnel dashboard
//!   tunnelmgr logs               Open the log viewer
//!   tunnelmgr ls                 List tunnels
//!   tunnelmgr info <ID>          Show a tunnel with its QR code
//!   tunnelmgr restart <ID>       Restart a tunnel
//!   tunnelmgr stop <ID>          Stop a tunnel
//!   tunnelmgr timer <ID> <MIN>   Set a tunnel's expiry
//!   tunnelmgr configure          Configure the backend

mod api;
mod clipboard;
mod clock;
mod commands;
mod config;
mod qr;
mod tui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{Config, Overrides};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunnelmgr_common::{RestartScope, Severity};

#[derive(Parser)]
#[command(name = "tunnelmgr")]
#[command(author = "Tunnelmgr Team")]
#[command(version)]
#[command(about = "Manage tunnels and read logs of a tunnel manager backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend base URL
    #[arg(long, global = true, env = "TUNNELMGR_SERVER")]
    server: Option<String>,

    /// API mount path of the backend
    #[arg(long, global = true, env = "TUNNELMGR_API_PATH")]
    api_path: Option<String>,

    /// Subscription password the backend was started with
    #[arg(long, global = true, env = "TUNNELMGR_SUBSCRIPTION_PASSWORD", hide_env_values = true)]
    subscription_password: Option<String>,

    /// Re-fetch the dashboard every N seconds
    #[arg(long, global = true)]
    refresh: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the tunnel dashboard (default)
    Dashboard,

    /// Open the log viewer
    Logs {
        /// Print matching lines instead of opening the viewer
        #[arg(long)]
        plain: bool,

        /// Keep lines mentioning this provider (repeatable)
        #[arg(short, long = "provider", requires = "plain")]
        providers: Vec<String>,

        /// Keep lines of this level: error, warning or info (repeatable)
        #[arg(short, long = "level", requires = "plain")]
        levels: Vec<Severity>,

        /// Do not filter by provider at all
        #[arg(long, requires = "plain", conflicts_with = "providers")]
        all_providers: bool,
    },

    /// List tunnels
    Ls,

    /// Show a tunnel's details, expiry and QR code
    Info {
        /// Tunnel ID
        id: u32,
    },

    /// Restart a tunnel
    Restart {
        /// Tunnel ID
        id: u32,
    },

    /// Restart all tunnels
    RestartAll {
        /// Which tunnels to restart: all or enabled
        #[arg(long, default_value = "all")]
        scope: RestartScope,
    },

    /// Stop a tunnel
    Stop {
        /// Tunnel ID
        id: u32,
    },

    /// Stop all tunnels
    StopAll,

    /// Set a tunnel's expiry
    Timer {
        /// Tunnel ID
        id: u32,

        /// Minutes until expiry, 0 makes the tunnel permanent
        #[arg(value_parser = clap::value_parser!(u32).range(0..=1440))]
        minutes: u32,
    },

    /// List providers
    Providers,

    /// Enable or disable a provider
    Toggle {
        /// Provider ID
        id: u32,
    },

    /// Print the subscription export
    Subscription,

    /// Configure the backend connection
    Configure,
}

impl Commands {
    /// Full-screen views must not log to the terminal they draw on
    fn is_full_screen(&self) -> bool {
        matches!(self, Commands::Dashboard | Commands::Logs { plain: false, .. })
    }
}

fn init_logging(verbose: bool, full_screen: bool) -> Result<()> {
    let log_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{},tunnelmgr=info", log_level).into());

    if full_screen {
        config::ensure_dirs()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(config::tui_log_file())
            .context("Failed to open log file")?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Environment from .env must be in place before clap reads it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Dashboard);

    init_logging(cli.verbose, command.is_full_screen())?;

    let config = Config::load()?.with_overrides(Overrides {
        server_url: cli.server,
        api_path: cli.api_path,
        subscription_password: cli.subscription_password,
        refresh_secs: cli.refresh,
    });
    tracing::debug!("Using backend {}", config.api_base());

    match command {
        Commands::Dashboard => {
            let api = api::ApiClient::new(&config)?;
            tui::run(tui::Dashboard::new(), api, config.refresh_interval()).await?;
        }

        Commands::Logs {
            plain: false,
            ..
        } => {
            let api = api::ApiClient::new(&config)?;
            // The buffer is fetched once; `g` reloads it on demand
            tui::run(tui::LogViewer::new(), api, None).await?;
        }

        Commands::Logs {
            plain: true,
            providers,
            levels,
            all_providers,
        } => {
            let options = commands::logs::LogOptions {
                providers,
                levels,
                all_providers,
            };
            commands::logs::dump(&config, options).await?;
        }

        Commands::Ls => {
            commands::tunnels::list(&config).await?;
        }

        Commands::Info { id } => {
            commands::tunnels::info(&config, id).await?;
        }

        Commands::Restart { id } => {
            commands::tunnels::restart(&config, id).await?;
        }

        Commands::RestartAll { scope } => {
            commands::tunnels::restart_all(&config, scope).await?;
        }

        Commands::Stop { id } => {
            commands::tunnels::stop(&config, id).await?;
        }

        Commands::StopAll => {
            commands::tunnels::stop_all(&config).await?;
        }

        Commands::Timer { id, minutes } => {
            commands::tunnels::timer(&config, id, minutes).await?;
        }

        Commands::Providers => {
            commands::providers::list(&config).await?;
        }

        Commands::Toggle { id } => {
            commands::providers::toggle(&config, id).await?;
        }

        Commands::Subscription => {
            commands::tunnels::subscription(&config).await?;
        }

        Commands::Configure => {
            commands::configure::run().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_is_dashboard() {
        let cli = Cli::try_parse_from(["tunnelmgr"]).unwrap();
        assert!(cli.command.is_none());
        assert!(Commands::Dashboard.is_full_screen());
    }

    #[test]
    fn test_plain_log_filters() {
        let cli = Cli::try_parse_from([
            "tunnelmgr", "logs", "--plain", "-p", "Zrok", "--level", "ERROR", "--level", "warning",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Logs {
                plain,
                providers,
                levels,
                all_providers,
            }) => {
                assert!(plain);
                assert_eq!(providers, vec!["Zrok".to_string()]);
                assert_eq!(levels, vec![Severity::Error, Severity::Warning]);
                assert!(!all_providers);
            }
            _ => panic!("Expected logs command"),
        }

        assert!(Cli::try_parse_from(["tunnelmgr", "logs", "--level", "debug", "--plain"]).is_err());
        assert!(Cli::try_parse_from(["tunnelmgr", "logs", "-p", "Zrok"]).is_err());
    }

    #[test]
    fn test_timer_range_and_scope() {
        assert!(Cli::try_parse_from(["tunnelmgr", "timer", "1", "0"]).is_ok());
        assert!(Cli::try_parse_from(["tunnelmgr", "timer", "1", "1441"]).is_err());

        let cli = Cli::try_parse_from(["tunnelmgr", "restart-all", "--scope", "enabled"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::RestartAll {
                scope: RestartScope::Enabled
            })
        ));
        let cli = Cli::try_parse_from(["tunnelmgr", "restart-all"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::RestartAll {
                scope: RestartScope::All
            })
        ));
    }
}
