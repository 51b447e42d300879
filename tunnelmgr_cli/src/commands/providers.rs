//! Provider commands (providers, toggle)

use crate::api::ApiClient;
use crate::config::Config;
use anyhow::{Context, Result};
use console::style;
use tunnelmgr_common::text::sanitize;
use tunnelmgr_common::ProviderToggle;

/// List providers and whether each is enabled
pub async fn list(config: &Config) -> Result<()> {
    let api = ApiClient::new(config).context("Failed to create API client")?;
    let providers = api
        .list_providers()
        .await
        .context("Failed to fetch providers")?;

    if providers.is_empty() {
        println!("No providers available.");
        return Ok(());
    }

    println!("{:<4} {:<24} {}", "ID", "PROVIDER", "ENABLED");
    println!("{}", "-".repeat(40));

    for provider in providers {
        let enabled = if provider.is_enabled() {
            style("yes").green()
        } else {
            style("no").dim()
        };
        println!("{:<4} {:<24} {}", provider.id, sanitize(&provider.provider), enabled);
    }

    Ok(())
}

/// Flip a provider's enabled flag; the server answers with the new state
pub async fn toggle(config: &Config, id: u32) -> Result<()> {
    let api = ApiClient::new(config).context("Failed to create API client")?;
    let toggle = api
        .toggle_provider(id)
        .await
        .context("Failed to toggle provider")?;

    match &toggle {
        ProviderToggle::Toggled(_) => println!("{}", toggle_line(&toggle)),
        ProviderToggle::Failed(status) => super::print_status(status),
    }
    Ok(())
}

fn toggle_line(toggle: &ProviderToggle) -> String {
    match toggle {
        ProviderToggle::Toggled(state) => {
            format!("{} {}", style("✓").green().bold(), sanitize(&state.describe()))
        }
        ProviderToggle::Failed(status) => super::result_line(status, status.message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunnelmgr_common::{ProviderState, StatusMessage};

    #[test]
    fn test_toggle_line() {
        let toggled = ProviderToggle::Toggled(ProviderState {
            provider: "Zrok".to_string(),
            user_enabled: true,
        });
        let line = toggle_line(&toggled);
        assert!(line.contains("✓"));
        assert!(line.contains("Zrok is now set to enabled."));

        let failed = ProviderToggle::Failed(StatusMessage {
            code: Some("error".to_string()),
            msg: Some("Provider not found".to_string()),
            ..StatusMessage::default()
        });
        let line = toggle_line(&failed);
        assert!(line.contains("✗"));
        assert!(line.contains("Provider not found"));
    }
}
