//! Configure command - point the client at a tunnel manager backend

use crate::api::ApiClient;
use crate::config::{config_file, Config};
use anyhow::Result;
use console::style;

fn parse_refresh(input: &str) -> Result<Option<u64>, &'static str> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    input
        .parse::<u64>()
        .map(|secs| (secs > 0).then_some(secs))
        .map_err(|_| "Enter a number of seconds, or leave empty")
}

/// Handle configure command
pub async fn run() -> Result<()> {
    use cliclack::{input, intro, outro, password};

    let mut config = Config::load()?;

    intro(style(" tunnelmgr configure ").on_cyan().black().to_string())?;

    config.server_url = input("Backend URL")
        .default_input(&config.server_url)
        .interact()?;

    config.api_path = input("API path")
        .default_input(&config.api_path)
        .interact()?;

    let subscription: String = password("Subscription password (empty keeps the current one)")
        .mask('▪')
        .interact()?;
    if !subscription.is_empty() {
        config.subscription_password = subscription;
    }

    let current_refresh = config
        .refresh_secs
        .map(|secs| secs.to_string())
        .unwrap_or_default();
    let refresh: String = input("Auto-refresh the dashboard every N seconds")
        .placeholder("never")
        .default_input(&current_refresh)
        .required(false)
        .validate(|value: &String| parse_refresh(value).map(|_| ()))
        .interact()?;
    config.refresh_secs = parse_refresh(&refresh).unwrap_or(None);

    let spinner = cliclack::spinner();
    spinner.start("Checking backend...");
    match ApiClient::new(&config) {
        Ok(api) => match api.list_providers().await {
            Ok(providers) => spinner.stop(format!("Backend reachable, {} providers", providers.len())),
            Err(e) => {
                spinner.error("Backend not reachable");
                cliclack::log::warning(format!("{}", e))?;
            }
        },
        Err(e) => {
            spinner.error("Invalid configuration");
            cliclack::log::warning(format!("{}", e))?;
        }
    }

    config.save()?;
    cliclack::log::success(format!("Saved to {}", config_file().display()))?;

    outro(format!(
        "Run {} to open the dashboard",
        style("tunnelmgr").cyan()
    ))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_refresh() {
        assert_eq!(parse_refresh(""), Ok(None));
        assert_eq!(parse_refresh(" 30 "), Ok(Some(30)));
        assert_eq!(parse_refresh("0"), Ok(None));
        assert!(parse_refresh("soon").is_err());
    }
}
