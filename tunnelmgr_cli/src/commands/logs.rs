//! Plain log dump with the same filtering as the log viewer

use crate::api::ApiClient;
use crate::config::Config;
use anyhow::{Context, Result};
use console::style;
use tunnelmgr_common::text::sanitize;
use tunnelmgr_common::{filter_logs, LogSelection, Provider, Severity};

/// Filters given on the command line
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Providers to keep; every known provider when empty
    pub providers: Vec<String>,
    /// Levels to keep; every level when empty
    pub levels: Vec<Severity>,
    /// Ignore the provider axis altogether
    pub all_providers: bool,
}

impl LogOptions {
    /// Selection equivalent to the log viewer's checkboxes
    ///
    /// Without explicit providers every known provider is checked, like the
    /// viewer's defaults.
    pub fn selection(&self, known: &[Provider]) -> LogSelection {
        let providers: Vec<&str> = if self.all_providers {
            Vec::new()
        } else if self.providers.is_empty() {
            known.iter().map(|p| p.provider.as_str()).collect()
        } else {
            self.providers.iter().map(String::as_str).collect()
        };

        let levels = if self.levels.is_empty() {
            Severity::ALL.to_vec()
        } else {
            self.levels.clone()
        };

        LogSelection::new(providers, levels)
    }

    fn needs_providers(&self) -> bool {
        !self.all_providers && self.providers.is_empty()
    }
}

/// Print matching log lines, newest first
pub async fn dump(config: &Config, options: LogOptions) -> Result<()> {
    let api = ApiClient::new(config).context("Failed to create API client")?;

    let mut logs = api.logs().await.context("Failed to fetch logs")?;
    logs.reverse();

    let known = if options.needs_providers() {
        api.list_providers()
            .await
            .context("Failed to fetch providers")?
    } else {
        Vec::new()
    };

    let selection = options.selection(&known);
    let matching = filter_logs(&logs, &selection);

    if matching.is_empty() {
        eprintln!("No logs match the current filters.");
        return Ok(());
    }

    for line in matching {
        let line = sanitize(line);
        match Severity::classify(&line) {
            Some(Severity::Error) => println!("{}", style(line).red()),
            Some(Severity::Warning) => println!("{}", style(line).yellow()),
            _ => println!("{}", line),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<Provider> {
        vec![
            Provider {
                id: 0,
                provider: "Cloudflare".to_string(),
                user_enabled: None,
            },
            Provider {
                id: 1,
                provider: "Zrok".to_string(),
                user_enabled: None,
            },
        ]
    }

    #[test]
    fn test_defaults_check_every_known_provider() {
        let options = LogOptions::default();
        assert!(options.needs_providers());

        let selection = options.selection(&known());
        assert_eq!(selection.providers(), ["cloudflare".to_string(), "zrok".to_string()]);
        assert_eq!(selection.levels(), Severity::ALL);
        assert!(!selection.matches("INFO - main - started"));
        assert!(selection.matches("INFO - Zrok tunnel up"));
    }

    #[test]
    fn test_explicit_filters() {
        let options = LogOptions {
            providers: vec!["Beta".to_string()],
            levels: vec![Severity::Error],
            all_providers: false,
        };
        assert!(!options.needs_providers());

        let selection = options.selection(&[]);
        assert!(selection.matches("ERROR provider=beta boom"));
        assert!(!selection.matches("INFO provider=beta ok"));
    }

    #[test]
    fn test_all_providers_skips_provider_axis() {
        let options = LogOptions {
            all_providers: true,
            ..LogOptions::default()
        };
        assert!(!options.needs_providers());

        let selection = options.selection(&known());
        assert!(selection.providers().is_empty());
        assert!(selection.matches("INFO - main - started"));
    }
}
