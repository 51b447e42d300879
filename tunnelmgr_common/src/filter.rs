//! Substring-based log filtering
//!
//! Log lines are never parsed. A line belongs to a provider when the
//! provider's lowercase name occurs anywhere in the lowercased line, and to a
//! severity when the severity token does. An empty selection on either axis
//! matches every line on that axis.

use crate::ModelError;
use std::fmt;
use std::str::FromStr;

/// Fixed severity tokens offered by the log viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Severity used to colour a line: error wins over warning, anything else is plain
    pub fn classify(line: &str) -> Option<Severity> {
        let lower = line.to_lowercase();
        if lower.contains(Severity::Error.as_str()) {
            Some(Severity::Error)
        } else if lower.contains(Severity::Warning.as_str()) {
            Some(Severity::Warning)
        } else {
            None
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownSeverity(s.to_string()))
    }
}

/// Checked providers and severities at the time of filtering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSelection {
    providers: Vec<String>,
    levels: Vec<Severity>,
}

impl LogSelection {
    pub fn new<I, S>(providers: I, levels: impl IntoIterator<Item = Severity>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            providers: providers
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
            levels: levels.into_iter().collect(),
        }
    }

    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    pub fn levels(&self) -> &[Severity] {
        &self.levels
    }

    /// Whether a single line passes both axes
    pub fn matches(&self, line: &str) -> bool {
        let lower = line.to_lowercase();

        let provider_match =
            self.providers.is_empty() || self.providers.iter().any(|p| lower.contains(p.as_str()));
        let level_match =
            self.levels.is_empty() || self.levels.iter().any(|l| lower.contains(l.as_str()));

        provider_match && level_match
    }
}

/// Subsequence of `logs` matching `selection`, order preserved
pub fn filter_logs<'a>(logs: &'a [String], selection: &LogSelection) -> Vec<&'a str> {
    logs.iter()
        .map(String::as_str)
        .filter(|line| selection.matches(line))
        .collect()
}
