//! `[tools]` section.
use serde::Deserialize;
use std::time::Duration;

use crate::wait::PollOptions;

/// Longest download wait accepted without a validation warning (one day).
pub const MAX_DOWNLOAD_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Optional tool installers to run with `--all`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsSection {
    /// Tool names from the installer catalogue.
    pub enabled: Vec<String>,
    /// Upper bound on waiting for a download to land.
    pub download_timeout_secs: u64,
    /// Delay between download checks.
    pub poll_interval_ms: u64,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            enabled: Vec::new(),
            download_timeout_secs: 300,
            poll_interval_ms: 500,
        }
    }
}

impl ToolsSection {
    /// Polling options for download waits.
    #[must_use]
    pub const fn poll_options(&self) -> PollOptions {
        PollOptions {
            timeout: Duration::from_secs(self.download_timeout_secs),
            interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let tools: ToolsSection = toml::from_str("").unwrap();
        assert!(tools.enabled.is_empty());
        assert_eq!(tools.poll_options(), PollOptions::default());
    }

    #[test]
    fn custom_timeout() {
        let tools: ToolsSection =
            toml::from_str("enabled = [\"tpm\"]\ndownload_timeout_secs = 60").unwrap();
        assert_eq!(tools.enabled, vec!["tpm"]);
        assert_eq!(tools.poll_options().timeout, Duration::from_secs(60));
    }

    #[test]
    fn huge_timeout_deserializes_and_polls() {
        let tools: ToolsSection =
            toml::from_str("download_timeout_secs = 9223372036854775807").unwrap();
        crate::wait::poll_until("x", tools.poll_options(), || true).unwrap();
    }
}
