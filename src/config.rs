//! Analyzer configuration supplied by the host.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// GitHub-hosted runner labels accepted without a warning.
pub const KNOWN_RUNNERS: &[&str] = &[
    "ubuntu-latest",
    "ubuntu-22.04",
    "ubuntu-20.04",
    "ubuntu-18.04",
    "windows-latest",
    "windows-2022",
    "windows-2019",
    "macos-latest",
    "macos-12",
    "macos-11",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    pub known_runners: Vec<String>,
    /// Labels starting with this prefix are never flagged.
    pub self_hosted_prefix: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            known_runners: KNOWN_RUNNERS.iter().map(|r| r.to_string()).collect(),
            self_hosted_prefix: "self-hosted".into(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn accepts_runner(&self, label: &str) -> bool {
        self.known_runners.iter().any(|r| r == label) || label.starts_with(&self.self_hosted_prefix)
    }
}
