//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a snapshot's record set relates to the scope's full roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestMode {
    /// The snapshot is the complete roster; keys absent from it are swept.
    Full,
    /// The snapshot carries only changed records; absence means nothing and
    /// the sweep is skipped.
    Delta,
}

impl IngestMode {
    /// String representation of the mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Delta => "delta",
        }
    }
}

impl fmt::Display for IngestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IngestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "delta" => Ok(Self::Delta),
            _ => Err(format!("Invalid ingest mode: {s}")),
        }
    }
}

/// Configuration for a [`Reconciler`](crate::engine::Reconciler).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Snapshot completeness mode.
    #[serde(default = "default_mode")]
    pub mode: IngestMode,
    /// Compute the pass but commit nothing.
    #[serde(default)]
    pub dry_run: bool,
}

fn default_mode() -> IngestMode {
    IngestMode::Full
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            mode: IngestMode::Full,
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IngestConfig::default();
        assert_eq!(config.mode, IngestMode::Full);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_deserialize_empty_object_uses_defaults() {
        let config: IngestConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.mode, IngestMode::Full);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_deserialize_delta_dry_run() {
        let config: IngestConfig =
            serde_json::from_str("{\"mode\":\"delta\",\"dry_run\":true}").unwrap();
        assert_eq!(config.mode, IngestMode::Delta);
        assert!(config.dry_run);
    }

    #[test]
    fn test_mode_string_roundtrip() {
        assert_eq!("full".parse::<IngestMode>().unwrap(), IngestMode::Full);
        assert_eq!("delta".parse::<IngestMode>().unwrap(), IngestMode::Delta);
        assert!("partial".parse::<IngestMode>().is_err());
        assert_eq!(IngestMode::Delta.to_string(), "delta");
    }
}
