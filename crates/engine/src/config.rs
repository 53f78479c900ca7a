//! Engine configuration.
//!
//! Read from the environment (`ITEMXFER_DIAGNOSTICS`) or deserialized by the
//! embedder. Everything has a default.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diagnostics::{TransferDiagnostics, SilentDiagnostics, TracingDiagnostics};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
}

/// What to do when a storage over-reports an extraction or insertion.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticsPolicy {
    /// Log a warning.
    #[default]
    Warn,
    /// Say nothing.
    Silent,
}

impl DiagnosticsPolicy {
    pub fn build(self) -> Arc<dyn TransferDiagnostics> {
        match self {
            DiagnosticsPolicy::Warn => Arc::new(TracingDiagnostics),
            DiagnosticsPolicy::Silent => Arc::new(SilentDiagnostics),
        }
    }
}

impl FromStr for DiagnosticsPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(DiagnosticsPolicy::Warn),
            "silent" => Ok(DiagnosticsPolicy::Silent),
            _ => Err(ConfigError::InvalidValue {
                var: EngineConfig::DIAGNOSTICS_VAR.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub diagnostics: DiagnosticsPolicy,
}

impl EngineConfig {
    pub const DIAGNOSTICS_VAR: &'static str = "ITEMXFER_DIAGNOSTICS";

    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable source (unset variables keep their default).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(Self::DIAGNOSTICS_VAR) {
            config.diagnostics = value.parse()?;
        }
        Ok(config)
    }
}
