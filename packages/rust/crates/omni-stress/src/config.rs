//! Runner configuration and YAML settings loader.
//!
//! Settings files are merged with user over system precedence. Missing files
//! are skipped; unreadable or invalid files are skipped with a warning.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, RunnerError};

const DEFAULT_CONCURRENCY: usize = 8;

/// Validated runner limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Concurrency cap for jobs that do not set their own.
    pub default_concurrency: usize,
    /// Result funnel capacity; `None` means "same as `default_concurrency`".
    pub funnel_capacity: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_concurrency: DEFAULT_CONCURRENCY,
            funnel_capacity: None,
        }
    }
}

impl RunnerConfig {
    /// Config with the given default cap and a funnel sized to match.
    pub fn new(default_concurrency: usize) -> Self {
        Self {
            default_concurrency,
            funnel_capacity: None,
        }
    }

    /// Reject limits that would never admit an execution.
    pub fn validate(&self) -> Result<()> {
        if self.default_concurrency == 0 {
            return Err(RunnerError::InvalidConcurrency(
                "default concurrency must be greater than zero".to_string(),
            ));
        }
        if self.funnel_capacity == Some(0) {
            return Err(RunnerError::InvalidConcurrency(
                "funnel capacity must be greater than zero when provided".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective capacity of the result funnel.
    pub fn funnel_capacity(&self) -> usize {
        self.funnel_capacity.unwrap_or(self.default_concurrency)
    }
}

/// Raw runner settings as they appear in YAML. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunnerSettings {
    /// See `RunnerConfig::default_concurrency`.
    pub default_concurrency: Option<usize>,
    /// See `RunnerConfig::funnel_capacity`.
    pub funnel_capacity: Option<usize>,
}

impl RunnerSettings {
    /// Parse settings strictly from a YAML document.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str::<Self>(raw).map_err(|error| RunnerError::Settings(error.to_string()))
    }

    /// Overlay wins field by field.
    pub fn merge(self, overlay: Self) -> Self {
        Self {
            default_concurrency: overlay.default_concurrency.or(self.default_concurrency),
            funnel_capacity: overlay.funnel_capacity.or(self.funnel_capacity),
        }
    }

    /// Fill unset fields from `RunnerConfig::default()`.
    pub fn into_config(self) -> RunnerConfig {
        let defaults = RunnerConfig::default();
        RunnerConfig {
            default_concurrency: self
                .default_concurrency
                .unwrap_or(defaults.default_concurrency),
            funnel_capacity: self.funnel_capacity.or(defaults.funnel_capacity),
        }
    }
}

/// Load merged runner settings (user overrides system).
pub fn load_runner_settings_from_paths(system: &Path, user: &Path) -> RunnerSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> RunnerSettings {
    if !path.exists() {
        return RunnerSettings::default();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read runner settings file; ignoring"
            );
            return RunnerSettings::default();
        }
    };
    match RunnerSettings::from_yaml_str(&raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to parse runner settings yaml; ignoring file"
            );
            RunnerSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_default_concurrency_is_rejected() {
        let error = RunnerConfig::new(0)
            .validate()
            .expect_err("zero cap must be rejected");
        assert!(matches!(error, RunnerError::InvalidConcurrency(_)));
    }

    #[test]
    fn zero_funnel_capacity_is_rejected() {
        let config = RunnerConfig {
            default_concurrency: 2,
            funnel_capacity: Some(0),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn funnel_capacity_follows_default_cap() {
        assert_eq!(RunnerConfig::new(3).funnel_capacity(), 3);
        let config = RunnerConfig {
            default_concurrency: 3,
            funnel_capacity: Some(64),
        };
        assert_eq!(config.funnel_capacity(), 64);
    }

    #[test]
    fn settings_fill_gaps_from_defaults() {
        let config = RunnerSettings {
            default_concurrency: None,
            funnel_capacity: Some(16),
        }
        .into_config();
        assert_eq!(config.default_concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.funnel_capacity, Some(16));
    }

    #[test]
    fn strict_parse_reports_invalid_yaml() {
        let error = RunnerSettings::from_yaml_str("default_concurrency: [nope")
            .expect_err("invalid yaml should fail");
        assert!(matches!(error, RunnerError::Settings(_)));
    }
}
