//! Config loading, validation, and credential resolution.

use super::model::Config;
use super::types::ScoreWeights;
use crate::error::{Result, TackError};
use std::collections::BTreeSet;
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            TackError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| TackError::Config(format!("failed to parse config YAML: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| TackError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values.
    ///
    /// - weights must be finite, non-negative, and not all zero
    /// - `timeline_scale_days` and `reasoning.timeout_ms` must be positive
    /// - `safety_keywords` must be non-empty and contain no blank entries
    /// - agent ids must be non-empty and unique
    pub fn validate(&self) -> Result<()> {
        validate_weights("scoring.enriched", &self.scoring.enriched)?;
        validate_weights("scoring.fallback", &self.scoring.fallback)?;

        let k = self.scoring.timeline_scale_days;
        if !k.is_finite() || k <= 0.0 {
            return Err(TackError::Config(format!(
                "scoring.timeline_scale_days must be a positive number (found {})",
                k
            )));
        }

        if self.reasoning.timeout_ms == 0 {
            return Err(TackError::Config(
                "reasoning.timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.safety_keywords.is_empty() {
            return Err(TackError::Config(
                "safety_keywords must list at least one keyword".to_string(),
            ));
        }
        if self.safety_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(TackError::Config(
                "safety_keywords entries must be non-empty".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for agent in &self.agents {
            if agent.id.trim().is_empty() {
                return Err(TackError::Config("agent ids must be non-empty".to_string()));
            }
            if !seen.insert(agent.id.as_str()) {
                return Err(TackError::Config(format!(
                    "agent '{}' is declared more than once",
                    agent.id
                )));
            }
        }

        Ok(())
    }

    /// Resolve the reasoning-service API key from the environment.
    ///
    /// Returns `Ok(None)` when the reasoning service is disabled. When it is
    /// enabled, a missing endpoint or credential is a configuration error,
    /// reported once at startup rather than per request.
    pub fn reasoning_credentials(&self) -> Result<Option<String>> {
        if !self.reasoning.enabled {
            return Ok(None);
        }

        if self.reasoning.endpoint.trim().is_empty() {
            return Err(TackError::Config(
                "reasoning.enabled is true but reasoning.endpoint is empty".to_string(),
            ));
        }

        match std::env::var(&self.reasoning.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(Some(key)),
            _ => Err(TackError::Config(format!(
                "reasoning service credentials missing: set {} or disable reasoning in config.yaml",
                self.reasoning.api_key_env
            ))),
        }
    }
}

fn validate_weights(section: &str, weights: &ScoreWeights) -> Result<()> {
    for (name, value) in [
        ("dependency", weights.dependency),
        ("suitability", weights.suitability),
        ("impact", weights.impact),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(TackError::Config(format!(
                "{}.{} must be a non-negative number (found {})",
                section, name, value
            )));
        }
    }

    if weights.total() <= 0.0 {
        return Err(TackError::Config(format!(
            "{} weights must not all be zero",
            section
        )));
    }

    Ok(())
}
