use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::analysis::classifier::DEFAULT_ACTIVE_THRESHOLD;
use crate::analysis::discovery::{DEFAULT_EXCLUSION_HZ, DEFAULT_STEP_HZ};
use crate::color;
use crate::data::loader::ParsePolicy;
use crate::data::model::ColorToken;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Colors used for markers the caller did not choose
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    /// Known frequency that is not currently occupied.
    pub inactive: ColorToken,
    /// Carrier found by discovery.
    pub discovered: ColorToken,
    /// Known-list color that marks an entry as a sentinel.
    pub sentinel: ColorToken,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            inactive: ColorToken::from("#FFFFFF"),
            discovered: ColorToken::from("#FF00FF"),
            sentinel: ColorToken::from("#FF0000"),
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// Every tunable of one annotation run.  Missing JSON fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Static signal/noise threshold (dB).  Columns it cannot split fall
    /// back to their own mean.
    pub level: f64,
    /// Minimum jump between consecutive samples counted as a transition.
    pub delta: f64,
    pub active_threshold: f64,
    pub step_hz: i64,
    pub exclusion_hz: i64,
    /// Total slots shared by active known frequencies and discoveries.
    pub target_count: usize,
    pub parse_policy: ParsePolicy,
    pub colors: ColorScheme,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            level: 0.0,
            delta: 5.0,
            active_threshold: DEFAULT_ACTIVE_THRESHOLD,
            step_hz: DEFAULT_STEP_HZ,
            exclusion_hz: DEFAULT_EXCLUSION_HZ,
            target_count: 10,
            parse_policy: ParsePolicy::Lenient,
            colors: ColorScheme::default(),
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config file and validate it.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("in config {}", path.display()))?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(text).context("parsing config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("level", self.level),
            ("delta", self.delta),
            ("active_threshold", self.active_threshold),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!("{name} must be finite, got {value}")));
            }
        }
        if self.delta < 0.0 {
            return Err(Error::InvalidConfig(format!("delta must not be negative, got {}", self.delta)));
        }
        if self.step_hz <= 0 {
            return Err(Error::InvalidConfig(format!("step_hz must be positive, got {}", self.step_hz)));
        }
        if self.exclusion_hz < 0 {
            return Err(Error::InvalidConfig(format!(
                "exclusion_hz must not be negative, got {}",
                self.exclusion_hz
            )));
        }
        for token in [&self.colors.inactive, &self.colors.discovered] {
            if color::parse(token).is_none() {
                return Err(Error::InvalidConfig(format!("'{token}' is not a #RRGGBB color")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = AnalysisConfig::default();
        assert_eq!(c.active_threshold, 10.0);
        assert_eq!(c.step_hz, 5000);
        assert_eq!(c.exclusion_hz, 10_000);
        assert_eq!(c.parse_policy, ParsePolicy::Lenient);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let c = AnalysisConfig::from_json(
            r##"{ "level": -60, "target_count": 3, "parse_policy": "strict",
                 "colors": { "discovered": "#00FFFF" } }"##,
        )
        .unwrap();
        assert_eq!(c.level, -60.0);
        assert_eq!(c.target_count, 3);
        assert_eq!(c.parse_policy, ParsePolicy::Strict);
        assert_eq!(c.colors.discovered, ColorToken::from("#00FFFF"));
        assert_eq!(c.colors.inactive, ColorToken::from("#FFFFFF"));
        assert_eq!(c.step_hz, 5000);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AnalysisConfig::from_json(r#"{ "step_hz": 0 }"#).is_err());
        assert!(AnalysisConfig::from_json(r#"{ "exclusion_hz": -1 }"#).is_err());
        assert!(AnalysisConfig::from_json(r#"{ "delta": -2.0 }"#).is_err());
        assert!(AnalysisConfig::from_json(r#"{ "colors": { "inactive": "white" } }"#).is_err());
    }
}
