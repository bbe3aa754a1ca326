//! Configuration for a branding run.

use std::fmt::{self, Display};
use std::str::FromStr;

use indexmap::IndexMap;

use crate::ConfigError;

/// Whether a plain `string` stays assignable to the generated identifier types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BrandMode {
    /// Optional brand field: any string is still assignable. Backward compatible.
    #[default]
    Lenient,
    /// Mandatory brand field: values must be cast or constructed explicitly.
    Strict,
}

impl FromStr for BrandMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" | "flavor" | "false" => Ok(BrandMode::Lenient),
            "strict" | "brand" | "true" => Ok(BrandMode::Strict),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

impl Display for BrandMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrandMode::Lenient => f.write_str("lenient"),
            BrandMode::Strict => f.write_str("strict"),
        }
    }
}

/// Which generated declarations the model's own identifier is retyped in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Coverage {
    /// Payload, where and where-unique declarations.
    Standard,
    /// Standard plus create/update inputs, their relation-exclusion variants
    /// and scalar-where filters.
    #[default]
    Extended,
}

impl FromStr for Coverage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Coverage::Standard),
            "extended" => Ok(Coverage::Extended),
            _ => Err(ConfigError::InvalidCoverage(s.to_string())),
        }
    }
}

impl Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coverage::Standard => f.write_str("standard"),
            Coverage::Extended => f.write_str("extended"),
        }
    }
}

/// Configuration for one run, resolved once and passed to the engine.
///
/// ```ignore
/// let config = BrandConfig::builder()
///     .mode(BrandMode::Strict)
///     .build();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, bon::Builder)]
pub struct BrandConfig {
    #[builder(default)]
    pub mode: BrandMode,

    #[builder(default)]
    pub coverage: Coverage,
}

impl BrandConfig {
    /// Generator option selecting the brand mode.
    pub const MODE_KEY: &str = "mode";
    /// Boolean alias of [`Self::MODE_KEY`], consulted when `mode` is absent.
    pub const STRICT_KEY: &str = "strict";
    pub const COVERAGE_KEY: &str = "coverage";

    /// Resolve the configuration from the generator block's string options.
    pub fn from_generator_config(options: &IndexMap<String, String>) -> Result<Self, ConfigError> {
        let mode = match options
            .get(Self::MODE_KEY)
            .or_else(|| options.get(Self::STRICT_KEY))
        {
            Some(value) => value.parse()?,
            None => BrandMode::default(),
        };
        let coverage = match options.get(Self::COVERAGE_KEY) {
            Some(value) => value.parse()?,
            None => Coverage::default(),
        };
        Ok(Self { mode, coverage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = BrandConfig::from_generator_config(&IndexMap::new()).unwrap();
        assert_eq!(config.mode, BrandMode::Lenient);
        assert_eq!(config.coverage, Coverage::Extended);
        assert_eq!(config, BrandConfig::builder().build());
    }

    #[test]
    fn test_mode_values() {
        assert_eq!("strict".parse::<BrandMode>().unwrap(), BrandMode::Strict);
        assert_eq!(" Brand ".parse::<BrandMode>().unwrap(), BrandMode::Strict);
        assert_eq!("FALSE".parse::<BrandMode>().unwrap(), BrandMode::Lenient);
        assert_eq!(
            "nominal".parse::<BrandMode>(),
            Err(ConfigError::InvalidMode("nominal".to_string()))
        );
    }

    #[test]
    fn test_strict_alias() {
        let config = BrandConfig::from_generator_config(&options(&[("strict", "true")])).unwrap();
        assert_eq!(config.mode, BrandMode::Strict);
    }

    #[test]
    fn test_mode_key_wins_over_alias() {
        let config = BrandConfig::from_generator_config(&options(&[
            ("strict", "true"),
            ("mode", "lenient"),
        ]))
        .unwrap();
        assert_eq!(config.mode, BrandMode::Lenient);
    }

    #[test]
    fn test_invalid_coverage() {
        let err = BrandConfig::from_generator_config(&options(&[("coverage", "all")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidCoverage("all".to_string()));
    }
}
