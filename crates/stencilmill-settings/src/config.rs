//! Configuration management for StencilMill
//!
//! Configuration comes in layers: an optional JSON or TOML file and the
//! command-line flags on top of it. Each layer is a [`ConfigLayer`] where every
//! key is optional; [`MillConfig::resolve`] merges the final layer into an
//! immutable, validated configuration that is passed explicitly to the pipeline.
//!
//! Keys use the flag names of the command-line tool (`px_size`, `n`, ...).

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use stencilmill_core::{ensure_positive, BackgroundColor, Error, MillProfile, PackingStrategy};
use tracing::debug;

/// One layer of possibly incomplete settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    /// Size of a source pixel side (mm)
    pub px_size: Option<f64>,
    /// Tool diameter (mm)
    pub tool_diameter: Option<f64>,
    /// Linear subpixels per source pixel
    pub n: Option<u32>,
    /// Background color
    pub background: Option<BackgroundColor>,
    /// Offset steps per axis in the lattice search
    pub shift_steps: Option<u32>,
    /// Region decomposition strategy
    pub strategy: Option<PackingStrategy>,
    /// Evaluate search trials in parallel
    pub parallel: Option<bool>,
    /// Mill depth (mm)
    pub mill_depth: Option<f64>,
    /// Safe travel height (mm)
    pub safe_height: Option<f64>,
    /// Plunge feed rate (mm/min)
    pub mill_rate: Option<f64>,
    /// Travel feed rate (mm/min)
    pub travel_rate: Option<f64>,
    /// Mirror Y into machine orientation
    pub flip_y: Option<bool>,
}

impl ConfigLayer {
    /// Load a layer from a `.json` or `.toml` file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let layer: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(ConfigError::UnsupportedFormat(
                    "Config file must be .json or .toml".to_string(),
                )
                .into())
            }
        };
        debug!("Loaded configuration layer from {}", path.display());
        Ok(layer)
    }

    /// Values set in `over` win over values set here
    pub fn merge(self, over: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            px_size: over.px_size.or(self.px_size),
            tool_diameter: over.tool_diameter.or(self.tool_diameter),
            n: over.n.or(self.n),
            background: over.background.or(self.background),
            shift_steps: over.shift_steps.or(self.shift_steps),
            strategy: over.strategy.or(self.strategy),
            parallel: over.parallel.or(self.parallel),
            mill_depth: over.mill_depth.or(self.mill_depth),
            safe_height: over.safe_height.or(self.safe_height),
            mill_rate: over.mill_rate.or(self.mill_rate),
            travel_rate: over.travel_rate.or(self.travel_rate),
            flip_y: over.flip_y.or(self.flip_y),
        }
    }
}

/// How the source image is binarized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskSettings {
    /// Size of a source pixel side (mm)
    pub pixel_size: f64,
    /// Linear subpixels per source pixel
    pub supersample: u32,
    /// Background color
    pub background: BackgroundColor,
}

/// Lattice search settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Offset steps per axis
    pub shift_steps: u32,
    /// Region decomposition strategy
    pub strategy: PackingStrategy,
    /// Evaluate search trials in parallel
    pub parallel: bool,
}

/// Complete, validated configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MillConfig {
    /// Mask interpretation
    pub mask: MaskSettings,
    /// Tool diameter (mm)
    pub tool_diameter: f64,
    /// Lattice search
    pub search: SearchSettings,
    /// Plunge motion profile
    pub profile: MillProfile,
    /// Mirror Y into machine orientation
    pub flip_y: bool,
}

impl MillConfig {
    /// Resolve a merged layer, reporting every missing key at once
    pub fn resolve(layer: ConfigLayer) -> SettingsResult<Self> {
        let mut missing = Vec::new();
        fn require<T: Copy>(value: Option<T>, key: &str, missing: &mut Vec<String>) -> Option<T> {
            if value.is_none() {
                missing.push(key.to_string());
            }
            value
        }

        let pixel_size = require(layer.px_size, "px_size", &mut missing);
        let tool_diameter = require(layer.tool_diameter, "tool_diameter", &mut missing);
        let background = require(layer.background, "background", &mut missing);
        let mill_depth = require(layer.mill_depth, "mill_depth", &mut missing);
        let safe_height = require(layer.safe_height, "safe_height", &mut missing);
        let mill_rate = require(layer.mill_rate, "mill_rate", &mut missing);
        let travel_rate = require(layer.travel_rate, "travel_rate", &mut missing);

        let (
            Some(pixel_size),
            Some(tool_diameter),
            Some(background),
            Some(mill_depth),
            Some(safe_height),
            Some(mill_rate),
            Some(travel_rate),
        ) = (
            pixel_size,
            tool_diameter,
            background,
            mill_depth,
            safe_height,
            mill_rate,
            travel_rate,
        )
        else {
            return Err(ConfigError::MissingKeys(missing).into());
        };

        let strategy = layer.strategy.unwrap_or_default();
        let config = Self {
            mask: MaskSettings {
                pixel_size,
                supersample: layer.n.unwrap_or(1),
                background,
            },
            tool_diameter,
            search: SearchSettings {
                shift_steps: layer
                    .shift_steps
                    .unwrap_or_else(|| strategy.default_shift_steps()),
                strategy,
                parallel: layer.parallel.unwrap_or(true),
            },
            profile: MillProfile {
                mill_depth,
                safe_height,
                mill_rate,
                travel_rate,
            },
            flip_y: layer.flip_y.unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a complete configuration from a `.json` or `.toml` file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        Self::resolve(ConfigLayer::load_from_file(path)?)
    }

    /// Save config to file (JSON or TOML) as a flat layer
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let layer = self.to_layer();

        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(&layer)?,
            Some("toml") => toml::to_string_pretty(&layer)?,
            _ => {
                return Err(SettingsError::SaveError(
                    "Config file must be .json or .toml".to_string(),
                ))
            }
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Flatten back into a fully populated layer
    pub fn to_layer(&self) -> ConfigLayer {
        ConfigLayer {
            px_size: Some(self.mask.pixel_size),
            tool_diameter: Some(self.tool_diameter),
            n: Some(self.mask.supersample),
            background: Some(self.mask.background),
            shift_steps: Some(self.search.shift_steps),
            strategy: Some(self.search.strategy),
            parallel: Some(self.search.parallel),
            mill_depth: Some(self.profile.mill_depth),
            safe_height: Some(self.profile.safe_height),
            mill_rate: Some(self.profile.mill_rate),
            travel_rate: Some(self.profile.travel_rate),
            flip_y: Some(self.flip_y),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), Error> {
        ensure_positive("px_size", self.mask.pixel_size)?;
        ensure_positive("tool_diameter", self.tool_diameter)?;
        if self.mask.supersample == 0 {
            return Err(Error::invalid_config("n", "must be at least 1"));
        }
        if self.search.shift_steps == 0 {
            return Err(Error::invalid_config("shift_steps", "must be at least 1"));
        }
        self.profile.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_layer() -> ConfigLayer {
        ConfigLayer {
            px_size: Some(0.05),
            tool_diameter: Some(0.4),
            background: Some(BackgroundColor::Black),
            mill_depth: Some(0.1),
            safe_height: Some(2.0),
            mill_rate: Some(60.0),
            travel_rate: Some(600.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let config = MillConfig::resolve(complete_layer()).unwrap();
        assert_eq!(config.mask.supersample, 1);
        assert_eq!(config.search.shift_steps, 32);
        assert_eq!(config.search.strategy, PackingStrategy::PerComponent);
        assert!(config.search.parallel);
        assert!(!config.flip_y);
    }

    #[test]
    fn test_whole_image_default_steps() {
        let layer = ConfigLayer {
            strategy: Some(PackingStrategy::WholeImage),
            ..complete_layer()
        };
        let config = MillConfig::resolve(layer).unwrap();
        assert_eq!(config.search.shift_steps, 4);
    }

    #[test]
    fn test_missing_keys_reported_together() {
        let layer = ConfigLayer {
            px_size: None,
            mill_rate: None,
            ..complete_layer()
        };
        match MillConfig::resolve(layer) {
            Err(SettingsError::Config(ConfigError::MissingKeys(keys))) => {
                assert_eq!(keys, vec!["px_size".to_string(), "mill_rate".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_value_names_parameter() {
        let layer = ConfigLayer {
            tool_diameter: Some(-0.4),
            ..complete_layer()
        };
        let err = MillConfig::resolve(layer).unwrap_err();
        assert!(err.to_string().contains("'tool_diameter'"));

        let layer = ConfigLayer {
            n: Some(0),
            ..complete_layer()
        };
        let err = MillConfig::resolve(layer).unwrap_err();
        assert!(err.to_string().contains("'n'"));
    }

    #[test]
    fn test_merge_precedence() {
        let file = complete_layer();
        let flags = ConfigLayer {
            tool_diameter: Some(0.6),
            n: Some(4),
            ..Default::default()
        };
        let merged = file.merge(flags);
        assert_eq!(merged.tool_diameter, Some(0.6));
        assert_eq!(merged.n, Some(4));
        assert_eq!(merged.px_size, Some(0.05));
    }
}
