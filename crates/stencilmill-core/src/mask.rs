//! Mask interpretation settings
//!
//! Selects which color counts as background in the source image and how the
//! foreground is divided before packing.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Background color of the source mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundColor {
    /// Pure black (0, 0, 0)
    Black,
    /// Pure white (255, 255, 255)
    White,
}

impl BackgroundColor {
    /// RGB channel values the background must match exactly
    pub fn rgb(&self) -> [u8; 3] {
        match self {
            Self::Black => [0, 0, 0],
            Self::White => [255, 255, 255],
        }
    }
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => write!(f, "black"),
            Self::White => write!(f, "white"),
        }
    }
}

impl FromStr for BackgroundColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "black" => Ok(Self::Black),
            "white" => Ok(Self::White),
            other => Err(Error::invalid_config(
                "background",
                format!("unknown color '{}', expected black or white", other),
            )),
        }
    }
}

/// How the foreground is split before the lattice search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackingStrategy {
    /// Search each 4-connected component independently
    #[default]
    PerComponent,
    /// Search the whole foreground as one region
    WholeImage,
}

impl PackingStrategy {
    /// Offset steps per axis used when none is configured
    pub fn default_shift_steps(&self) -> u32 {
        match self {
            Self::PerComponent => 32,
            Self::WholeImage => 4,
        }
    }
}

impl fmt::Display for PackingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerComponent => write!(f, "per_component"),
            Self::WholeImage => write!(f, "whole_image"),
        }
    }
}

impl FromStr for PackingStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "per_component" | "components" => Ok(Self::PerComponent),
            "whole_image" | "whole" => Ok(Self::WholeImage),
            other => Err(Error::invalid_config(
                "strategy",
                format!("unknown packing strategy '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_parse() {
        assert_eq!("black".parse::<BackgroundColor>(), Ok(BackgroundColor::Black));
        assert_eq!(" White ".parse::<BackgroundColor>(), Ok(BackgroundColor::White));

        let err = "green".parse::<BackgroundColor>().unwrap_err();
        assert_eq!(err.parameter(), Some("background"));
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            "whole-image".parse::<PackingStrategy>(),
            Ok(PackingStrategy::WholeImage)
        );
        assert_eq!(PackingStrategy::default(), PackingStrategy::PerComponent);
        assert_eq!(PackingStrategy::PerComponent.default_shift_steps(), 32);
        assert_eq!(PackingStrategy::WholeImage.default_shift_steps(), 4);
    }
}
