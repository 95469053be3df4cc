//! Command-line surface
//!
//! Flags mirror the configuration keys; a `--config` file supplies defaults
//! that flags override.

use crate::job::MillJob;
use clap::Parser;
use std::path::PathBuf;
use stencilmill_core::{BackgroundColor, PackingStrategy};
use stencilmill_settings::{ConfigError, ConfigLayer, MillConfig, SettingsError};

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "stencilmill")]
#[command(about = "Pack fixed-diameter plunge positions into a raster mask and emit G-code")]
#[command(version)]
pub struct Cli {
    /// Input image with the mask (PNG or any format the image crate decodes)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Output G-code file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Configuration file (.json or .toml) with defaults for every flag below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Size of a pixel side (mm)
    #[arg(long = "px-size", alias = "px_size")]
    pub px_size: Option<f64>,

    /// Tool diameter (mm)
    #[arg(long = "tool-diameter", alias = "tool_diameter")]
    pub tool_diameter: Option<f64>,

    /// Number of linear subpixels for each pixel in the placement search
    #[arg(short = 'n', long = "n")]
    pub n: Option<u32>,

    /// Background color: black or white
    #[arg(long, value_parser = parse_background)]
    pub background: Option<BackgroundColor>,

    /// Offset steps per axis in the lattice search
    #[arg(long = "shift-steps")]
    pub shift_steps: Option<u32>,

    /// Region strategy: per_component or whole_image
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<PackingStrategy>,

    /// Evaluate search trials on the rayon pool (`--parallel false` to disable)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub parallel: Option<bool>,

    /// Evaluate search trials on a single thread, same as `--parallel false`
    #[arg(long, conflicts_with = "parallel")]
    pub serial: bool,

    /// Mirror Y so image rows map to machine Y growing upward
    #[arg(long = "flip-y", num_args = 0..=1, default_missing_value = "true")]
    pub flip_y: Option<bool>,

    /// Mill depth (mm)
    #[arg(long = "mill-depth", alias = "mill_depth")]
    pub mill_depth: Option<f64>,

    /// Safe height to move between mill points (mm)
    #[arg(long = "safe-height", alias = "safe_height")]
    pub safe_height: Option<f64>,

    /// Mill rate (mm/min)
    #[arg(long = "mill-rate", alias = "mill_rate")]
    pub mill_rate: Option<f64>,

    /// Travel rate (mm/min)
    #[arg(long = "travel-rate", alias = "travel_rate")]
    pub travel_rate: Option<f64>,

    /// Directory for base.debug.png and out.debug.png
    #[arg(long = "debug-dir")]
    pub debug_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long = "log-json")]
    pub log_json: bool,
}

fn parse_background(s: &str) -> Result<BackgroundColor, String> {
    s.parse().map_err(|e: stencilmill_core::Error| e.to_string())
}

fn parse_strategy(s: &str) -> Result<PackingStrategy, String> {
    s.parse().map_err(|e: stencilmill_core::Error| e.to_string())
}

/// Flag spelling of a configuration key
fn flag_name(key: &str) -> String {
    match key {
        "n" => "-n".to_string(),
        other => format!("--{}", other.replace('_', "-")),
    }
}

impl Cli {
    /// Configuration layer made of the flags that were given
    pub fn flag_layer(&self) -> ConfigLayer {
        ConfigLayer {
            px_size: self.px_size,
            tool_diameter: self.tool_diameter,
            n: self.n,
            background: self.background,
            shift_steps: self.shift_steps,
            strategy: self.strategy,
            parallel: if self.serial { Some(false) } else { self.parallel },
            mill_depth: self.mill_depth,
            safe_height: self.safe_height,
            mill_rate: self.mill_rate,
            travel_rate: self.travel_rate,
            flip_y: self.flip_y,
        }
    }

    /// Merge the config file and flags into a job, listing every missing flag at once
    pub fn into_job(self) -> anyhow::Result<MillJob> {
        let base = match &self.config {
            Some(path) => ConfigLayer::load_from_file(path)?,
            None => ConfigLayer::default(),
        };
        let layer = base.merge(self.flag_layer());

        let mut missing = Vec::new();
        if self.input.is_none() {
            missing.push("--input".to_string());
        }
        if self.output.is_none() {
            missing.push("--output".to_string());
        }

        let config = match MillConfig::resolve(layer) {
            Ok(config) => Some(config),
            Err(SettingsError::Config(ConfigError::MissingKeys(keys))) => {
                missing.extend(keys.iter().map(|k| flag_name(k)));
                None
            }
            Err(e) => return Err(e.into()),
        };

        match (self.input, self.output, config) {
            (Some(input), Some(output), Some(config)) if missing.is_empty() => Ok(MillJob {
                input,
                output,
                debug_dir: self.debug_dir,
                config,
            }),
            _ => anyhow::bail!("Some mandatory flags not set: {}.", missing.join(", ")),
        }
    }
}
