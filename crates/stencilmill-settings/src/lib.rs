//! StencilMill Settings Crate
//!
//! Handles layered configuration (file plus command-line flags), validation,
//! and persistence of the mill configuration.

pub mod config;
pub mod error;

pub use config::{ConfigLayer, MaskSettings, MillConfig, SearchSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
