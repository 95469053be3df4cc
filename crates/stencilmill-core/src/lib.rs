//! # StencilMill Core
//!
//! Core types and utilities for StencilMill.
//! Provides the geometry primitives, mask settings and error taxonomy
//! shared by the packing engine, the settings layer and the command-line driver.

pub mod error;
pub mod geometry;
pub mod mask;
pub mod profile;

pub use error::{ensure_positive, Error, Result};
pub use geometry::{BoundingBox, CirclePlacement, LatticeFamily, Point};
pub use mask::{BackgroundColor, PackingStrategy};
pub use profile::MillProfile;
