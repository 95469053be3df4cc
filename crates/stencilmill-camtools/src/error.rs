//! Error types for the CAM tools crate.
//!
//! This module provides structured error types for rasterization, packing
//! search, toolpath generation and debug image output.

use std::io;
use thiserror::Error;

/// Errors that can occur during CAM tool operations.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// A configuration, input or invariant error from the core taxonomy.
    #[error(transparent)]
    Core(#[from] stencilmill_core::Error),

    /// G-code generation failed.
    #[error("G-code generation failed: {0}")]
    GenerationFailed(String),

    /// Image decoding or encoding failed.
    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl CamToolError {
    /// Shorthand for an invariant failure inside the search
    pub fn invariant(reason: impl Into<String>) -> Self {
        CamToolError::Core(stencilmill_core::Error::invariant(reason))
    }

    /// Shorthand for a rejected parameter
    pub fn invalid_config(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        CamToolError::Core(stencilmill_core::Error::invalid_config(parameter, reason))
    }
}

/// Result type alias for CAM tool operations.
pub type CamToolResult<T> = Result<T, CamToolError>;
