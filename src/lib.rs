//! # StencilMill
//!
//! Converts a solder-paste (or any binary) raster mask into fixed-diameter
//! plunge positions and G-code:
//! - Supersampled binarization against a black or white background
//! - 4-connected component decomposition
//! - Square/triangular lattice offset search per component
//! - Plunge-milling toolpath and debug image output
//!
//! ## Architecture
//!
//! StencilMill is organized as a workspace with multiple crates:
//!
//! 1. **stencilmill-core** - Geometry types, mask settings, error taxonomy
//! 2. **stencilmill-camtools** - Grid, components, lattice search, toolpath, debug images
//! 3. **stencilmill-settings** - Layered configuration and validation
//! 4. **stencilmill** - Command-line driver that wires the crates together

pub mod cli;
pub mod job;

pub use cli::Cli;
pub use job::{planner_parameters, run_job, JobReport, MillJob};

pub use stencilmill_camtools::{MillPlan, MillPlanner, PlannerParameters, ToolpathEmitter};
pub use stencilmill_core::{BackgroundColor, CirclePlacement, MillProfile, PackingStrategy, Point};
pub use stencilmill_settings::{ConfigLayer, MillConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, so G-code or reports on stdout stay clean
/// - RUST_LOG environment variable support (default level INFO)
/// - Optional JSON lines instead of the human-readable format
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.as_str()));

    if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_names(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
