//! # StencilMill CAM Tools
//!
//! This crate turns a binary raster mask into fixed-diameter tool positions
//! and plunge-milling G-Code.
//!
//! ## Pipeline
//!
//! - **Grid**: Supersampled binarization of the source image against a background color
//! - **Components**: 4-connected flood-fill decomposition of the foreground
//! - **Lattice**: Square and triangular candidate centers under an offset
//! - **Fit**: Sub-pixel test that a circle covers only cells of one label
//! - **Packing**: Offset/lattice search keeping the trial with the most circles
//! - **Planner**: Drives the stages and concatenates per-component results
//!
//! ## Output
//!
//! - **Toolpath**: Travel, plunge and retract moves per placement
//! - **Debug Render**: Mask and circle overlay images

pub mod components;
pub mod debug_render;
pub mod error;
pub mod fit;
pub mod grid;
pub mod lattice;
pub mod packing;
pub mod planner;
pub mod toolpath;

// Re-export commonly used items
pub use components::{components, Component, ComponentExtractor, Components};
pub use debug_render::{render_mask, render_overlay, save_debug_images};
pub use error::{CamToolError, CamToolResult};
pub use fit::fits;
pub use grid::{CellLabel, Grid, Rasterizer};
pub use lattice::{Lattice, LatticePoint, SearchWindow};
pub use packing::{PackingSearch, SearchParameters, SearchResult, Trial};
pub use planner::{aggregate, MillPlan, MillPlanner, PlannerParameters, RegionPlan};
pub use toolpath::ToolpathEmitter;
