//! Circle Fit Checking
//!
//! Decides whether a tool circle, sampled at grid resolution, lies inside the
//! image and touches only cells of one label. This is the hot loop of the
//! packing search: its cost grows with the circle area in cells.

use crate::error::{CamToolError, CamToolResult};
use crate::grid::{CellLabel, Grid};
use stencilmill_core::Point;

/// True when every cell whose center lies within `radius` of `center` carries `label`
///
/// Circles whose bounding square crosses the image edge are rejected outright.
/// An out-of-grid access after that check means the bounds math is broken and
/// is reported as an invariant violation.
pub fn fits(grid: &Grid, label: CellLabel, center: Point, radius: f64) -> CamToolResult<bool> {
    let width = grid.physical_width();
    let height = grid.physical_height();
    if center.x < radius
        || center.x > width - radius
        || center.y < radius
        || center.y > height - radius
    {
        return Ok(false);
    }

    let cell = grid.cell_size();
    // The cell under the center is always sampled, even for sub-cell tools
    let home = ((center.x / cell) as usize, (center.y / cell) as usize);
    if cell_label(grid, center, radius, home)? != label {
        return Ok(false);
    }

    // Cells whose centers fall inside the bounding square
    let x0 = ((center.x - radius) / cell - 0.5).ceil().max(0.0) as usize;
    let y0 = ((center.y - radius) / cell - 0.5).ceil().max(0.0) as usize;
    let x1 = ((center.x + radius) / cell - 0.5).floor();
    let y1 = ((center.y + radius) / cell - 0.5).floor();
    if x1 < 0.0 || y1 < 0.0 {
        // Only the home cell lies under the circle
        return Ok(true);
    }
    let (x1, y1) = (x1 as usize, y1 as usize);

    let r2 = radius * radius;
    for cy in y0..=y1 {
        let dy = (cy as f64 + 0.5) * cell - center.y;
        for cx in x0..=x1 {
            let dx = (cx as f64 + 0.5) * cell - center.x;
            if dx * dx + dy * dy > r2 {
                continue;
            }
            if cell_label(grid, center, radius, (cx, cy))? != label {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn cell_label(
    grid: &Grid,
    center: Point,
    radius: f64,
    (cx, cy): (usize, usize),
) -> CamToolResult<CellLabel> {
    grid.label(cx, cy).ok_or_else(|| {
        CamToolError::invariant(format!(
            "fit test for circle at {} r={} reached cell ({}, {}) outside {}x{} grid",
            center,
            radius,
            cx,
            cy,
            grid.width(),
            grid.height()
        ))
    })
}
