//! Debug Image Rendering
//!
//! Writes the binarized mask and an overlay of the placed circles at grid
//! resolution, for inspecting a run by eye.

use crate::error::CamToolResult;
use crate::grid::Grid;
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::Path;
use stencilmill_core::CirclePlacement;
use tracing::debug;

/// File name of the binarized mask
pub const MASK_FILE_NAME: &str = "base.debug.png";
/// File name of the circle overlay
pub const OVERLAY_FILE_NAME: &str = "out.debug.png";

const CIRCLE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Mask image: background black, every foreground label white
pub fn render_mask(grid: &Grid) -> GrayImage {
    GrayImage::from_fn(grid.width() as u32, grid.height() as u32, |x, y| {
        match grid.label(x as usize, y as usize) {
            Some(label) if label.is_foreground() => Luma([255]),
            _ => Luma([0]),
        }
    })
}

/// Mask with every placement drawn as a filled red disk
pub fn render_overlay(grid: &Grid, placements: &[CirclePlacement]) -> RgbImage {
    let mask = render_mask(grid);
    let mut out = RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let v = mask.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    });

    let cell = grid.cell_size();
    for placement in placements {
        let cx = placement.center.x / cell;
        let cy = placement.center.y / cell;
        let r = placement.radius / cell;
        let x0 = (cx - r).floor().max(0.0) as u32;
        let y0 = (cy - r).floor().max(0.0) as u32;
        let x1 = ((cx + r).ceil() as u32).min(out.width());
        let y1 = ((cy + r).ceil() as u32).min(out.height());
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    out.put_pixel(x, y, CIRCLE_COLOR);
                }
            }
        }
    }
    out
}

/// Write both debug images into `dir`
pub fn save_debug_images<P: AsRef<Path>>(
    dir: P,
    grid: &Grid,
    placements: &[CirclePlacement],
) -> CamToolResult<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    render_mask(grid).save(dir.join(MASK_FILE_NAME))?;
    render_overlay(grid, placements).save(dir.join(OVERLAY_FILE_NAME))?;
    debug!("Saved debug images to {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencilmill_core::Point;

    #[test]
    fn test_mask_colors() {
        let grid = Grid::from_fn(3, 1, 1.0, |x, _| x == 1);
        let mask = render_mask(&grid);
        assert_eq!(mask.get_pixel(0, 0).0, [0]);
        assert_eq!(mask.get_pixel(1, 0).0, [255]);
    }

    #[test]
    fn test_overlay_fills_disk() {
        let grid = Grid::from_fn(10, 10, 0.5, |_, _| true);
        let circle = CirclePlacement::new(Point::new(2.5, 2.5), 1.0);
        let overlay = render_overlay(&grid, &[circle]);

        assert_eq!(*overlay.get_pixel(5, 5), CIRCLE_COLOR);
        assert_eq!(*overlay.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*overlay.get_pixel(9, 9), Rgb([255, 255, 255]));
    }

    #[test]
    fn test_overlay_clips_at_edges() {
        let grid = Grid::from_fn(4, 4, 1.0, |_, _| false);
        let circle = CirclePlacement::new(Point::new(0.0, 0.0), 2.0);
        let overlay = render_overlay(&grid, &[circle]);
        assert_eq!(*overlay.get_pixel(0, 0), CIRCLE_COLOR);
        assert_eq!(*overlay.get_pixel(3, 3), Rgb([0, 0, 0]));
    }
}
