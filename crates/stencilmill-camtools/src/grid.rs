//! Labeled Working Grid
//!
//! Binarizes a source mask into a supersampled grid of cell labels.
//! Each source pixel becomes an `n x n` block of cells; color is never
//! interpolated, supersampling only refines the geometry of the fit tests.

use crate::error::{CamToolError, CamToolResult};
use image::{DynamicImage, Rgba, RgbaImage};
use stencilmill_core::{ensure_positive, BackgroundColor, Error};
use tracing::debug;

/// State of a single grid cell
///
/// Foreground cells only ever move forward:
/// `Foreground -> InComponent -> Claimed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellLabel {
    /// Matches the background color, never milled
    Background,
    /// Foreground not yet assigned to a component
    Foreground,
    /// Member of the component currently being searched
    InComponent,
    /// Member of a component whose search has finished
    Claimed,
}

impl CellLabel {
    /// True for every label that started out as foreground
    pub fn is_foreground(&self) -> bool {
        !matches!(self, CellLabel::Background)
    }
}

/// Row-major grid of cell labels with its physical cell size
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cell_size: f64,
    cells: Vec<CellLabel>,
}

impl Grid {
    /// Build a grid from a predicate over cell coordinates (true = foreground)
    pub fn from_fn<F>(width: usize, height: usize, cell_size: f64, mut is_foreground: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(if is_foreground(x, y) {
                    CellLabel::Foreground
                } else {
                    CellLabel::Background
                });
            }
        }
        Self {
            width,
            height,
            cell_size,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Physical side length of one cell (mm)
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Physical width of the grid (mm)
    pub fn physical_width(&self) -> f64 {
        self.width as f64 * self.cell_size
    }

    /// Physical height of the grid (mm)
    pub fn physical_height(&self) -> f64 {
        self.height as f64 * self.cell_size
    }

    /// Flat index of a cell, `None` outside the grid
    pub fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Label at a cell, `None` outside the grid
    pub fn label(&self, x: usize, y: usize) -> Option<CellLabel> {
        self.index(x, y).map(|i| self.cells[i])
    }

    pub(crate) fn labels_mut(&mut self) -> &mut [CellLabel] {
        &mut self.cells
    }

    /// Number of cells carrying a label
    pub fn count(&self, label: CellLabel) -> usize {
        self.cells.iter().filter(|&&c| c == label).count()
    }
}

/// Turns a decoded image into a labeled grid
#[derive(Debug, Clone)]
pub struct Rasterizer {
    background: BackgroundColor,
    supersample: u32,
    pixel_size: f64,
}

impl Rasterizer {
    /// Create a rasterizer; `pixel_size` is the physical side of one source pixel (mm)
    pub fn new(
        background: BackgroundColor,
        supersample: u32,
        pixel_size: f64,
    ) -> CamToolResult<Self> {
        if supersample == 0 {
            return Err(CamToolError::invalid_config(
                "n",
                "supersampling factor must be at least 1",
            ));
        }
        ensure_positive("px_size", pixel_size)?;
        Ok(Self {
            background,
            supersample,
            pixel_size,
        })
    }

    /// Binarize a decoded image
    pub fn rasterize(&self, image: &DynamicImage) -> CamToolResult<Grid> {
        self.rasterize_rgba(&image.to_rgba8())
    }

    /// Binarize an RGBA buffer
    pub fn rasterize_rgba(&self, image: &RgbaImage) -> CamToolResult<Grid> {
        let (src_w, src_h) = image.dimensions();
        if src_w == 0 || src_h == 0 {
            return Err(Error::malformed(format!(
                "source image has zero size ({}x{})",
                src_w, src_h
            ))
            .into());
        }

        let n = self.supersample as usize;
        let background = self.background.rgb();
        let grid = Grid::from_fn(
            src_w as usize * n,
            src_h as usize * n,
            self.pixel_size / n as f64,
            |x, y| {
                let px = image.get_pixel((x / n) as u32, (y / n) as u32);
                !matches_background(px, background)
            },
        );

        debug!(
            "Rasterized {}x{} image into {}x{} grid ({} foreground cells)",
            src_w,
            src_h,
            grid.width(),
            grid.height(),
            grid.count(CellLabel::Foreground)
        );
        Ok(grid)
    }
}

/// Exact channel equality after alpha premultiplication
///
/// Fully transparent pixels compare as black.
fn matches_background(px: &Rgba<u8>, background: [u8; 3]) -> bool {
    let alpha = px.0[3] as u32;
    px.0[..3]
        .iter()
        .zip(background.iter())
        .all(|(&c, &b)| c as u32 * alpha == b as u32 * 255)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker_image() -> RgbaImage {
        RgbaImage::from_fn(2, 2, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn test_supersampled_dimensions() {
        let rasterizer = Rasterizer::new(BackgroundColor::White, 3, 0.3).unwrap();
        let grid = rasterizer.rasterize_rgba(&checker_image()).unwrap();
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.height(), 6);
        assert!((grid.cell_size() - 0.1).abs() < 1e-12);

        // Each source pixel maps to a 3x3 block, no blending at the edges
        assert_eq!(grid.label(2, 2), Some(CellLabel::Background));
        assert_eq!(grid.label(3, 2), Some(CellLabel::Foreground));
        assert_eq!(grid.label(3, 3), Some(CellLabel::Background));
        assert_eq!(grid.count(CellLabel::Foreground), 18);
    }

    #[test]
    fn test_black_background() {
        let rasterizer = Rasterizer::new(BackgroundColor::Black, 1, 1.0).unwrap();
        let grid = rasterizer.rasterize_rgba(&checker_image()).unwrap();
        assert_eq!(grid.label(0, 0), Some(CellLabel::Foreground));
        assert_eq!(grid.label(1, 0), Some(CellLabel::Background));
    }

    #[test]
    fn test_exact_match_only() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([254, 255, 255, 255]));
        let rasterizer = Rasterizer::new(BackgroundColor::White, 1, 1.0).unwrap();
        let grid = rasterizer.rasterize_rgba(&img).unwrap();
        assert_eq!(grid.label(0, 0), Some(CellLabel::Foreground));
    }

    #[test]
    fn test_transparent_reads_as_black() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 0]));
        let rasterizer = Rasterizer::new(BackgroundColor::Black, 1, 1.0).unwrap();
        let grid = rasterizer.rasterize_rgba(&img).unwrap();
        assert_eq!(grid.label(0, 0), Some(CellLabel::Background));
    }

    #[test]
    fn test_invalid_configuration() {
        let err = Rasterizer::new(BackgroundColor::White, 0, 1.0).unwrap_err();
        assert!(err.to_string().contains("'n'"));

        let err = Rasterizer::new(BackgroundColor::White, 1, 0.0).unwrap_err();
        assert!(err.to_string().contains("'px_size'"));
    }

    #[test]
    fn test_zero_sized_image() {
        let rasterizer = Rasterizer::new(BackgroundColor::White, 2, 1.0).unwrap();
        let err = rasterizer.rasterize_rgba(&RgbaImage::new(0, 4)).unwrap_err();
        assert!(err.to_string().contains("Malformed input"));
    }

    #[test]
    fn test_out_of_bounds_label() {
        let grid = Grid::from_fn(2, 2, 1.0, |_, _| true);
        assert_eq!(grid.label(2, 0), None);
        assert_eq!(grid.index(1, 1), Some(3));
    }
}
