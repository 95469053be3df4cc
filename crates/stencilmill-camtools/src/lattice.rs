//! Candidate Lattice Enumeration
//!
//! Generates circle centers for a square or triangular (hexagonal) packing
//! shifted by an offset, restricted to a search window around a component.

use crate::grid::Grid;
use stencilmill_core::{BoundingBox, LatticeFamily, Point};

/// Physical region in which lattice points are generated
///
/// Points are produced while `x < limit_x` and `y < limit_y` (the image edge)
/// and kept only inside `[min_x, max_x) x [min_y, max_y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchWindow {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub limit_x: f64,
    pub limit_y: f64,
}

impl SearchWindow {
    /// Component bounds grown by one cell on each side, within the image
    pub fn around(grid: &Grid, bbox: &BoundingBox) -> Self {
        let cell = grid.cell_size();
        Self {
            min_x: (bbox.min_x as f64 - 1.0) * cell,
            min_y: (bbox.min_y as f64 - 1.0) * cell,
            max_x: (bbox.max_x as f64 + 1.0) * cell,
            max_y: (bbox.max_y as f64 + 1.0) * cell,
            limit_x: grid.physical_width(),
            limit_y: grid.physical_height(),
        }
    }

    /// The whole grid
    pub fn full(grid: &Grid) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: grid.physical_width(),
            max_y: grid.physical_height(),
            limit_x: grid.physical_width(),
            limit_y: grid.physical_height(),
        }
    }
}

/// A generated center with its lattice indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticePoint {
    pub col: usize,
    pub row: usize,
    pub center: Point,
}

/// A lattice family translated by an offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    family: LatticeFamily,
    offset: Point,
    step_x: f64,
    step_y: f64,
}

impl Lattice {
    /// Lattice whose circles of `diameter` touch but never overlap
    pub fn new(family: LatticeFamily, offset: Point, diameter: f64) -> Self {
        let (step_x, step_y) = match family {
            LatticeFamily::Square => (diameter, diameter),
            LatticeFamily::Triangular => (diameter * 3f64.sqrt() / 2.0, diameter / 2.0),
        };
        Self {
            family,
            offset,
            step_x,
            step_y,
        }
    }

    fn keeps(&self, col: usize, row: usize) -> bool {
        match self.family {
            LatticeFamily::Square => true,
            // Checkerboard thinning turns the rectangular grid hexagonal
            LatticeFamily::Triangular => (col + row) % 2 == 0,
        }
    }

    /// First index whose coordinate can reach `min`
    fn first_index(origin: f64, step: f64, min: f64) -> usize {
        if min <= origin {
            0
        } else {
            ((min - origin) / step).floor() as usize
        }
    }

    /// Centers inside `window`, columns outer and rows inner
    pub fn points(&self, window: SearchWindow) -> impl Iterator<Item = LatticePoint> + '_ {
        let col0 = Self::first_index(self.offset.x, self.step_x, window.min_x);
        let row0 = Self::first_index(self.offset.y, self.step_y, window.min_y);

        (col0..)
            .map(move |col| (col, self.offset.x + col as f64 * self.step_x))
            .take_while(move |&(_, x)| x < window.limit_x)
            .filter(move |&(_, x)| x >= window.min_x && x < window.max_x)
            .flat_map(move |(col, x)| {
                (row0..)
                    .map(move |row| (row, self.offset.y + row as f64 * self.step_y))
                    .take_while(move |&(_, y)| y < window.limit_y)
                    .filter(move |&(row, y)| {
                        y >= window.min_y && y < window.max_y && self.keeps(col, row)
                    })
                    .map(move |(row, y)| LatticePoint {
                        col,
                        row,
                        center: Point::new(x, y),
                    })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_window(size: f64) -> SearchWindow {
        SearchWindow {
            min_x: 0.0,
            min_y: 0.0,
            max_x: size,
            max_y: size,
            limit_x: size,
            limit_y: size,
        }
    }

    #[test]
    fn test_square_points() {
        let lattice = Lattice::new(LatticeFamily::Square, Point::new(0.5, 0.5), 1.0);
        let points: Vec<_> = lattice.points(open_window(3.0)).collect();
        assert_eq!(points.len(), 9);
        assert_eq!(points[0].center, Point::new(0.5, 0.5));
        // Column-major order
        assert_eq!(points[1].center, Point::new(0.5, 1.5));
        assert_eq!(points[3].center, Point::new(1.5, 0.5));
    }

    #[test]
    fn test_triangular_thinning() {
        let d = 2.0;
        let lattice = Lattice::new(LatticeFamily::Triangular, Point::default(), d);
        let points: Vec<_> = lattice.points(open_window(10.0)).collect();
        assert!(points.iter().all(|p| (p.col + p.row) % 2 == 0));

        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                assert!(a.center.distance_to(&b.center) >= d - 1e-9);
            }
        }
        // Odd columns start half a diameter down
        let first_odd = points.iter().find(|p| p.col == 1).unwrap();
        assert!((first_odd.center.y - d / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_window_restriction() {
        let grid = Grid::from_fn(20, 20, 1.0, |_, _| true);
        let bbox = BoundingBox {
            min_x: 5,
            min_y: 5,
            max_x: 8,
            max_y: 8,
        };
        let window = SearchWindow::around(&grid, &bbox);
        let lattice = Lattice::new(LatticeFamily::Square, Point::default(), 1.0);
        let points: Vec<_> = lattice.points(window).collect();

        // [4, 9) on each axis
        assert_eq!(points.len(), 25);
        assert!(points
            .iter()
            .all(|p| p.center.x >= 4.0 && p.center.x < 9.0 && p.center.y >= 4.0));
        assert_eq!(points[0].col, 4);
    }

    #[test]
    fn test_image_limit() {
        let lattice = Lattice::new(LatticeFamily::Square, Point::new(0.9, 0.0), 1.0);
        let window = SearchWindow {
            min_x: -1.0,
            min_y: -1.0,
            max_x: 10.0,
            max_y: 10.0,
            limit_x: 2.0,
            limit_y: 1.0,
        };
        let points: Vec<_> = lattice.points(window).collect();
        assert_eq!(points.len(), 2);
    }
}
