//! Geometry primitives shared across the pipeline
//!
//! Physical coordinates are millimeters with the origin at the top-left corner
//! of the source image and Y growing downward, the same orientation as grid rows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in physical units (mm)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Axis-aligned bounding box in grid cells, both corners inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl BoundingBox {
    /// A box covering a single cell
    pub const fn at(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Grow the box to include a cell
    pub fn include(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{}]-[{},{}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Regular circle lattice used to generate candidate centers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatticeFamily {
    /// Hexagonal packing built from a checkerboard-thinned rectangular grid
    Triangular,
    /// Centers on a square grid with one diameter spacing
    Square,
}

impl LatticeFamily {
    /// Evaluation order at every offset
    pub const ALL: [LatticeFamily; 2] = [LatticeFamily::Triangular, LatticeFamily::Square];
}

impl fmt::Display for LatticeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Triangular => write!(f, "triangular"),
            Self::Square => write!(f, "square"),
        }
    }
}

/// A single tool position: center in mm plus the shared tool radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CirclePlacement {
    pub center: Point,
    pub radius: f64,
}

impl CirclePlacement {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn diameter(&self) -> f64 {
        self.radius * 2.0
    }

    /// True when two placements share interior area (tolerance in mm)
    pub fn overlaps(&self, other: &CirclePlacement, tolerance: f64) -> bool {
        self.center.distance_to(&other.center) + tolerance < self.radius + other.radius
    }
}
