//! Connected Component Extraction
//!
//! Splits the foreground of a grid into disjoint 4-connected components with a
//! breadth-first flood fill. A component stays labeled `InComponent` while its
//! packing search runs and is relabeled `Claimed` before the next one is found.

use crate::grid::{CellLabel, Grid};
use std::collections::VecDeque;
use stencilmill_core::BoundingBox;
use tracing::trace;

/// A component discovered by the extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Discovery order, starting at 0
    pub id: usize,
    /// Inclusive cell bounds
    pub bbox: BoundingBox,
    /// Number of member cells
    pub pixel_count: usize,
}

/// Incremental flood-fill extractor over a grid
///
/// Scanning resumes where the previous component was found, so every
/// foreground cell is visited exactly once across all calls.
#[derive(Debug, Default)]
pub struct ComponentExtractor {
    cursor: usize,
    next_id: usize,
    active: Vec<usize>,
}

impl ComponentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the previous component and flood-fill the next one
    ///
    /// The returned component's cells carry `CellLabel::InComponent` until
    /// the following call (or [`ComponentExtractor::finish`]).
    pub fn extract_next(&mut self, grid: &mut Grid) -> Option<Component> {
        self.finish(grid);

        let width = grid.width();
        let height = grid.height();
        let labels = grid.labels_mut();

        let seed = (self.cursor..labels.len()).find(|&i| labels[i] == CellLabel::Foreground)?;
        self.cursor = seed + 1;

        let mut bbox = BoundingBox::at(seed % width, seed / width);
        let mut queue = VecDeque::new();
        labels[seed] = CellLabel::InComponent;
        queue.push_back(seed);
        self.active.push(seed);

        while let Some(i) = queue.pop_front() {
            let (x, y) = (i % width, i / width);
            let neighbors = [
                (x > 0).then(|| i - 1),
                (x + 1 < width).then(|| i + 1),
                (y > 0).then(|| i - width),
                (y + 1 < height).then(|| i + width),
            ];
            for j in neighbors.into_iter().flatten() {
                if labels[j] != CellLabel::Foreground {
                    continue;
                }
                labels[j] = CellLabel::InComponent;
                bbox.include(j % width, j / width);
                self.active.push(j);
                queue.push_back(j);
            }
        }

        let component = Component {
            id: self.next_id,
            bbox,
            pixel_count: self.active.len(),
        };
        self.next_id += 1;
        trace!(
            "Component {} at {} with {} cells",
            component.id,
            component.bbox,
            component.pixel_count
        );
        Some(component)
    }

    /// Relabel the active component's cells to `Claimed`
    pub fn finish(&mut self, grid: &mut Grid) {
        let labels = grid.labels_mut();
        for i in self.active.drain(..) {
            labels[i] = CellLabel::Claimed;
        }
    }
}

/// Iterator over the components of a grid, claiming each one as it advances
///
/// Suited to callers that only need bounding boxes and counts; the packing
/// search drives [`ComponentExtractor`] directly so it can see `InComponent`.
pub struct Components<'a> {
    extractor: ComponentExtractor,
    grid: &'a mut Grid,
}

impl Iterator for Components<'_> {
    type Item = Component;

    fn next(&mut self) -> Option<Component> {
        self.extractor.extract_next(self.grid)
    }
}

/// Iterate over every remaining foreground component of `grid`
pub fn components(grid: &mut Grid) -> Components<'_> {
    Components {
        extractor: ComponentExtractor::new(),
        grid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from_rows(rows: &[&str]) -> Grid {
        let width = rows[0].len();
        Grid::from_fn(width, rows.len(), 1.0, |x, y| rows[y].as_bytes()[x] == b'#')
    }

    #[test]
    fn test_four_connectivity() {
        // Diagonal neighbours are separate components
        let mut grid = grid_from_rows(&["#.", ".#"]);
        let found: Vec<Component> = components(&mut grid).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].bbox, BoundingBox::at(0, 0));
        assert_eq!(found[1].bbox, BoundingBox::at(1, 1));
    }

    #[test]
    fn test_bounding_box_and_count() {
        let mut grid = grid_from_rows(&[
            "......", //
            ".###..", //
            "...#..", //
            "..##.#", //
        ]);
        let found: Vec<Component> = components(&mut grid).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(
            found[0].bbox,
            BoundingBox {
                min_x: 1,
                min_y: 1,
                max_x: 3,
                max_y: 3
            }
        );
        assert_eq!(found[0].pixel_count, 6);
        assert_eq!(found[1].bbox, BoundingBox::at(5, 3));
        assert_eq!(found[1].id, 1);
    }

    #[test]
    fn test_active_component_is_marked_until_next_call() {
        let mut grid = grid_from_rows(&["##.#"]);
        let mut extractor = ComponentExtractor::new();

        let first = extractor.extract_next(&mut grid).unwrap();
        assert_eq!(first.pixel_count, 2);
        assert_eq!(grid.count(CellLabel::InComponent), 2);
        assert_eq!(grid.count(CellLabel::Foreground), 1);

        let second = extractor.extract_next(&mut grid).unwrap();
        assert_eq!(second.pixel_count, 1);
        assert_eq!(grid.count(CellLabel::Claimed), 2);
        assert_eq!(grid.count(CellLabel::InComponent), 1);

        assert!(extractor.extract_next(&mut grid).is_none());
        assert_eq!(grid.count(CellLabel::Claimed), 3);
        assert_eq!(grid.count(CellLabel::InComponent), 0);
    }

    #[test]
    fn test_conservation() {
        let mut grid = Grid::from_fn(40, 30, 1.0, |x, y| (x * 7 + y * 13) % 5 < 2);
        let foreground = grid.count(CellLabel::Foreground);
        let found: Vec<Component> = components(&mut grid).collect();
        let total: usize = found.iter().map(|c| c.pixel_count).sum();
        assert_eq!(total, foreground);
        assert_eq!(grid.count(CellLabel::Claimed), foreground);
        assert_eq!(grid.count(CellLabel::Foreground), 0);
    }

    #[test]
    fn test_empty_grid() {
        let mut grid = Grid::from_fn(8, 8, 1.0, |_, _| false);
        assert!(components(&mut grid).next().is_none());
    }
}
