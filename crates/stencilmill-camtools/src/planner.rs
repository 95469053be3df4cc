//! Mill Position Planner
//!
//! Drives the whole pipeline: rasterize the mask, split it into components,
//! run the packing search on each one and concatenate the winners in
//! discovery order.

use crate::components::{Component, ComponentExtractor};
use crate::error::{CamToolError, CamToolResult};
use crate::grid::{CellLabel, Grid, Rasterizer};
use crate::lattice::SearchWindow;
use crate::packing::{PackingSearch, SearchParameters, SearchResult};
use anyhow::Context;
use image::{DynamicImage, ImageError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use stencilmill_core::{
    BackgroundColor, BoundingBox, CirclePlacement, Error, LatticeFamily, PackingStrategy, Point,
};
use tracing::{debug, info, warn};

/// Everything the planner needs, built once at the boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerParameters {
    /// Physical side of one source pixel (mm)
    pub pixel_size: f64,
    /// Tool diameter (mm)
    pub tool_diameter: f64,
    /// Cells per source pixel along each axis
    pub supersample: u32,
    /// Color treated as background
    pub background: BackgroundColor,
    /// Offset steps per axis
    pub shift_steps: u32,
    /// Component decomposition or whole-image search
    pub strategy: PackingStrategy,
    /// Run offset trials on the rayon pool
    pub parallel: bool,
}

impl Default for PlannerParameters {
    fn default() -> Self {
        Self {
            pixel_size: 0.1,
            tool_diameter: 1.0,
            supersample: 1,
            background: BackgroundColor::White,
            shift_steps: PackingStrategy::PerComponent.default_shift_steps(),
            strategy: PackingStrategy::PerComponent,
            parallel: true,
        }
    }
}

/// Summary of one searched region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPlan {
    pub bbox: BoundingBox,
    pub pixel_count: usize,
    pub family: LatticeFamily,
    pub offset: Point,
    pub circles: usize,
}

/// Output of a planning run
#[derive(Debug, Clone)]
pub struct MillPlan {
    /// Final labeled grid, for debug rendering
    pub grid: Grid,
    /// Per-region search summaries in discovery order
    pub regions: Vec<RegionPlan>,
    /// All placements, region by region
    pub placements: Vec<CirclePlacement>,
}

/// Concatenate per-region winners in discovery order
pub fn aggregate<I>(results: I) -> Vec<CirclePlacement>
where
    I: IntoIterator<Item = SearchResult>,
{
    results
        .into_iter()
        .flat_map(|result| result.placements)
        .collect()
}

/// Turns a mask image into circle placements
#[derive(Debug, Clone)]
pub struct MillPlanner {
    params: PlannerParameters,
    rasterizer: Rasterizer,
    search: PackingSearch,
}

impl MillPlanner {
    /// Validate parameters and build the pipeline stages
    pub fn new(params: PlannerParameters) -> CamToolResult<Self> {
        let rasterizer = Rasterizer::new(params.background, params.supersample, params.pixel_size)?;
        let search = PackingSearch::new(SearchParameters {
            tool_diameter: params.tool_diameter,
            shift_steps: params.shift_steps,
            parallel: params.parallel,
        })?;
        Ok(Self {
            params,
            rasterizer,
            search,
        })
    }

    /// Plan from an image file on disk
    pub fn plan_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<MillPlan> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|err| match err {
                ImageError::Decoding(_) | ImageError::Unsupported(_) => {
                    CamToolError::from(Error::malformed(err.to_string()))
                }
                other => CamToolError::from(other),
            })
            .with_context(|| format!("Failed to load image file {}", path.display()))?;
        Ok(self.plan(&img)?)
    }

    /// Plan from a decoded image
    pub fn plan(&self, image: &DynamicImage) -> CamToolResult<MillPlan> {
        let grid = self.rasterizer.rasterize(image)?;
        self.plan_grid(grid)
    }

    /// Plan from an already rasterized grid
    pub fn plan_grid(&self, mut grid: Grid) -> CamToolResult<MillPlan> {
        if self.params.tool_diameter > grid.physical_width().min(grid.physical_height()) {
            warn!(
                "Tool diameter {:.3} mm exceeds the image size {:.3} x {:.3} mm",
                self.params.tool_diameter,
                grid.physical_width(),
                grid.physical_height()
            );
        }

        let (regions, results) = match self.params.strategy {
            PackingStrategy::PerComponent => self.search_components(&mut grid)?,
            PackingStrategy::WholeImage => self.search_whole(&grid)?,
        };
        let placements = aggregate(results);

        info!(
            "Placed {} circles of {:.3} mm across {} regions",
            placements.len(),
            self.params.tool_diameter,
            regions.len()
        );
        Ok(MillPlan {
            grid,
            regions,
            placements,
        })
    }

    fn search_components(
        &self,
        grid: &mut Grid,
    ) -> CamToolResult<(Vec<RegionPlan>, Vec<SearchResult>)> {
        let mut extractor = ComponentExtractor::new();
        let mut regions = Vec::new();
        let mut results = Vec::new();

        while let Some(component) = extractor.extract_next(grid) {
            let window = SearchWindow::around(grid, &component.bbox);
            let result = self.search.search(grid, CellLabel::InComponent, window)?;
            debug!(
                "Component {} at {} ({} cells): {} circles",
                component.id,
                component.bbox,
                component.pixel_count,
                result.count()
            );
            regions.push(region_plan(&component, &result));
            results.push(result);
        }
        extractor.finish(grid);

        Ok((regions, results))
    }

    fn search_whole(&self, grid: &Grid) -> CamToolResult<(Vec<RegionPlan>, Vec<SearchResult>)> {
        let pixel_count = grid.count(CellLabel::Foreground);
        if pixel_count == 0 {
            return Ok((Vec::new(), Vec::new()));
        }
        let result = self
            .search
            .search(grid, CellLabel::Foreground, SearchWindow::full(grid))?;
        let whole = Component {
            id: 0,
            bbox: BoundingBox {
                min_x: 0,
                min_y: 0,
                max_x: grid.width() - 1,
                max_y: grid.height() - 1,
            },
            pixel_count,
        };
        Ok((vec![region_plan(&whole, &result)], vec![result]))
    }
}

fn region_plan(component: &Component, result: &SearchResult) -> RegionPlan {
    RegionPlan {
        bbox: component.bbox,
        pixel_count: component.pixel_count,
        family: result.family,
        offset: result.offset,
        circles: result.count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner(strategy: PackingStrategy) -> MillPlanner {
        MillPlanner::new(PlannerParameters {
            pixel_size: 1.0,
            tool_diameter: 2.0,
            supersample: 1,
            background: BackgroundColor::White,
            shift_steps: 4,
            strategy,
            parallel: false,
        })
        .unwrap()
    }

    #[test]
    fn test_aggregate_keeps_order() {
        let a = SearchResult {
            family: LatticeFamily::Square,
            offset: Point::default(),
            placements: vec![CirclePlacement::new(Point::new(1.0, 1.0), 0.5)],
        };
        let b = SearchResult {
            family: LatticeFamily::Triangular,
            offset: Point::default(),
            placements: vec![
                CirclePlacement::new(Point::new(5.0, 1.0), 0.5),
                CirclePlacement::new(Point::new(7.0, 1.0), 0.5),
            ],
        };
        let all = aggregate(vec![a, b]);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].center, Point::new(1.0, 1.0));
        assert_eq!(all[2].center, Point::new(7.0, 1.0));
    }

    #[test]
    fn test_grid_fully_claimed_after_plan() {
        let grid = Grid::from_fn(12, 6, 1.0, |x, _| x < 4 || x > 6);
        let plan = planner(PackingStrategy::PerComponent).plan_grid(grid).unwrap();
        assert_eq!(plan.regions.len(), 2);
        assert_eq!(plan.grid.count(CellLabel::Foreground), 0);
        assert_eq!(plan.grid.count(CellLabel::InComponent), 0);
        assert_eq!(plan.grid.count(CellLabel::Claimed), 4 * 6 + 5 * 6);
    }

    #[test]
    fn test_whole_image_strategy() {
        let grid = Grid::from_fn(8, 8, 1.0, |_, _| true);
        let plan = planner(PackingStrategy::WholeImage).plan_grid(grid).unwrap();
        assert_eq!(plan.regions.len(), 1);
        assert_eq!(plan.placements.len(), 16);
        assert_eq!(plan.regions[0].pixel_count, 64);
        // The whole-image search leaves labels untouched
        assert_eq!(plan.grid.count(CellLabel::Foreground), 64);
    }

    #[test]
    fn test_undecodable_file_is_malformed_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("mask.png");
        std::fs::write(&path, b"not a png").unwrap();

        let err = planner(PackingStrategy::PerComponent)
            .plan_file(&path)
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to load image file"));
        assert!(matches!(
            err.downcast_ref::<CamToolError>(),
            Some(CamToolError::Core(Error::MalformedInput { .. }))
        ));
    }

    #[test]
    fn test_whole_image_empty() {
        let grid = Grid::from_fn(8, 8, 1.0, |_, _| false);
        let plan = planner(PackingStrategy::WholeImage).plan_grid(grid).unwrap();
        assert!(plan.regions.is_empty());
        assert!(plan.placements.is_empty());
    }
}
