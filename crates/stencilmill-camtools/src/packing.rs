//! Lattice Packing Search
//!
//! Places as many non-overlapping tool circles as a regular lattice allows
//! inside one region of the grid. Optimal circle packing in an arbitrary shape
//! has no closed form, so the search translates the two canonical packings
//! (square and triangular) over an `N x N` grid of sub-diameter offsets and
//! keeps the trial with the most circles that fit.
//!
//! Trials are independent and may run on the rayon pool. The winner is picked
//! by a pure reduction over `(count, trial index)`, so serial and parallel
//! runs return identical results.

use crate::error::{CamToolError, CamToolResult};
use crate::fit::fits;
use crate::grid::{CellLabel, Grid};
use crate::lattice::{Lattice, SearchWindow};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use stencilmill_core::{ensure_positive, CirclePlacement, LatticeFamily, Point};
use tracing::{debug, trace};

/// Parameters of the offset search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchParameters {
    /// Tool diameter (mm)
    pub tool_diameter: f64,
    /// Offset steps per axis; offsets are `i * d / shift_steps`
    pub shift_steps: u32,
    /// Evaluate trials on the rayon thread pool
    pub parallel: bool,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            tool_diameter: 1.0,
            shift_steps: 32,
            parallel: true,
        }
    }
}

impl SearchParameters {
    pub fn validate(&self) -> CamToolResult<()> {
        ensure_positive("tool_diameter", self.tool_diameter)?;
        if self.shift_steps == 0 {
            return Err(CamToolError::invalid_config("shift_steps", "must be at least 1"));
        }
        Ok(())
    }
}

/// One (offset, family) combination, ordered by `index`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trial {
    pub index: usize,
    pub family: LatticeFamily,
    pub offset: Point,
}

/// Winning trial for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub family: LatticeFamily,
    pub offset: Point,
    pub placements: Vec<CirclePlacement>,
}

impl SearchResult {
    pub fn count(&self) -> usize {
        self.placements.len()
    }
}

/// Offset/lattice search over a labeled grid
#[derive(Debug, Clone)]
pub struct PackingSearch {
    params: SearchParameters,
}

impl PackingSearch {
    pub fn new(params: SearchParameters) -> CamToolResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// All trials in evaluation order: x shift, then y shift, then family
    pub fn trials(&self) -> Vec<Trial> {
        let n = self.params.shift_steps as usize;
        let shift = self.params.tool_diameter / n as f64;
        let mut trials = Vec::with_capacity(n * n * LatticeFamily::ALL.len());
        for i in 0..n {
            for j in 0..n {
                for family in LatticeFamily::ALL {
                    trials.push(Trial {
                        index: trials.len(),
                        family,
                        offset: Point::new(i as f64 * shift, j as f64 * shift),
                    });
                }
            }
        }
        trials
    }

    /// Centers of a single trial that fit entirely inside cells labeled `label`
    pub fn evaluate(
        &self,
        grid: &Grid,
        label: CellLabel,
        window: SearchWindow,
        trial: &Trial,
    ) -> CamToolResult<Vec<CirclePlacement>> {
        let radius = self.params.tool_diameter / 2.0;
        let lattice = Lattice::new(trial.family, trial.offset, self.params.tool_diameter);
        let mut placements = Vec::new();
        for point in lattice.points(window) {
            if fits(grid, label, point.center, radius)? {
                placements.push(CirclePlacement::new(point.center, radius));
            }
        }
        Ok(placements)
    }

    /// Best trial for the region labeled `label` inside `window`
    ///
    /// Ties keep the earliest trial in [`PackingSearch::trials`] order.
    pub fn search(
        &self,
        grid: &Grid,
        label: CellLabel,
        window: SearchWindow,
    ) -> CamToolResult<SearchResult> {
        let trials = self.trials();
        let run = |trial: &Trial| -> CamToolResult<(Trial, Vec<CirclePlacement>)> {
            let placements = self.evaluate(grid, label, window, trial)?;
            trace!(
                "Trial {} ({} at {}) placed {}",
                trial.index,
                trial.family,
                trial.offset,
                placements.len()
            );
            Ok((*trial, placements))
        };

        let outcomes: Vec<(Trial, Vec<CirclePlacement>)> = if self.params.parallel {
            trials.par_iter().map(run).collect::<CamToolResult<_>>()?
        } else {
            trials.iter().map(run).collect::<CamToolResult<_>>()?
        };

        let (trial, placements) = outcomes
            .into_iter()
            .reduce(|best, next| {
                let better = next.1.len() > best.1.len()
                    || (next.1.len() == best.1.len() && next.0.index < best.0.index);
                if better {
                    next
                } else {
                    best
                }
            })
            .ok_or_else(|| CamToolError::invariant("offset search produced no trials"))?;

        debug!(
            "Best packing: {} circles, {} lattice at offset {}",
            placements.len(),
            trial.family,
            trial.offset
        );
        Ok(SearchResult {
            family: trial.family,
            offset: trial.offset,
            placements,
        })
    }
}
