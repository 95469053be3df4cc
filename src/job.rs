//! A complete run: image in, G-code out

use anyhow::Context;
use std::path::PathBuf;
use stencilmill_camtools::{save_debug_images, MillPlanner, PlannerParameters, ToolpathEmitter};
use stencilmill_settings::MillConfig;
use tracing::info;

/// Everything needed for one run, resolved at the boundary
#[derive(Debug, Clone, PartialEq)]
pub struct MillJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub debug_dir: Option<PathBuf>,
    pub config: MillConfig,
}

/// What a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub regions: usize,
    pub placements: usize,
    pub output: PathBuf,
}

/// Planner parameters carried by a resolved configuration
pub fn planner_parameters(config: &MillConfig) -> PlannerParameters {
    PlannerParameters {
        pixel_size: config.mask.pixel_size,
        tool_diameter: config.tool_diameter,
        supersample: config.mask.supersample,
        background: config.mask.background,
        shift_steps: config.search.shift_steps,
        strategy: config.search.strategy,
        parallel: config.search.parallel,
    }
}

/// Plan placements for the job's image and write the toolpath
///
/// Debug images are written before the toolpath; the G-code file is only
/// written once the whole plan and program have been generated.
pub fn run_job(job: &MillJob) -> anyhow::Result<JobReport> {
    let planner = MillPlanner::new(planner_parameters(&job.config))?;
    let plan = planner.plan_file(&job.input)?;

    if let Some(dir) = &job.debug_dir {
        save_debug_images(dir, &plan.grid, &plan.placements)
            .with_context(|| format!("Failed to write debug images to {}", dir.display()))?;
    }

    let mut emitter = ToolpathEmitter::new(job.config.profile)?;
    if job.config.flip_y {
        emitter = emitter.with_flip_y(plan.grid.physical_height());
    }
    emitter
        .write_to_file(&plan.placements, &job.output)
        .with_context(|| format!("Failed to write G-code to {}", job.output.display()))?;

    info!(
        "{} -> {}: {} placements in {} regions",
        job.input.display(),
        job.output.display(),
        plan.placements.len(),
        plan.regions.len()
    );
    Ok(JobReport {
        regions: plan.regions.len(),
        placements: plan.placements.len(),
        output: job.output.clone(),
    })
}
