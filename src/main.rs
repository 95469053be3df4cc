use clap::Parser;
use stencilmill::{init_logging, run_job, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.log_json)?;
    tracing::debug!(
        "stencilmill {} (built {})",
        stencilmill::VERSION,
        stencilmill::BUILD_DATE
    );

    let job = cli.into_job()?;
    let report = run_job(&job)?;
    println!(
        "Wrote {} placements in {} regions to {}",
        report.placements,
        report.regions,
        report.output.display()
    );

    Ok(())
}
