use std::path::PathBuf;

use anyhow::Result;
use biharmonic3d::draw::{self, PlotConfig};
use biharmonic3d::io::{read_config, write_report};
use biharmonic3d::pipeline::{self, ConfigOverrides, PipelineConfig};
use biharmonic3d::spectral::{AssemblyForm, Family};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Solve ∇⁴u = f on [-1, 1] x [0, 2π)² with a spectral Galerkin method
/// and check the result against a manufactured solution.
#[derive(Parser)]
#[command(name = "biharmonic3d", version)]
struct Cli {
    /// Polynomial family along x: chebyshev or legendre
    family: Option<Family>,

    /// Grid size as N0,N1,N2
    #[arg(long, value_delimiter = ',')]
    shape: Option<Vec<usize>>,

    /// Weak form: direct or by-parts (default depends on the family)
    #[arg(long)]
    form: Option<AssemblyForm>,

    /// Worker threads (default: one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Read the run configuration from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the verification report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Skip the Rerun plots
    #[arg(long)]
    no_plot: bool,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let base = match &self.config {
            Some(path) => read_config(path)?,
            None => PipelineConfig::default(),
        };
        base.merge(ConfigOverrides {
            family: self.family,
            shape: self.shape,
            form: self.form,
            threads: self.threads,
            no_plot: self.no_plot || draw::headless(),
        })
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let report_path = cli.report.clone();
    let config = cli.into_config()?;

    let outcome = pipeline::solve(&config)?;

    if let Some(path) = report_path {
        write_report(&path, &outcome.report)?;
        tracing::info!(path = %path.display(), "report written");
    }

    if config.plot {
        let plot_config = PlotConfig::new();
        let session = draw::start_session(&plot_config)?;
        draw::plot_outcome(&session, &plot_config, &outcome, config.plot_slice)?;
    } else {
        tracing::info!("plotting skipped");
    }

    outcome.report.ensure()?;
    println!(
        "{} ({}) {:?}: max grid error {:.3e}, max point error {:.3e}",
        outcome.report.family,
        outcome.report.form,
        outcome.report.shape,
        outcome.report.max_grid_error,
        outcome.report.max_point_error()
    );
    Ok(())
}
