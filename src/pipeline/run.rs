use std::time::Instant;

use anyhow::{Context, Result};

use super::config::PipelineConfig;
use super::model::ManufacturedSolution;
use super::verify::{VerificationReport, verify};
use crate::spectral::{
    BiharmonicSolver, Communicator, LocalMesh, PhysicalField, SpectralField, TensorProductSpace,
    assemble, inner_rhs,
};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub report: VerificationReport,
    pub mesh: LocalMesh,
    pub u_hat: SpectralField,
    /// Computed solution on the grid.
    pub computed: PhysicalField,
    /// Analytic solution on the grid.
    pub exact: PhysicalField,
}

impl PipelineOutcome {
    /// Pointwise `computed - exact`.
    pub fn error(&self) -> PhysicalField {
        &self.computed - &self.exact
    }
}

/// Runs the whole pipeline and fails when the accuracy checks do not pass.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutcome> {
    let outcome = solve(config)?;
    outcome
        .report
        .ensure()
        .with_context(|| format!("{} solution is not accurate enough", config.family))?;
    Ok(outcome)
}

/// Runs the pipeline up to and including verification, without judging
/// the report.
pub fn solve(config: &PipelineConfig) -> Result<PipelineOutcome> {
    let form = config.form();
    tracing::info!(
        family = %config.family,
        %form,
        shape = ?config.shape,
        "starting biharmonic run"
    );
    let start = Instant::now();

    // Model
    let model = ManufacturedSolution::reference();
    let exact = model.exact_fn()?;
    let forcing = model.forcing_fn()?;
    tracing::info!(
        exact_nodes = model.exact.node_count(),
        forcing_nodes = model.forcing.node_count(),
        "manufactured solution ready"
    );

    // Discretization
    let comm = Communicator::with_threads(config.threads.unwrap_or(0))?;
    let space = TensorProductSpace::biharmonic(&comm, config.shape, config.family)
        .context("failed to build the tensor-product space")?;
    let mesh = space.local_mesh();
    tracing::info!(
        spectral_shape = ?space.spectral_shape(),
        threads = comm.threads(),
        "discretization ready"
    );

    // Assembly
    let fj = comm.install(|| forcing.on_mesh(&mesh))?;
    let rhs = inner_rhs(&space, &fj)?;
    let operator = assemble(&space, form)?;
    tracing::info!(terms = operator.terms().len(), "assembly done");

    // Solve
    let solver = BiharmonicSolver::new(&space, &operator)?;
    let u_hat = solver.solve(&rhs)?;
    tracing::info!("solve done");

    // Verification
    let points = config.points_array();
    let verification = verify(
        &space,
        &u_hat,
        form,
        &exact,
        points.view(),
        (config.grid_tolerance, config.point_tolerance),
    )?;
    let report = verification.report;
    tracing::info!(
        max_grid_error = report.max_grid_error,
        max_point_error = report.max_point_error(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "verification done"
    );

    Ok(PipelineOutcome {
        report,
        mesh,
        u_hat,
        computed: verification.computed,
        exact: verification.exact,
    })
}
