//! End-to-end checks of the biharmonic pipeline on the default grid.

use biharmonic3d::pipeline::{self, ManufacturedSolution, PipelineConfig};
use biharmonic3d::spectral::{
    AssemblyForm, BiharmonicSolver, Communicator, Family, TensorProductSpace, assemble, inner_rhs,
};
use biharmonic3d::SpectralError;

fn config(family: Family) -> PipelineConfig {
    let mut config = PipelineConfig::new(family);
    config.plot = false;
    config
}

#[test]
fn test_chebyshev_default_grid_is_accurate() {
    let outcome = pipeline::run(&config(Family::Chebyshev)).unwrap();
    let report = &outcome.report;
    assert_eq!(report.form, AssemblyForm::Direct);
    assert_eq!(report.shape, [36, 36, 36]);
    assert!(report.max_grid_error < 1e-6, "grid error {}", report.max_grid_error);
}

#[test]
fn test_legendre_default_grid_is_accurate() {
    let outcome = pipeline::run(&config(Family::Legendre)).unwrap();
    let report = &outcome.report;
    assert_eq!(report.form, AssemblyForm::IntegratedByParts);
    assert!(report.max_grid_error < 1e-6, "grid error {}", report.max_grid_error);
}

#[test]
fn test_off_grid_points_match_analytic_solution() {
    let outcome = pipeline::run(&config(Family::Chebyshev)).unwrap();
    let points = &outcome.report.points;
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].point, [0.2, 0.1, 0.3]);
    assert_eq!(points[1].point, [0.3, 0.5, 0.6]);

    let exact = ManufacturedSolution::reference().exact_fn().unwrap();
    for check in points {
        let reference = exact.call(&check.point).unwrap();
        assert!((check.exact - reference).abs() < 1e-15);
        assert!(
            (check.computed - reference).abs() < 1e-6,
            "{:?}: {} vs {}",
            check.point,
            check.computed,
            reference
        );
    }
}

#[test]
fn test_odd_chebyshev_size_fails() {
    let mut config = config(Family::Chebyshev);
    config.shape = [35, 36, 36];
    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SpectralError>(),
        Some(SpectralError::OddChebyshevSize(35))
    ));

    // Legendre accepts odd sizes.
    let mut config = self::config(Family::Legendre);
    config.shape = [35, 36, 36];
    assert!(pipeline::run(&config).is_ok());
}

#[test]
fn test_unknown_family_fails_at_parse() {
    assert!(matches!(
        "hermite".parse::<Family>(),
        Err(SpectralError::UnknownFamily(ref name)) if name == "hermite"
    ));
    assert_eq!(" Legendre ".parse::<Family>().unwrap(), Family::Legendre);
}

#[test]
fn test_chebyshev_by_parts_is_rejected() {
    let mut config = config(Family::Chebyshev);
    config.form = Some(AssemblyForm::IntegratedByParts);
    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SpectralError>(),
        Some(SpectralError::UnsupportedForm { .. })
    ));
}

#[test]
fn test_legendre_forms_give_same_solution() {
    let comm = Communicator::world().unwrap();
    let space = TensorProductSpace::biharmonic(&comm, [36, 36, 36], Family::Legendre).unwrap();
    let forcing = ManufacturedSolution::reference().forcing_fn().unwrap();
    let fj = forcing.on_mesh(&space.local_mesh()).unwrap();
    let rhs = inner_rhs(&space, &fj).unwrap();

    let solve = |form| {
        let operator = assemble(&space, form).unwrap();
        let solver = BiharmonicSolver::new(&space, &operator).unwrap();
        space.backward(&solver.solve(&rhs).unwrap()).unwrap()
    };
    let by_parts = solve(AssemblyForm::IntegratedByParts);
    let direct = solve(AssemblyForm::Direct);

    let max_diff = by_parts
        .iter()
        .zip(direct.iter())
        .fold(0.0_f64, |m, (a, b)| m.max((a - b).abs()));
    assert!(max_diff < 1e-6, "max difference {max_diff}");
}

#[test]
fn test_runs_are_deterministic() {
    let mut first = config(Family::Chebyshev);
    first.threads = Some(1);
    let mut second = first.clone();
    second.threads = Some(4);

    let a = pipeline::solve(&first).unwrap();
    let b = pipeline::solve(&second).unwrap();
    assert_eq!(a.u_hat, b.u_hat);
    assert_eq!(a.computed, b.computed);
    assert_eq!(
        a.report.max_grid_error.to_bits(),
        b.report.max_grid_error.to_bits()
    );
}
