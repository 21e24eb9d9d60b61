use ndarray as nd;
use serde::{Deserialize, Serialize};

use crate::error::{SpectralError, SpectralResult};
use crate::spectral::{AssemblyForm, Family, PhysicalField, SpectralField, TensorProductSpace};
use crate::symbolic::Lambda;

/// Computed versus analytic value at one off-grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCheck {
    pub point: [f64; 3],
    pub computed: f64,
    pub exact: f64,
}

impl PointCheck {
    pub fn error(&self) -> f64 {
        (self.computed - self.exact).abs()
    }
}

/// Outcome of the accuracy checks of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub family: Family,
    pub form: AssemblyForm,
    pub shape: [usize; 3],
    pub max_grid_error: f64,
    pub grid_tolerance: f64,
    pub points: Vec<PointCheck>,
    pub point_tolerance: f64,
}

impl VerificationReport {
    pub fn max_point_error(&self) -> f64 {
        self.points.iter().fold(0.0, |m, p| m.max(p.error()))
    }

    pub fn passed(&self) -> bool {
        self.ensure().is_ok()
    }

    /// Fails with [`SpectralError::AccuracyViolation`] when either check
    /// exceeds its tolerance. NaN errors always fail.
    pub fn ensure(&self) -> SpectralResult<()> {
        if self.max_grid_error.is_nan() || self.max_grid_error >= self.grid_tolerance {
            return Err(SpectralError::AccuracyViolation {
                context: "grid".to_string(),
                max_error: self.max_grid_error,
                tolerance: self.grid_tolerance,
            });
        }
        let max_point_error = self.max_point_error();
        if self.points.iter().any(|p| p.error().is_nan()) || max_point_error >= self.point_tolerance {
            return Err(SpectralError::AccuracyViolation {
                context: "off-grid points".to_string(),
                max_error: max_point_error,
                tolerance: self.point_tolerance,
            });
        }
        Ok(())
    }
}

/// Report plus the fields it was computed from.
#[derive(Debug, Clone)]
pub struct Verification {
    pub report: VerificationReport,
    /// Backward transform of the solution.
    pub computed: PhysicalField,
    /// Analytic solution on the same grid.
    pub exact: PhysicalField,
}

/// Compares a solution against the analytic one on the grid and at `points`.
///
/// `points` uses the `(3, n)` layout of [`TensorProductSpace::eval`].
pub fn verify(
    space: &TensorProductSpace,
    u_hat: &SpectralField,
    form: AssemblyForm,
    exact: &Lambda,
    points: nd::ArrayView2<f64>,
    tolerances: (f64, f64),
) -> SpectralResult<Verification> {
    let (grid_tolerance, point_tolerance) = tolerances;
    let computed = space.backward(u_hat)?;
    let mesh = space.local_mesh();
    let exact_grid = space.comm().install(|| exact.on_mesh(&mesh))?;
    let max_grid_error = max_abs_diff(&computed, &exact_grid);

    let at_points = space.eval(points, u_hat)?;
    let exact_points = exact.at_points(points)?;
    let checks: Vec<PointCheck> = points
        .columns()
        .into_iter()
        .zip(at_points.iter().zip(exact_points.iter()))
        .map(|(p, (&value, &reference))| PointCheck {
            point: [p[0], p[1], p[2]],
            computed: value,
            exact: reference,
        })
        .collect();

    Ok(Verification {
        report: VerificationReport {
            family: space.family(),
            form,
            shape: space.shape(),
            max_grid_error,
            grid_tolerance,
            points: checks,
            point_tolerance,
        },
        computed,
        exact: exact_grid,
    })
}

/// Maximum pointwise absolute difference. NaN propagates.
pub fn max_abs_diff(a: &PhysicalField, b: &PhysicalField) -> f64 {
    a.iter().zip(b.iter()).fold(0.0_f64, |m, (x, y)| {
        let d = (x - y).abs();
        if d.is_nan() || m.is_nan() { f64::NAN } else { m.max(d) }
    })
}
