use std::f64::consts::PI;

use crate::error::SpectralResult;
use crate::symbolic::{Expr, Lambda};

/// Argument order of every evaluator built from the model.
pub const COORDINATES: [&str; 3] = ["x", "y", "z"];

/// Analytic solution of the clamped problem and its forcing `f = ∇⁴u`.
#[derive(Debug, Clone)]
pub struct ManufacturedSolution {
    pub exact: Expr,
    pub forcing: Expr,
}

impl ManufacturedSolution {
    /// Builds the model from any `u` satisfying `u(±1) = u'(±1) = 0` in x
    /// and periodic in y and z.
    pub fn from_exact(exact: Expr) -> Self {
        let forcing = exact.biharmonic(COORDINATES);
        Self { exact, forcing }
    }

    /// `u = sin(4πx) sin(6z) cos(4y) (1 - x²)`.
    pub fn reference() -> Self {
        let [x, y, z] = [Expr::var("x"), Expr::var("y"), Expr::var("z")];
        let exact = (4.0 * PI * x.clone()).sin()
            * (6.0 * z).sin()
            * (4.0 * y).cos()
            * (1.0 - x.powi(2));
        Self::from_exact(exact)
    }

    pub fn exact_fn(&self) -> SpectralResult<Lambda> {
        self.exact.lambdify(&COORDINATES)
    }

    pub fn forcing_fn(&self) -> SpectralResult<Lambda> {
        self.forcing.lambdify(&COORDINATES)
    }
}
