use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use ndarray as nd;
use serde::{Deserialize, Serialize};

use super::assembly::AssemblyForm;
use crate::error::{SpectralError, SpectralResult};

/// Smallest number of quadrature points for a biharmonic basis.
pub const MIN_BIHARMONIC_SIZE: usize = 6;

/// Orthogonal polynomial family used along the non-periodic axis.
///
/// Each variant carries its own quadrature rule, three-term recurrence,
/// biharmonic stencil and default assembly form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Chebyshev,
    Legendre,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Chebyshev => write!(f, "chebyshev"),
            Family::Legendre => write!(f, "legendre"),
        }
    }
}

impl FromStr for Family {
    type Err = SpectralError;

    /// Case-insensitive: `"Chebyshev"`, `"LEGENDRE"`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chebyshev" => Ok(Family::Chebyshev),
            "legendre" => Ok(Family::Legendre),
            _ => Err(SpectralError::UnknownFamily(s.to_string())),
        }
    }
}

impl Family {
    /// Checks the grid size precondition of the biharmonic solver.
    ///
    /// Chebyshev requires an even number of points.
    pub fn check_size(&self, n: usize) -> SpectralResult<()> {
        if *self == Family::Chebyshev && n % 2 != 0 {
            return Err(SpectralError::OddChebyshevSize(n));
        }
        if n < MIN_BIHARMONIC_SIZE {
            return Err(SpectralError::GridTooSmall {
                axis: 0,
                size: n,
                min: MIN_BIHARMONIC_SIZE,
            });
        }
        Ok(())
    }

    /// Gauss quadrature nodes (descending) and weights with `n` points.
    ///
    /// Chebyshev weights integrate against `1/sqrt(1 - x^2)`, Legendre
    /// weights against `1`.
    pub fn quadrature(&self, n: usize) -> (Vec<f64>, Vec<f64>) {
        match self {
            Family::Chebyshev => chebyshev_gauss(n),
            Family::Legendre => legendre_gauss(n),
        }
    }

    /// Coefficients `[1, a_k, b_k]` of `φ_k = P_k + a_k P_{k+2} + b_k P_{k+4}`.
    ///
    /// These make `φ_k(±1) = φ_k'(±1) = 0`.
    pub fn stencil(&self, k: usize) -> [f64; 3] {
        let k = k as f64;
        match self {
            Family::Chebyshev => [1.0, -2.0 * (k + 2.0) / (k + 3.0), (k + 1.0) / (k + 3.0)],
            Family::Legendre => [
                1.0,
                -2.0 * (2.0 * k + 5.0) / (2.0 * k + 7.0),
                (2.0 * k + 3.0) / (2.0 * k + 7.0),
            ],
        }
    }

    /// Assembly form used when none is requested explicitly.
    pub fn default_form(&self) -> AssemblyForm {
        match self {
            // No integration by parts due to the Chebyshev weight.
            Family::Chebyshev => AssemblyForm::Direct,
            Family::Legendre => AssemblyForm::IntegratedByParts,
        }
    }

    pub fn supports(&self, form: AssemblyForm) -> bool {
        match (self, form) {
            (_, AssemblyForm::Direct) => true,
            (Family::Legendre, AssemblyForm::IntegratedByParts) => true,
            (Family::Chebyshev, AssemblyForm::IntegratedByParts) => false,
        }
    }

    /// Derivatives of the orthogonal polynomials at `x`.
    ///
    /// Returns an array of shape `(max_order + 1, degree + 1)` holding
    /// `P_n^(d)(x)` at `[d, n]`. Computed with the differentiated three-term
    /// recurrence, which stays valid at `x = ±1`.
    pub fn derivatives(&self, degree: usize, x: f64, max_order: usize) -> nd::Array2<f64> {
        let mut p = nd::Array2::<f64>::zeros((max_order + 1, degree + 1));
        p[[0, 0]] = 1.0;
        if degree == 0 {
            return p;
        }
        p[[0, 1]] = x;
        if max_order >= 1 {
            p[[1, 1]] = 1.0;
        }
        for n in 1..degree {
            let nf = n as f64;
            for d in 0..=max_order {
                let df = d as f64;
                let lower = if d > 0 { p[[d - 1, n]] } else { 0.0 };
                p[[d, n + 1]] = match self {
                    Family::Chebyshev => 2.0 * x * p[[d, n]] + 2.0 * df * lower - p[[d, n - 1]],
                    Family::Legendre => {
                        ((2.0 * nf + 1.0) * (x * p[[d, n]] + df * lower) - nf * p[[d, n - 1]])
                            / (nf + 1.0)
                    }
                };
            }
        }
        p
    }
}

fn chebyshev_gauss(n: usize) -> (Vec<f64>, Vec<f64>) {
    let nodes = (0..n)
        .map(|i| (PI * (2 * i + 1) as f64 / (2 * n) as f64).cos())
        .collect();
    let weights = vec![PI / n as f64; n];
    (nodes, weights)
}

fn legendre_gauss(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];
    for i in 0..n {
        // Initial guess from the asymptotic root location, then Newton.
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..100 {
            let (p, dp) = legendre_with_derivative(n, x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }
        let (_, dp) = legendre_with_derivative(n, x);
        nodes[i] = x;
        weights[i] = 2.0 / ((1.0 - x * x) * dp * dp);
    }
    (nodes, weights)
}

/// `P_n(x)` and `P_n'(x)` for `x` strictly inside `(-1, 1)`.
fn legendre_with_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p_prev = 1.0;
    let mut p = x;
    for k in 1..n {
        let kf = k as f64;
        let p_next = ((2.0 * kf + 1.0) * x * p - kf * p_prev) / (kf + 1.0);
        p_prev = p;
        p = p_next;
    }
    let dp = n as f64 * (x * p - p_prev) / (x * x - 1.0);
    (p, dp)
}
