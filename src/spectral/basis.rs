use ndarray as nd;
use rustfft::num_complex::Complex64;

use super::family::Family;
use super::linalg::LuFactors;
use crate::error::SpectralResult;

/// Highest derivative order tabulated at the quadrature points.
pub const MAX_DERIVATIVE: usize = 4;

/// Shen's biharmonic Galerkin basis on `[-1, 1]`.
///
/// With `N` quadrature points the basis has `N - 4` functions
/// `φ_k = P_k + a_k P_{k+2} + b_k P_{k+4}`, each with homogeneous Dirichlet
/// and Neumann conditions at both ends. `P` is the Chebyshev or Legendre
/// polynomial family.
#[derive(Debug, Clone)]
pub struct BiharmonicBasis {
    family: Family,
    nodes: Vec<f64>,
    weights: Vec<f64>,
    /// `tables[d][[i, k]] = φ_k^(d)(x_i)` for `d = 0..=MAX_DERIVATIVE`.
    tables: Vec<nd::Array2<f64>>,
    mass: LuFactors,
}

impl BiharmonicBasis {
    /// Creates a basis with `n` quadrature points.
    ///
    /// Fails with `OddChebyshevSize` for odd `n` under the Chebyshev family
    /// and with `GridTooSmall` for `n < 6`.
    pub fn new(n: usize, family: Family) -> SpectralResult<Self> {
        family.check_size(n)?;
        let (nodes, weights) = family.quadrature(n);
        let dim = n - 4;

        let mut tables = vec![nd::Array2::<f64>::zeros((n, dim)); MAX_DERIVATIVE + 1];
        for (i, &x) in nodes.iter().enumerate() {
            let row = basis_derivatives(family, dim, x, MAX_DERIVATIVE);
            for (d, table) in tables.iter_mut().enumerate() {
                table.row_mut(i).assign(&row.row(d));
            }
        }

        let mass_matrix = weighted_product(&tables[0], &tables[0], &weights);
        let mass = LuFactors::new(mass_matrix)?;

        Ok(Self {
            family,
            nodes,
            weights,
            tables,
            mass,
        })
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Number of quadrature points `N`.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Number of basis functions `N - 4`.
    pub fn dim(&self) -> usize {
        self.nodes.len() - 4
    }

    pub fn points(&self) -> &[f64] {
        &self.nodes
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// `φ_k^(order)(x_i)` at the quadrature points, shape `(N, N - 4)`.
    pub fn table(&self, order: usize) -> &nd::Array2<f64> {
        &self.tables[order]
    }

    /// Quadrature inner product matrix `A[j, k] = (φ_j^(test), φ_k^(trial))_w`.
    pub fn inner_matrix(&self, test_order: usize, trial_order: usize) -> nd::Array2<f64> {
        weighted_product(
            &self.tables[test_order],
            &self.tables[trial_order],
            &self.weights,
        )
    }

    /// Basis function derivatives at an arbitrary point, shape `(order + 1, N - 4)`.
    pub fn evaluate(&self, x: f64, order: usize) -> nd::Array2<f64> {
        basis_derivatives(self.family, self.dim(), x, order)
    }

    /// Scalar product `(φ_j, u)_w` of grid values along the axis.
    pub fn scalar_product(&self, values: nd::ArrayView1<Complex64>) -> nd::Array1<Complex64> {
        let phi = &self.tables[0];
        let weighted: nd::Array1<Complex64> = values
            .iter()
            .zip(&self.weights)
            .map(|(v, w)| *v * *w)
            .collect();
        (0..self.dim())
            .map(|j| {
                phi.column(j)
                    .iter()
                    .zip(weighted.iter())
                    .map(|(p, v)| *v * *p)
                    .sum()
            })
            .collect()
    }

    /// Projects grid values onto the basis (solves the mass system).
    pub fn forward(&self, values: nd::ArrayView1<Complex64>) -> nd::Array1<Complex64> {
        let mut rhs = self.scalar_product(values).to_vec();
        self.mass.solve_complex(&mut rhs);
        nd::Array1::from(rhs)
    }

    /// Evaluates an expansion at the quadrature points.
    pub fn backward(&self, coeffs: nd::ArrayView1<Complex64>) -> nd::Array1<Complex64> {
        let phi = &self.tables[0];
        phi.rows()
            .into_iter()
            .map(|row| row.iter().zip(coeffs.iter()).map(|(p, c)| *c * *p).sum())
            .collect()
    }
}

/// Derivatives of all basis functions at `x`, shape `(max_order + 1, dim)`.
fn basis_derivatives(family: Family, dim: usize, x: f64, max_order: usize) -> nd::Array2<f64> {
    let p = family.derivatives(dim + 3, x, max_order);
    let mut out = nd::Array2::<f64>::zeros((max_order + 1, dim));
    for k in 0..dim {
        let [c0, c2, c4] = family.stencil(k);
        for d in 0..=max_order {
            out[[d, k]] = c0 * p[[d, k]] + c2 * p[[d, k + 2]] + c4 * p[[d, k + 4]];
        }
    }
    out
}

/// `A[j, k] = Σ_i w_i test[i, j] trial[i, k]`.
fn weighted_product(test: &nd::Array2<f64>, trial: &nd::Array2<f64>, weights: &[f64]) -> nd::Array2<f64> {
    let w = nd::Array1::from(weights.to_vec());
    let weighted_trial = trial * &w.insert_axis(nd::Axis(1));
    test.t().dot(&weighted_trial)
}
