use ndarray as nd;
use rayon::prelude::*;
use rustfft::num_complex::Complex64;

use super::assembly::BiharmonicForm;
use super::comm::Communicator;
use super::linalg::LuFactors;
use super::space::{SpectralField, TensorProductSpace};
use crate::error::{SpectralError, SpectralResult};

/// Direct solver for the assembled biharmonic operator.
///
/// The operator is block diagonal in the Fourier modes: every `(l, m)` couples
/// only the `N0 - 4` coefficients along x. One dense system per mode is
/// factorized up front and reused by [`BiharmonicSolver::solve`]. Nyquist
/// modes are not solved for and come out as zero.
#[derive(Debug, Clone)]
pub struct BiharmonicSolver {
    comm: Communicator,
    shape: [usize; 3],
    /// Indexed by `l * N2h + m`. `None` for Nyquist modes.
    factors: Vec<Option<LuFactors>>,
}

impl BiharmonicSolver {
    pub fn new(space: &TensorProductSpace, form: &BiharmonicForm) -> SpectralResult<Self> {
        let shape = space.spectral_shape();
        let [_, nl, nm] = shape;
        let (ky, kz) = space.wavenumbers();

        let factors = space.comm().install(|| {
            (0..nl * nm)
                .into_par_iter()
                .map(|idx| {
                    let (l, m) = (idx / nm, idx % nm);
                    if space.is_nyquist(l, m) {
                        return Ok(None);
                    }
                    let alpha2 = ky[l] * ky[l] + kz[m] * kz[m];
                    LuFactors::new(form.mode_matrix(alpha2)).map(Some)
                })
                .collect::<SpectralResult<Vec<_>>>()
        })?;

        let solved = factors.iter().filter(|f| f.is_some()).count();
        tracing::debug!(modes = nl * nm, solved, "factorized per-mode systems");

        Ok(Self {
            comm: space.comm().clone(),
            shape,
            factors,
        })
    }

    /// Spectral shape of the right-hand sides this solver accepts.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Solves `A û = b` for a right-hand side from [`super::inner_rhs`].
    pub fn solve(&self, rhs: &SpectralField) -> SpectralResult<SpectralField> {
        if rhs.shape() != &self.shape[..] {
            return Err(SpectralError::ShapeMismatch {
                expected: self.shape.to_vec(),
                actual: rhs.shape().to_vec(),
            });
        }
        let [nk, nl, nm] = self.shape;

        let lanes: Vec<Vec<Complex64>> = self.comm.install(|| {
            self.factors
                .par_iter()
                .enumerate()
                .map(|(idx, factor)| match factor {
                    Some(lu) => {
                        let mut b = rhs.slice(nd::s![.., idx / nm, idx % nm]).to_vec();
                        lu.solve_complex(&mut b);
                        b
                    }
                    None => vec![Complex64::new(0.0, 0.0); nk],
                })
                .collect()
        });

        let mut u_hat = SpectralField::zeros((nk, nl, nm));
        for (idx, lane) in lanes.into_iter().enumerate() {
            let mut target = u_hat.slice_mut(nd::s![.., idx / nm, idx % nm]);
            for (t, v) in target.iter_mut().zip(lane) {
                *t = v;
            }
        }
        Ok(u_hat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectral::{AssemblyForm, Family, PhysicalField, assemble, inner_rhs};

    /// u = (1 - x²)² cos(y) sin(2z), so ∇⁴u = (89 - 170x² + 25x⁴) cos(y) sin(2z).
    fn manufactured(space: &TensorProductSpace) -> (PhysicalField, PhysicalField) {
        let mesh = space.local_mesh();
        let dims = (mesh.x.len(), mesh.y.len(), mesh.z.len());
        let u = nd::Array3::from_shape_fn(dims, |(i, j, k)| {
            let x = mesh.x[i];
            (1.0 - x * x).powi(2) * mesh.y[j].cos() * (2.0 * mesh.z[k]).sin()
        });
        let f = nd::Array3::from_shape_fn(dims, |(i, j, k)| {
            let x2 = mesh.x[i] * mesh.x[i];
            (89.0 - 170.0 * x2 + 25.0 * x2 * x2) * mesh.y[j].cos() * (2.0 * mesh.z[k]).sin()
        });
        (u, f)
    }

    fn check(family: Family, form: AssemblyForm) {
        let comm = Communicator::with_threads(2).unwrap();
        let space = TensorProductSpace::biharmonic(&comm, [12, 8, 8], family).unwrap();
        let (u, f) = manufactured(&space);
        let operator = assemble(&space, form).unwrap();
        let solver = BiharmonicSolver::new(&space, &operator).unwrap();
        let u_hat = solver.solve(&inner_rhs(&space, &f).unwrap()).unwrap();
        let uj = space.backward(&u_hat).unwrap();
        let max_err = (&uj - &u).iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        assert!(max_err < 1e-10, "{family}/{form}: {max_err}");
    }

    #[test]
    fn test_solves_manufactured_problem_chebyshev() {
        check(Family::Chebyshev, AssemblyForm::Direct);
    }

    #[test]
    fn test_solves_manufactured_problem_legendre() {
        check(Family::Legendre, AssemblyForm::IntegratedByParts);
        check(Family::Legendre, AssemblyForm::Direct);
    }

    #[test]
    fn test_nyquist_modes_are_zero() {
        let comm = Communicator::with_threads(1).unwrap();
        let space = TensorProductSpace::biharmonic(&comm, [10, 6, 6], Family::Legendre).unwrap();
        let operator = assemble(&space, AssemblyForm::IntegratedByParts).unwrap();
        let solver = BiharmonicSolver::new(&space, &operator).unwrap();
        let rhs = SpectralField::from_elem((6, 6, 4), Complex64::new(1.0, -1.0));
        let u_hat = solver.solve(&rhs).unwrap();
        for k in 0..6 {
            for m in 0..4 {
                assert_eq!(u_hat[[k, 3, m]], Complex64::new(0.0, 0.0));
            }
            for l in 0..6 {
                assert_eq!(u_hat[[k, l, 3]], Complex64::new(0.0, 0.0));
            }
        }
        assert!(u_hat[[0, 1, 1]].norm() > 0.0);
    }

    #[test]
    fn test_rejects_wrong_rhs_shape() {
        let comm = Communicator::with_threads(1).unwrap();
        let space = TensorProductSpace::biharmonic(&comm, [10, 6, 6], Family::Chebyshev).unwrap();
        let operator = assemble(&space, AssemblyForm::Direct).unwrap();
        let solver = BiharmonicSolver::new(&space, &operator).unwrap();
        let rhs = SpectralField::zeros((6, 6, 3));
        assert!(matches!(
            solver.solve(&rhs),
            Err(SpectralError::ShapeMismatch { .. })
        ));
    }
}
