use ndarray as nd;
use rayon::prelude::*;
use rustfft::num_complex::Complex64;

use super::basis::BiharmonicBasis;
use super::comm::Communicator;
use super::family::Family;
use super::fourier::{self, FourierBasis, FourierDtype};
use crate::error::{SpectralError, SpectralResult};

/// Field sampled on the physical grid, shape `(N0, N1, N2)`.
///
/// `u[[i, j, k]]` is the value at `(x_i, y_j, z_k)`.
pub type PhysicalField = nd::Array3<f64>;

/// Expansion coefficients, shape `(N0 - 4, N1, N2/2 + 1)`.
///
/// `u_hat[[k, l, m]]` multiplies `φ_k(x) e^{i ky_l y} e^{i kz_m z}`.
pub type SpectralField = nd::Array3<Complex64>;

/// One-dimensional coordinates of the local grid.
///
/// The grid is their tensor product; fields over it use the
/// [`PhysicalField`] layout.
#[derive(Debug, Clone)]
pub struct LocalMesh {
    pub x: nd::Array1<f64>,
    pub y: nd::Array1<f64>,
    pub z: nd::Array1<f64>,
}

impl LocalMesh {
    pub fn shape(&self) -> [usize; 3] {
        [self.x.len(), self.y.len(), self.z.len()]
    }
}

/// Tensor product of a biharmonic basis (x) with a complex (y) and a real (z)
/// Fourier basis.
#[derive(Debug, Clone)]
pub struct TensorProductSpace {
    comm: Communicator,
    x: BiharmonicBasis,
    y: FourierBasis,
    z: FourierBasis,
}

impl TensorProductSpace {
    /// Composes the three 1D bases.
    ///
    /// Axis 1 must be complex and axis 2 real: the real-to-complex transform
    /// runs first, along the last axis.
    pub fn new(
        comm: &Communicator,
        bases: (BiharmonicBasis, FourierBasis, FourierBasis),
    ) -> SpectralResult<Self> {
        let (x, y, z) = bases;
        if y.dtype() != FourierDtype::Complex {
            return Err(SpectralError::InvalidSpace(
                "axis 1 must be a complex Fourier basis".to_string(),
            ));
        }
        if z.dtype() != FourierDtype::Real {
            return Err(SpectralError::InvalidSpace(
                "axis 2 must be a real Fourier basis".to_string(),
            ));
        }
        tracing::debug!(
            family = %x.family(),
            shape = ?[x.size(), y.size(), z.size()],
            threads = comm.threads(),
            "tensor-product space"
        );
        Ok(Self {
            comm: comm.clone(),
            x,
            y,
            z,
        })
    }

    /// Builds the default mixed space for `shape` and `family`.
    pub fn biharmonic(comm: &Communicator, shape: [usize; 3], family: Family) -> SpectralResult<Self> {
        let sd = BiharmonicBasis::new(shape[0], family)?;
        let k1 = FourierBasis::complex(shape[1]).map_err(|e| with_axis(e, 1))?;
        let k2 = FourierBasis::real(shape[2]).map_err(|e| with_axis(e, 2))?;
        Self::new(comm, (sd, k1, k2))
    }

    pub fn comm(&self) -> &Communicator {
        &self.comm
    }

    pub fn family(&self) -> Family {
        self.x.family()
    }

    pub fn biharmonic_basis(&self) -> &BiharmonicBasis {
        &self.x
    }

    pub fn fourier_bases(&self) -> (&FourierBasis, &FourierBasis) {
        (&self.y, &self.z)
    }

    /// Physical shape `(N0, N1, N2)`.
    pub fn shape(&self) -> [usize; 3] {
        [self.x.size(), self.y.size(), self.z.size()]
    }

    /// Spectral shape `(N0 - 4, N1, N2/2 + 1)`.
    pub fn spectral_shape(&self) -> [usize; 3] {
        [self.x.dim(), self.y.spectral_len(), self.z.spectral_len()]
    }

    /// Wavenumbers along y and z, in storage order.
    pub fn wavenumbers(&self) -> (Vec<f64>, Vec<f64>) {
        (self.y.wavenumbers(), self.z.wavenumbers())
    }

    /// Whether `(l, m)` is a Nyquist mode of either periodic axis.
    pub fn is_nyquist(&self, l: usize, m: usize) -> bool {
        self.y.nyquist_index() == Some(l) || self.z.nyquist_index() == Some(m)
    }

    pub fn local_mesh(&self) -> LocalMesh {
        LocalMesh {
            x: nd::Array1::from(self.x.points().to_vec()),
            y: nd::Array1::from(self.y.points()),
            z: nd::Array1::from(self.z.points()),
        }
    }

    pub fn zeros_spectral(&self) -> SpectralField {
        let [a, b, c] = self.spectral_shape();
        nd::Array3::zeros((a, b, c))
    }

    /// Inner product `(v, u)` of every test function with grid values.
    pub fn scalar_product(&self, u: &PhysicalField) -> SpectralResult<SpectralField> {
        check_shape(&self.shape(), u.shape())?;
        let mixed = self.fourier_forward(u);
        Ok(self.along_x(&mixed, self.x.dim(), |lane| self.x.scalar_product(lane)))
    }

    /// Projection of grid values onto the space.
    pub fn forward(&self, u: &PhysicalField) -> SpectralResult<SpectralField> {
        check_shape(&self.shape(), u.shape())?;
        let mixed = self.fourier_forward(u);
        Ok(self.along_x(&mixed, self.x.dim(), |lane| self.x.forward(lane)))
    }

    /// Evaluates coefficients on the physical grid.
    pub fn backward(&self, u_hat: &SpectralField) -> SpectralResult<PhysicalField> {
        check_shape(&self.spectral_shape(), u_hat.shape())?;
        let mut mixed = self.along_x(u_hat, self.x.size(), |lane| self.x.backward(lane));
        fourier::ifft_axis(&mut mixed, 1);
        Ok(fourier::irfft_last(&mixed, self.z.size()))
    }

    /// Evaluates coefficients at arbitrary points.
    ///
    /// `points` has shape `(3, n)`: row 0 holds x, row 1 y and row 2 z
    /// coordinates, so column `p` is one point.
    pub fn eval(
        &self,
        points: nd::ArrayView2<f64>,
        u_hat: &SpectralField,
    ) -> SpectralResult<nd::Array1<f64>> {
        check_shape(&self.spectral_shape(), u_hat.shape())?;
        if points.nrows() != 3 {
            return Err(SpectralError::InvalidPoints(points.shape().to_vec()));
        }
        let (ky, kz) = self.wavenumbers();
        let [nk, nl, nm] = self.spectral_shape();

        let values = points
            .columns()
            .into_iter()
            .map(|p| {
                let phi = self.x.evaluate(p[0], 0);
                let ey: Vec<Complex64> = ky.iter().map(|k| Complex64::from_polar(1.0, k * p[1])).collect();
                let ez: Vec<Complex64> = kz
                    .iter()
                    .enumerate()
                    .map(|(m, k)| Complex64::from_polar(self.z.hermitian_weight(m), k * p[2]))
                    .collect();
                let mut sum = Complex64::new(0.0, 0.0);
                for k in 0..nk {
                    let mut inner = Complex64::new(0.0, 0.0);
                    for l in 0..nl {
                        for m in 0..nm {
                            inner += u_hat[[k, l, m]] * ey[l] * ez[m];
                        }
                    }
                    sum += inner * phi[[0, k]];
                }
                sum.re
            })
            .collect();
        Ok(values)
    }

    /// Forward Fourier transforms along z (real) then y (complex).
    fn fourier_forward(&self, u: &PhysicalField) -> nd::Array3<Complex64> {
        let mut mixed = fourier::rfft_last(u);
        fourier::fft_axis(&mut mixed, 1);
        mixed
    }

    /// Applies a 1D operation to every x-lane, producing lanes of length `out_len`.
    fn along_x<F>(&self, data: &nd::Array3<Complex64>, out_len: usize, op: F) -> nd::Array3<Complex64>
    where
        F: Fn(nd::ArrayView1<Complex64>) -> nd::Array1<Complex64> + Sync,
    {
        let (_, nl, nm) = data.dim();
        let lanes: Vec<nd::Array1<Complex64>> = self.comm.install(|| {
            (0..nl * nm)
                .into_par_iter()
                .map(|idx| op(data.slice(nd::s![.., idx / nm, idx % nm])))
                .collect()
        });
        let mut out = nd::Array3::<Complex64>::zeros((out_len, nl, nm));
        for (idx, lane) in lanes.into_iter().enumerate() {
            out.slice_mut(nd::s![.., idx / nm, idx % nm]).assign(&lane);
        }
        out
    }
}

fn check_shape(expected: &[usize], actual: &[usize]) -> SpectralResult<()> {
    if expected != actual {
        return Err(SpectralError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        });
    }
    Ok(())
}

fn with_axis(err: SpectralError, axis: usize) -> SpectralError {
    match err {
        SpectralError::GridTooSmall { size, min, .. } => SpectralError::GridTooSmall { axis, size, min },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(shape: [usize; 3], family: Family) -> TensorProductSpace {
        let comm = Communicator::with_threads(2).unwrap();
        TensorProductSpace::biharmonic(&comm, shape, family).unwrap()
    }

    /// Smooth field with the right boundary conditions and a few Fourier modes.
    fn sample_field(mesh: &LocalMesh) -> PhysicalField {
        nd::Array3::from_shape_fn(
            (mesh.x.len(), mesh.y.len(), mesh.z.len()),
            |(i, j, k)| {
                let (x, y, z) = (mesh.x[i], mesh.y[j], mesh.z[k]);
                (1.0 - x * x).powi(2) * (1.0 + x) * (1.0 + y.cos() * (2.0 * z).sin() + 0.3 * (3.0 * y).sin())
            },
        )
    }

    #[test]
    fn test_shapes() {
        let t = space([12, 8, 6], Family::Chebyshev);
        assert_eq!(t.shape(), [12, 8, 6]);
        assert_eq!(t.spectral_shape(), [8, 8, 4]);
        assert_eq!(t.local_mesh().shape(), [12, 8, 6]);
        assert!(t.is_nyquist(4, 0));
        assert!(t.is_nyquist(0, 3));
        assert!(!t.is_nyquist(3, 2));
    }

    #[test]
    fn test_odd_chebyshev_size_is_rejected() {
        let comm = Communicator::with_threads(1).unwrap();
        assert!(matches!(
            TensorProductSpace::biharmonic(&comm, [11, 8, 8], Family::Chebyshev),
            Err(SpectralError::OddChebyshevSize(11))
        ));
        assert!(TensorProductSpace::biharmonic(&comm, [11, 8, 8], Family::Legendre).is_ok());
    }

    #[test]
    fn test_small_periodic_axis_reports_axis() {
        let comm = Communicator::with_threads(1).unwrap();
        assert!(matches!(
            TensorProductSpace::biharmonic(&comm, [8, 8, 1], Family::Legendre),
            Err(SpectralError::GridTooSmall { axis: 2, .. })
        ));
    }

    #[test]
    fn test_axis_dtypes_are_validated() {
        let comm = Communicator::with_threads(1).unwrap();
        let sd = BiharmonicBasis::new(8, Family::Legendre).unwrap();
        let bases = (sd, FourierBasis::real(8).unwrap(), FourierBasis::real(8).unwrap());
        assert!(matches!(
            TensorProductSpace::new(&comm, bases),
            Err(SpectralError::InvalidSpace(_))
        ));
    }

    #[test]
    fn test_forward_backward_round_trip() {
        for family in [Family::Chebyshev, Family::Legendre] {
            let t = space([16, 8, 8], family);
            let u = sample_field(&t.local_mesh());
            let u_hat = t.forward(&u).unwrap();
            assert_eq!(u_hat.shape(), &[12, 8, 5]);
            let back = t.backward(&u_hat).unwrap();
            let max_err = (&back - &u).iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            assert!(max_err < 1e-12, "{family}: {max_err}");
        }
    }

    #[test]
    fn test_eval_matches_backward_on_grid_points() {
        let t = space([12, 8, 8], Family::Legendre);
        let mesh = t.local_mesh();
        let u = sample_field(&mesh);
        let u_hat = t.forward(&u).unwrap();
        let points = nd::arr2(&[
            [mesh.x[2], mesh.x[7]],
            [mesh.y[3], mesh.y[1]],
            [mesh.z[5], mesh.z[0]],
        ]);
        let values = t.eval(points.view(), &u_hat).unwrap();
        assert!((values[0] - u[[2, 3, 5]]).abs() < 1e-12);
        assert!((values[1] - u[[7, 1, 0]]).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let t = space([12, 8, 8], Family::Chebyshev);
        let wrong = nd::Array3::<f64>::zeros((12, 8, 7));
        assert!(matches!(
            t.forward(&wrong),
            Err(SpectralError::ShapeMismatch { .. })
        ));
        let wrong_hat = nd::Array3::<Complex64>::zeros((12, 8, 5));
        assert!(matches!(
            t.backward(&wrong_hat),
            Err(SpectralError::ShapeMismatch { .. })
        ));
    }
}
