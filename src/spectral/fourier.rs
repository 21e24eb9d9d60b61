use std::f64::consts::PI;

use ndarray as nd;
use rustfft::FftPlanner;
use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{SpectralError, SpectralResult};

/// Smallest number of points along a periodic axis.
pub const MIN_FOURIER_SIZE: usize = 2;

/// Value type of a periodic basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FourierDtype {
    /// All `N` wavenumbers in FFT order `0, 1, .., -2, -1`.
    Complex,
    /// Real-valued data, `N/2 + 1` non-negative wavenumbers.
    Real,
}

/// Fourier basis on `[0, 2π)` with `N` equispaced points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourierBasis {
    n: usize,
    dtype: FourierDtype,
}

impl FourierBasis {
    pub fn new(n: usize, dtype: FourierDtype) -> SpectralResult<Self> {
        if n < MIN_FOURIER_SIZE {
            return Err(SpectralError::GridTooSmall {
                axis: 0,
                size: n,
                min: MIN_FOURIER_SIZE,
            });
        }
        Ok(Self { n, dtype })
    }

    pub fn complex(n: usize) -> SpectralResult<Self> {
        Self::new(n, FourierDtype::Complex)
    }

    pub fn real(n: usize) -> SpectralResult<Self> {
        Self::new(n, FourierDtype::Real)
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn dtype(&self) -> FourierDtype {
        self.dtype
    }

    /// Number of stored modes.
    pub fn spectral_len(&self) -> usize {
        match self.dtype {
            FourierDtype::Complex => self.n,
            FourierDtype::Real => self.n / 2 + 1,
        }
    }

    /// Grid points `2πj/N`.
    pub fn points(&self) -> Vec<f64> {
        (0..self.n)
            .map(|j| 2.0 * PI * j as f64 / self.n as f64)
            .collect()
    }

    /// Integer wavenumbers of the stored modes.
    pub fn wavenumbers(&self) -> Vec<f64> {
        let n = self.n as i64;
        match self.dtype {
            FourierDtype::Complex => (0..n)
                .map(|j| (if j < (n + 1) / 2 { j } else { j - n }) as f64)
                .collect(),
            FourierDtype::Real => (0..=n / 2).map(|j| j as f64).collect(),
        }
    }

    /// Index of the Nyquist mode, present only for even `N`.
    pub fn nyquist_index(&self) -> Option<usize> {
        (self.n % 2 == 0).then_some(self.n / 2)
    }

    /// Weight of mode `m` when summing a Hermitian-compressed spectrum.
    ///
    /// Real bases store only non-negative modes, so every mode except the
    /// zero and Nyquist modes stands for itself and its conjugate.
    pub fn hermitian_weight(&self, m: usize) -> f64 {
        match self.dtype {
            FourierDtype::Complex => 1.0,
            FourierDtype::Real => {
                if m == 0 || Some(m) == self.nyquist_index() {
                    1.0
                } else {
                    2.0
                }
            }
        }
    }
}

/// Normalized forward FFT along `axis`: `û_l = (1/N) Σ_j u_j e^{-i l y_j}`.
pub fn fft_axis(data: &mut nd::Array3<Complex64>, axis: usize) {
    let n = data.len_of(nd::Axis(axis));
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let scale = 1.0 / n as f64;
    let mut buffer = vec![Complex64::new(0.0, 0.0); n];
    for mut lane in data.lanes_mut(nd::Axis(axis)) {
        for (b, v) in buffer.iter_mut().zip(lane.iter()) {
            *b = *v;
        }
        fft.process(&mut buffer);
        for (v, b) in lane.iter_mut().zip(&buffer) {
            *v = *b * scale;
        }
    }
}

/// Unnormalized inverse FFT along `axis`: `u_j = Σ_l û_l e^{i l y_j}`.
pub fn ifft_axis(data: &mut nd::Array3<Complex64>, axis: usize) {
    let n = data.len_of(nd::Axis(axis));
    let mut planner = FftPlanner::<f64>::new();
    let ifft = planner.plan_fft_inverse(n);
    let mut buffer = vec![Complex64::new(0.0, 0.0); n];
    for mut lane in data.lanes_mut(nd::Axis(axis)) {
        for (b, v) in buffer.iter_mut().zip(lane.iter()) {
            *b = *v;
        }
        ifft.process(&mut buffer);
        for (v, b) in lane.iter_mut().zip(&buffer) {
            *v = *b;
        }
    }
}

/// Normalized real-to-complex FFT along the last axis.
///
/// Input shape `(a, b, N)`, output shape `(a, b, N/2 + 1)`.
pub fn rfft_last(data: &nd::Array3<f64>) -> nd::Array3<Complex64> {
    let (na, nb, n) = data.dim();
    let nh = n / 2 + 1;
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let scale = 1.0 / n as f64;
    let mut out = nd::Array3::<Complex64>::zeros((na, nb, nh));
    let mut buffer = vec![Complex64::new(0.0, 0.0); n];
    for i in 0..na {
        for j in 0..nb {
            for (b, v) in buffer.iter_mut().zip(data.slice(nd::s![i, j, ..])) {
                *b = Complex64::new(*v, 0.0);
            }
            fft.process(&mut buffer);
            for (m, v) in out.slice_mut(nd::s![i, j, ..]).iter_mut().enumerate() {
                *v = buffer[m] * scale;
            }
        }
    }
    out
}

/// Unnormalized complex-to-real inverse FFT along the last axis.
///
/// Input shape `(a, b, n/2 + 1)`, output shape `(a, b, n)`. The full
/// spectrum is rebuilt with Hermitian symmetry before the transform.
pub fn irfft_last(data: &nd::Array3<Complex64>, n: usize) -> nd::Array3<f64> {
    let (na, nb, nh) = data.dim();
    debug_assert_eq!(nh, n / 2 + 1);
    let mut planner = FftPlanner::<f64>::new();
    let ifft = planner.plan_fft_inverse(n);
    let mut out = nd::Array3::<f64>::zeros((na, nb, n));
    let mut buffer = vec![Complex64::new(0.0, 0.0); n];
    for i in 0..na {
        for j in 0..nb {
            buffer.fill(Complex64::new(0.0, 0.0));
            for m in 0..nh {
                let c = data[[i, j, m]];
                buffer[m] = c;
                if m > 0 && n - m != m {
                    buffer[n - m] = c.conj();
                }
            }
            ifft.process(&mut buffer);
            for (k, v) in out.slice_mut(nd::s![i, j, ..]).iter_mut().enumerate() {
                *v = buffer[k].re;
            }
        }
    }
    out
}
