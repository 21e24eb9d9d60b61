use ndarray as nd;
use rustfft::num_complex::Complex64;

use crate::error::{SpectralError, SpectralResult};

/// Dense LU factorization `P·D·A = L·U` with partial pivoting.
///
/// `D` equilibrates the rows (each row scaled by its largest magnitude)
/// before elimination. The spectral operators mix entries that differ by
/// many orders of magnitude, so this keeps the pivot choice meaningful.
#[derive(Debug, Clone)]
pub struct LuFactors {
    /// Packed `L` (unit diagonal, below) and `U` (on and above the diagonal).
    lu: nd::Array2<f64>,
    /// Row `i` of the factorization is row `pivots[i]` of `D·A`.
    pivots: Vec<usize>,
    row_scale: Vec<f64>,
}

impl LuFactors {
    /// Factorizes a square matrix.
    ///
    /// Fails with [`SpectralError::SingularMatrix`] on a zero or non-finite pivot.
    pub fn new(a: nd::Array2<f64>) -> SpectralResult<Self> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(SpectralError::ShapeMismatch {
                expected: vec![n, n],
                actual: a.shape().to_vec(),
            });
        }

        let mut lu = a;
        let mut row_scale = vec![1.0; n];
        for (i, mut row) in lu.rows_mut().into_iter().enumerate() {
            let max = row.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            if max > 0.0 && max.is_finite() {
                row_scale[i] = 1.0 / max;
                row *= row_scale[i];
            }
        }

        let mut pivots: Vec<usize> = (0..n).collect();
        for col in 0..n {
            // Partial pivoting
            let mut best = col;
            for r in col + 1..n {
                if lu[[r, col]].abs() > lu[[best, col]].abs() {
                    best = r;
                }
            }
            let pivot = lu[[best, col]];
            if pivot == 0.0 || !pivot.is_finite() {
                return Err(SpectralError::SingularMatrix(col));
            }
            if best != col {
                for c in 0..n {
                    lu.swap([col, c], [best, c]);
                }
                pivots.swap(col, best);
            }

            for r in col + 1..n {
                let factor = lu[[r, col]] / pivot;
                lu[[r, col]] = factor;
                if factor != 0.0 {
                    for c in col + 1..n {
                        lu[[r, c]] -= factor * lu[[col, c]];
                    }
                }
            }
        }

        Ok(Self {
            lu,
            pivots,
            row_scale,
        })
    }

    pub fn size(&self) -> usize {
        self.pivots.len()
    }

    /// Solves `A·x = b` in place.
    pub fn solve(&self, b: &mut [f64]) {
        let n = self.size();
        assert_eq!(b.len(), n, "right-hand side length must match matrix size");
        let mut y: Vec<f64> = self
            .pivots
            .iter()
            .map(|&p| b[p] * self.row_scale[p])
            .collect();

        // Forward substitution (unit lower triangle)
        for i in 1..n {
            let mut sum = y[i];
            for j in 0..i {
                sum -= self.lu[[i, j]] * y[j];
            }
            y[i] = sum;
        }

        // Back substitution
        for i in (0..n).rev() {
            let mut sum = y[i];
            for j in i + 1..n {
                sum -= self.lu[[i, j]] * y[j];
            }
            y[i] = sum / self.lu[[i, i]];
        }

        b.copy_from_slice(&y);
    }

    /// Solves `A·x = b` in place for a complex right-hand side and a real `A`.
    pub fn solve_complex(&self, b: &mut [Complex64]) {
        let mut re: Vec<f64> = b.iter().map(|v| v.re).collect();
        let mut im: Vec<f64> = b.iter().map(|v| v.im).collect();
        self.solve(&mut re);
        self.solve(&mut im);
        for (v, (r, i)) in b.iter_mut().zip(re.into_iter().zip(im)) {
            *v = Complex64::new(r, i);
        }
    }
}
