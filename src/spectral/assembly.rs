use std::fmt;
use std::str::FromStr;

use ndarray as nd;
use serde::{Deserialize, Serialize};

use super::space::{PhysicalField, SpectralField, TensorProductSpace};
use crate::error::{SpectralError, SpectralResult};

/// Weak form of `∇⁴u = f` used to build the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssemblyForm {
    /// `(v, ∇⁴u)`.
    #[serde(rename = "direct")]
    Direct,
    /// `(∇²v, ∇²u)`. Requires a weight that allows integration by parts.
    #[serde(rename = "by-parts")]
    IntegratedByParts,
}

impl fmt::Display for AssemblyForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyForm::Direct => write!(f, "direct"),
            AssemblyForm::IntegratedByParts => write!(f, "by-parts"),
        }
    }
}

impl FromStr for AssemblyForm {
    type Err = SpectralError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "direct" => Ok(AssemblyForm::Direct),
            "by-parts" | "integrated-by-parts" => Ok(AssemblyForm::IntegratedByParts),
            _ => Err(SpectralError::UnknownForm(s.to_string())),
        }
    }
}

/// One separable term `scale · (α²)^alpha2_power · A` of the operator.
///
/// `A[j, k] = (φ_j^(test), φ_k^(trial))_w` along the non-periodic axis and
/// `α² = ky² + kz²` is the squared wavenumber of a Fourier mode.
#[derive(Debug, Clone)]
pub struct FormTerm {
    pub test_order: usize,
    pub trial_order: usize,
    pub scale: f64,
    pub alpha2_power: i32,
    pub matrix: nd::Array2<f64>,
}

/// Assembled biharmonic operator as a sum of separable terms.
#[derive(Debug, Clone)]
pub struct BiharmonicForm {
    form: AssemblyForm,
    terms: Vec<FormTerm>,
}

impl BiharmonicForm {
    pub fn form(&self) -> AssemblyForm {
        self.form
    }

    pub fn terms(&self) -> &[FormTerm] {
        &self.terms
    }

    /// Dense `(N0 - 4) × (N0 - 4)` operator of the Fourier mode with squared
    /// wavenumber `alpha2`.
    pub fn mode_matrix(&self, alpha2: f64) -> nd::Array2<f64> {
        let n = self.terms.first().map_or(0, |t| t.matrix.nrows());
        let mut out = nd::Array2::<f64>::zeros((n, n));
        for term in &self.terms {
            let factor = term.scale * alpha2.powi(term.alpha2_power);
            if factor != 0.0 {
                out.scaled_add(factor, &term.matrix);
            }
        }
        out
    }
}

/// Assembles the biharmonic operator of `space` in the requested form.
///
/// Expanding `∇⁴ = D⁴ - 2α²D² + α⁴` per Fourier mode gives
///
/// ```text
/// direct:    (φ_j, φ_k'''') - 2α² (φ_j, φ_k'') + α⁴ (φ_j, φ_k)
/// by-parts:  (φ_j'', φ_k'') + 2α² (φ_j', φ_k') + α⁴ (φ_j, φ_k)
/// ```
pub fn assemble(space: &TensorProductSpace, form: AssemblyForm) -> SpectralResult<BiharmonicForm> {
    let family = space.family();
    if !family.supports(form) {
        return Err(SpectralError::UnsupportedForm { family, form });
    }

    let spec: [(usize, usize, f64, i32); 3] = match form {
        AssemblyForm::Direct => [(0, 4, 1.0, 0), (0, 2, -2.0, 1), (0, 0, 1.0, 2)],
        AssemblyForm::IntegratedByParts => [(2, 2, 1.0, 0), (1, 1, 2.0, 1), (0, 0, 1.0, 2)],
    };
    let basis = space.biharmonic_basis();
    let terms: Vec<FormTerm> = spec
        .iter()
        .map(|&(test_order, trial_order, scale, alpha2_power)| FormTerm {
            test_order,
            trial_order,
            scale,
            alpha2_power,
            matrix: basis.inner_matrix(test_order, trial_order),
        })
        .collect();

    tracing::debug!(%family, %form, terms = terms.len(), dim = basis.dim(), "assembled biharmonic form");
    Ok(BiharmonicForm { form, terms })
}

/// Right-hand side `(v, f)` of the linear system.
pub fn inner_rhs(space: &TensorProductSpace, f: &PhysicalField) -> SpectralResult<SpectralField> {
    space.scalar_product(f)
}
