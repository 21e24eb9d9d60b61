use ndarray as nd;
use thiserror::Error;

use crate::spectral::{AssemblyForm, Family};

/// Result type for spectral discretization and solver operations.
pub type SpectralResult<T> = Result<T, SpectralError>;

/// Errors raised by the symbolic model, the discretization and the solver.
#[derive(Debug, Error)]
pub enum SpectralError {
    /// Basis family name that does not resolve to a [`Family`].
    #[error("unknown basis family '{0}' (expected 'chebyshev' or 'legendre')")]
    UnknownFamily(String),

    /// Assembly form name that does not resolve to an [`AssemblyForm`].
    #[error("unknown assembly form '{0}' (expected 'direct' or 'by-parts')")]
    UnknownForm(String),

    /// The Chebyshev biharmonic solver requires an even number of points.
    #[error("biharmonic solver only implemented for even numbers (got N = {0})")]
    OddChebyshevSize(usize),

    #[error("grid size {size} along axis {axis} is too small (minimum {min})")]
    GridTooSmall { axis: usize, size: usize, min: usize },

    #[error("invalid tensor-product space: {0}")]
    InvalidSpace(String),

    #[error("{form} form is not valid for the {family} family")]
    UnsupportedForm { family: Family, form: AssemblyForm },

    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("evaluation points must have shape (3, n), got {0:?}")]
    InvalidPoints(Vec<usize>),

    #[error("singular matrix: zero pivot in column {0}")]
    SingularMatrix(usize),

    #[error("symbol '{0}' is not bound by the evaluator arguments")]
    UnboundSymbol(String),

    #[error("evaluator expects {expected} arguments, got {actual}")]
    Arity { expected: usize, actual: usize },

    /// Computed solution deviates from the analytic reference.
    #[error("{context}: max error {max_error:.3e} exceeds tolerance {tolerance:.3e}")]
    AccuracyViolation {
        context: String,
        max_error: f64,
        tolerance: f64,
    },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Shape(#[from] nd::ShapeError),
}
