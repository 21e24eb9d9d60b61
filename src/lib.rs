pub mod draw;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod spectral;
pub mod symbolic;

// Prelude
pub use error::{SpectralError, SpectralResult};
pub use pipeline::{PipelineConfig, VerificationReport, run};
pub use spectral::{AssemblyForm, Communicator, Family, TensorProductSpace};
pub use symbolic::Expr;
