//! Demo pipeline: manufactured solution, discretization, solve, verification.
//!
//! ```text
//! PipelineConfig
//!       │
//!       ▼
//! ManufacturedSolution ──► f on grid ──► inner_rhs ─┐
//!                                                   ├──► BiharmonicSolver ──► û
//!               TensorProductSpace ──► assemble ────┘                        │
//!                                                                            ▼
//!                                                      verify ──► VerificationReport
//! ```

pub mod config;
pub mod model;
pub mod run;
pub mod verify;

pub use config::{ConfigOverrides, DEFAULT_SHAPE, DEFAULT_TOLERANCE, PipelineConfig};
pub use model::ManufacturedSolution;
pub use run::{PipelineOutcome, run, solve};
pub use verify::{PointCheck, Verification, VerificationReport, verify};
