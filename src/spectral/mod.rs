//! Spectral Galerkin discretization of the biharmonic problem.
//!
//! ```text
//!  Family ──► BiharmonicBasis (x)  ┐
//!             FourierBasis   (y)   ├──► TensorProductSpace ──► assemble() ──► BiharmonicForm
//!             FourierBasis   (z)   ┘         │                                     │
//!                                            │ inner_rhs()                         ▼
//!                                            └──────────► SpectralField ──► BiharmonicSolver
//! ```
//!
//! The x axis is `[-1, 1]` with clamped boundaries, y and z are `[0, 2π)`
//! periodic. Parallel work runs inside the pool of the [`Communicator`]
//! handed to the space.

pub mod assembly;
pub mod basis;
pub mod comm;
pub mod family;
pub mod fourier;
pub mod linalg;
pub mod solver;
pub mod space;

pub use assembly::{AssemblyForm, BiharmonicForm, FormTerm, assemble, inner_rhs};
pub use basis::BiharmonicBasis;
pub use comm::Communicator;
pub use family::Family;
pub use fourier::{FourierBasis, FourierDtype};
pub use linalg::LuFactors;
pub use solver::BiharmonicSolver;
pub use space::{LocalMesh, PhysicalField, SpectralField, TensorProductSpace};
