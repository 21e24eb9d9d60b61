//! Minimal symbolic engine used to manufacture analytic solutions.
//!
//! ```text
//! Expr ──► diff / biharmonic ──► Expr ──► lambdify() ──► Lambda
//!                                                       │
//!                                       call / on_mesh / at_points
//! ```

pub mod expr;
pub mod lambdify;

pub use expr::Expr;
pub use lambdify::Lambda;
