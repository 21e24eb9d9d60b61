//! Optional visualization of a solved run in a Rerun viewer.

pub mod config;
pub mod rerun;

pub use config::PlotConfig;
pub use rerun::{plot_outcome, plot_slice, start_session};

/// Environment variables that mark an automated run.
pub const HEADLESS_VARS: [&str; 2] = ["CI", "BIHARMONIC3D_HEADLESS"];

/// Whether plotting must be skipped because no viewer can be shown.
pub fn headless() -> bool {
    headless_with(|name| std::env::var_os(name))
}

fn headless_with<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<std::ffi::OsString>,
{
    HEADLESS_VARS
        .iter()
        .any(|name| lookup(name).is_some_and(|v| !v.is_empty() && v != "0"))
}
