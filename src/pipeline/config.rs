use anyhow::{Result, ensure};
use ndarray as nd;
use serde::{Deserialize, Serialize};

use crate::spectral::{AssemblyForm, Family};

/// Grid used by the reference run.
pub const DEFAULT_SHAPE: [usize; 3] = [36, 36, 36];

/// Default tolerance of both accuracy checks. A resolved 36³ run reaches
/// errors below `1e-12`.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Values given on the command line, applied on top of a base config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub family: Option<Family>,
    /// Grid size as `[N0, N1, N2]`; any other length is rejected.
    pub shape: Option<Vec<usize>>,
    pub form: Option<AssemblyForm>,
    pub threads: Option<usize>,
    pub no_plot: bool,
}

/// Inputs of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub family: Family,
    pub shape: [usize; 3],
    /// Assembly form, or the family default when `None`.
    pub form: Option<AssemblyForm>,
    pub grid_tolerance: f64,
    pub point_tolerance: f64,
    /// Off-grid check points as `(x, y, z)` triples.
    pub points: Vec<[f64; 3]>,
    /// Worker threads, or one per core when `None`.
    pub threads: Option<usize>,
    /// Index along z of the plotted slice.
    pub plot_slice: usize,
    pub plot: bool,
}

impl PipelineConfig {
    pub fn new(family: Family) -> Self {
        Self {
            family,
            ..Self::default()
        }
    }

    /// Assembly form of the run.
    pub fn form(&self) -> AssemblyForm {
        self.form.unwrap_or_else(|| self.family.default_form())
    }

    /// Applies `overrides` and validates the result.
    pub fn merge(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(family) = overrides.family {
            self.family = family;
        }
        if let Some(shape) = overrides.shape {
            ensure!(shape.len() == 3, "shape expects N0,N1,N2, got {:?}", shape);
            self.shape = [shape[0], shape[1], shape[2]];
        }
        if overrides.form.is_some() {
            self.form = overrides.form;
        }
        if overrides.threads.is_some() {
            self.threads = overrides.threads;
        }
        if overrides.no_plot {
            self.plot = false;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks settings that would only fail after the solve.
    ///
    /// The plotted slice must exist along z when plotting is enabled.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.plot || self.plot_slice < self.shape[2],
            "plot slice {} out of range for N2 = {} (pass --no-plot or a larger grid)",
            self.plot_slice,
            self.shape[2]
        );
        Ok(())
    }

    /// Check points as a `(3, n)` array, one point per column.
    pub fn points_array(&self) -> nd::Array2<f64> {
        nd::Array2::from_shape_fn((3, self.points.len()), |(axis, p)| self.points[p][axis])
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            family: Family::Chebyshev,
            shape: DEFAULT_SHAPE,
            form: None,
            grid_tolerance: DEFAULT_TOLERANCE,
            point_tolerance: DEFAULT_TOLERANCE,
            points: vec![[0.2, 0.1, 0.3], [0.3, 0.5, 0.6]],
            threads: None,
            plot_slice: 8,
            plot: true,
        }
    }
}
