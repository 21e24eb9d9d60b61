use std::fmt;
use std::sync::Arc;

use crate::error::SpectralResult;

/// Execution context handed to the tensor-product space.
///
/// Owns the worker pool used for the data-parallel parts of a run (grid
/// evaluation, per-mode factorization and solves). Create it once per run
/// and pass it to [`super::TensorProductSpace::new`]; clones share the pool,
/// which is released when the last clone is dropped.
///
/// A single process owns the whole grid, so the local mesh of a space is
/// always the global mesh.
#[derive(Clone)]
pub struct Communicator {
    pool: Arc<rayon::ThreadPool>,
}

impl fmt::Debug for Communicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Communicator")
            .field("threads", &self.threads())
            .finish()
    }
}

impl Communicator {
    /// Context using one worker per available core.
    pub fn world() -> SpectralResult<Self> {
        Self::with_threads(0)
    }

    /// Context with `threads` workers (`0` picks the rayon default).
    pub fn with_threads(threads: usize) -> SpectralResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("biharmonic3d-{i}"))
            .build()?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `op` inside the worker pool.
    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}
