use tracing::debug;

use crate::error::{Error, Result};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where animation parameters are computed, away from the render loop.
pub trait Executor {
    fn spawn(&self, job: Job);
}

/// Rayon thread pool dedicated to parameter computation.
pub struct BackgroundExecutor {
    pool: rayon::ThreadPool,
}

impl BackgroundExecutor {
    /// `None` uses rayon's default thread count.
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|index| format!("kenburns-compute-{index}"));
        if let Some(threads) = threads {
            builder = builder.num_threads(threads.max(1));
        }
        let pool = builder
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;
        debug!(threads = pool.current_num_threads(), "background executor ready");
        Ok(Self { pool })
    }
}

impl Executor for BackgroundExecutor {
    fn spawn(&self, job: Job) {
        self.pool.spawn(job);
    }
}

/// Runs jobs immediately on the calling thread. Deterministic, for tests
/// and single-threaded hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn spawn(&self, job: Job) {
        job()
    }
}
