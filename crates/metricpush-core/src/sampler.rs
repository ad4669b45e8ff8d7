//! Reading producers.
//!
//! `Sampler` is the seam sessions call once per tick. It returns `Result` so a
//! collector backed by real host data can fail per tick; the random sampler
//! never does.

use chrono::Utc;
use rand::Rng;

use crate::error::Result;
use crate::reading::{
    MetricsReading, CPU_PERCENT_LIMIT, MEMORY_PERCENT_LIMIT, REQUESTS_PER_SECOND_LIMIT,
};

/// Produces one reading per call. Calls are independent.
pub trait Sampler: Send + Sync {
    fn sample(&self) -> Result<MetricsReading>;
}

/// Uniform random readings stamped with the current UTC time.
///
/// Fields are drawn independently; there is no correlation between them.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSampler;

impl RandomSampler {
    pub fn new() -> Self {
        Self
    }

    /// Infallible draw; half-open ranges keep every field in bounds.
    pub fn draw(&self) -> MetricsReading {
        let mut rng = rand::thread_rng();
        let cpu = rng.gen_range(0..CPU_PERCENT_LIMIT);
        let memory = rng.gen_range(0..MEMORY_PERCENT_LIMIT);
        let requests = rng.gen_range(0..REQUESTS_PER_SECOND_LIMIT);
        MetricsReading::from_bounded(cpu, memory, requests, Utc::now())
    }
}

impl Sampler for RandomSampler {
    fn sample(&self) -> Result<MetricsReading> {
        Ok(self.draw())
    }
}

/// Draw one reading from the random sampler.
pub fn sample() -> MetricsReading {
    RandomSampler.draw()
}
