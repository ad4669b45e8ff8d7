//! Synthetic metrics reading.

use chrono::{DateTime, Utc};

/// Exclusive upper bound for `cpu_percent`.
pub const CPU_PERCENT_LIMIT: u8 = 100;
/// Exclusive upper bound for `memory_percent`.
pub const MEMORY_PERCENT_LIMIT: u8 = 100;
/// Exclusive upper bound for `requests_per_second`.
pub const REQUESTS_PER_SECOND_LIMIT: u16 = 500;

/// One metrics reading. Immutable once produced.
///
/// `captured_at` is wall-clock based; readings from the same sampler are not
/// guaranteed to be monotonically ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsReading {
    cpu_percent: u8,
    memory_percent: u8,
    requests_per_second: u16,
    captured_at: DateTime<Utc>,
}

impl MetricsReading {
    /// Build a reading, rejecting any field outside its range.
    pub fn new(
        cpu_percent: u8,
        memory_percent: u8,
        requests_per_second: u16,
        captured_at: DateTime<Utc>,
    ) -> Option<Self> {
        if cpu_percent >= CPU_PERCENT_LIMIT
            || memory_percent >= MEMORY_PERCENT_LIMIT
            || requests_per_second >= REQUESTS_PER_SECOND_LIMIT
        {
            return None;
        }
        Some(Self {
            cpu_percent,
            memory_percent,
            requests_per_second,
            captured_at,
        })
    }

    /// Caller guarantees every field is already inside its range.
    pub(crate) fn from_bounded(
        cpu_percent: u8,
        memory_percent: u8,
        requests_per_second: u16,
        captured_at: DateTime<Utc>,
    ) -> Self {
        debug_assert!(cpu_percent < CPU_PERCENT_LIMIT);
        debug_assert!(memory_percent < MEMORY_PERCENT_LIMIT);
        debug_assert!(requests_per_second < REQUESTS_PER_SECOND_LIMIT);
        Self {
            cpu_percent,
            memory_percent,
            requests_per_second,
            captured_at,
        }
    }

    pub fn cpu_percent(&self) -> u8 {
        self.cpu_percent
    }

    pub fn memory_percent(&self) -> u8 {
        self.memory_percent
    }

    pub fn requests_per_second(&self) -> u16 {
        self.requests_per_second
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}
