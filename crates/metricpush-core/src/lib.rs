//! metricpush core: transport-agnostic reading types, samplers, wire events,
//! and the shared error surface.
//!
//! This crate defines what a metrics reading is, how one is produced, and how
//! it looks on the wire. It intentionally carries no transport or runtime
//! dependencies so the gateway, tests, and client tooling can share it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `MetricPushError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod reading;
pub mod sampler;

pub use error::{MetricPushError, Result};
pub use reading::MetricsReading;
pub use sampler::{RandomSampler, Sampler};
