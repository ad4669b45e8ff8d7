//! Top-level facade crate for metricpush.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use metricpush_core::*;
}

pub mod gateway {
    pub use metricpush_gateway::*;
}
