//! Observability setup for Postflow.

pub mod tracing_setup;
