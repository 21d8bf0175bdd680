//! Shared domain types for Postflow.
//!
//! This crate contains the types that cross crate boundaries: workflow
//! definitions and execution records, the image-model catalog configuration,
//! and shared error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod error;
pub mod model;
pub mod workflow;
