//! Workflow orchestration engine for Postflow.
//!
//! This crate defines the engine (catalog, executor, condition evaluator,
//! dispatcher abstraction) and the "ports" (store and adapter traits) that
//! the infrastructure layer implements. It depends only on `postflow-types`
//! -- never on `postflow-infra` or any network/IO crate.

pub mod media;
pub mod repository;
pub mod workflow;
