//! Custom-workflow store trait definition.
//!
//! The catalog persists only the custom subset through this interface;
//! predefined definitions never pass through it. The infrastructure layer
//! (postflow-infra) implements it with a JSON file under the data dir.
//!
//! Uses native async fn in traits (Rust 2024 edition, no async_trait macro).

use postflow_types::error::StoreError;
use postflow_types::workflow::WorkflowDefinition;

/// Load/save contract for the custom workflow set.
pub trait WorkflowStore: Send + Sync {
    /// Load all persisted custom workflow definitions.
    fn load_custom_workflows(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<WorkflowDefinition>, StoreError>> + Send;

    /// Persist the full custom workflow set, replacing the previous contents.
    fn save_custom_workflows(
        &self,
        workflows: &[WorkflowDefinition],
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
