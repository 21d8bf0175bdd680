//! Test-only store stubs shared by catalog and executor tests.

use std::sync::Mutex;

use postflow_types::error::StoreError;
use postflow_types::workflow::WorkflowDefinition;

use crate::repository::workflow::WorkflowStore;

/// In-memory store: serves `preload` on load, records every save.
#[derive(Default)]
pub(crate) struct MemoryStore {
    pub preload: Vec<WorkflowDefinition>,
    pub saved: Mutex<Vec<Vec<WorkflowDefinition>>>,
}

impl MemoryStore {
    pub fn with_preload(preload: Vec<WorkflowDefinition>) -> Self {
        Self {
            preload,
            saved: Mutex::new(Vec::new()),
        }
    }
}

impl WorkflowStore for MemoryStore {
    async fn load_custom_workflows(&self) -> Result<Vec<WorkflowDefinition>, StoreError> {
        Ok(self.preload.clone())
    }

    async fn save_custom_workflows(
        &self,
        workflows: &[WorkflowDefinition],
    ) -> Result<(), StoreError> {
        self.saved.lock().unwrap().push(workflows.to_vec());
        Ok(())
    }
}

/// Store whose saves always fail, for the durability-tradeoff tests.
#[derive(Default)]
pub(crate) struct FailingStore;

impl WorkflowStore for FailingStore {
    async fn load_custom_workflows(&self) -> Result<Vec<WorkflowDefinition>, StoreError> {
        Ok(Vec::new())
    }

    async fn save_custom_workflows(
        &self,
        _workflows: &[WorkflowDefinition],
    ) -> Result<(), StoreError> {
        Err(StoreError::Serialization("disk full".to_string()))
    }
}
