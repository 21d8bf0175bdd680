//! JSON-file implementation of the custom-workflow store.
//!
//! The full custom set lives in one JSON document under the data dir.
//! Saves go through a temp file followed by a rename so a crash mid-write
//! never leaves a half-written catalog behind.

use std::path::{Path, PathBuf};

use postflow_core::repository::workflow::WorkflowStore;
use postflow_types::error::StoreError;
use postflow_types::workflow::WorkflowDefinition;

/// File-backed [`WorkflowStore`].
pub struct JsonFileWorkflowStore {
    path: PathBuf,
}

impl JsonFileWorkflowStore {
    /// Default file name under the data dir.
    pub const FILE_NAME: &'static str = "workflows.json";

    /// Store at the conventional location under `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(Self::FILE_NAME),
        }
    }

    /// Store at an explicit path.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkflowStore for JsonFileWorkflowStore {
    async fn load_custom_workflows(&self) -> Result<Vec<WorkflowDefinition>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        let workflows: Vec<WorkflowDefinition> = serde_json::from_str(&content)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        tracing::debug!(
            path = %self.path.display(),
            count = workflows.len(),
            "custom workflows loaded"
        );
        Ok(workflows)
    }

    async fn save_custom_workflows(
        &self,
        workflows: &[WorkflowDefinition],
    ) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(workflows)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(
            path = %self.path.display(),
            count = workflows.len(),
            "custom workflows saved"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
