//! Workflow catalog: the owned registry of predefined and custom definitions.
//!
//! Predefined definitions are rebuilt from the fixed in-process table at
//! startup; custom definitions are loaded from the store and kept in memory
//! behind an RwLock. Reads (`lookup`, `list`) are safe for concurrent
//! callers; `create` is the only write path and is serialized by the write
//! lock. A persisted custom definition whose id collides with a predefined id
//! is skipped at load time: predefined always wins.

use chrono::Utc;
use postflow_types::workflow::{
    WorkflowDefinition, WorkflowFilter, WorkflowSource,
};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::repository::workflow::WorkflowStore;

use super::definition::{DraftError, WorkflowDraft, validate_draft};
use super::predefined::{PREDEFINED_IDS, builtin_workflows};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from catalog mutation.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The requested id already exists in the predefined or custom set.
    #[error("workflow id '{0}' already exists")]
    DuplicateWorkflow(String),

    /// The draft failed structural validation.
    #[error(transparent)]
    Invalid(#[from] DraftError),
}

// ---------------------------------------------------------------------------
// WorkflowCatalog
// ---------------------------------------------------------------------------

/// Registry of workflow definitions, generic over the custom-workflow store.
pub struct WorkflowCatalog<S> {
    predefined: Vec<WorkflowDefinition>,
    custom: RwLock<Vec<WorkflowDefinition>>,
    store: S,
}

impl<S: WorkflowStore> WorkflowCatalog<S> {
    /// Build the catalog: predefined table first, then persisted custom
    /// definitions. Load failures leave the custom set empty rather than
    /// failing startup; collisions with predefined ids are dropped.
    pub async fn load(store: S) -> Self {
        let predefined = builtin_workflows();

        let mut custom = match store.load_custom_workflows().await {
            Ok(defs) => defs,
            Err(err) => {
                tracing::error!(error = %err, "failed to load custom workflows, starting empty");
                Vec::new()
            }
        };

        custom.retain(|def| {
            if PREDEFINED_IDS.contains(&def.id.as_str()) {
                tracing::warn!(
                    workflow = def.id.as_str(),
                    "persisted workflow collides with a predefined id, skipping"
                );
                false
            } else {
                true
            }
        });
        custom.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        tracing::info!(
            predefined = predefined.len(),
            custom = custom.len(),
            "workflow catalog loaded"
        );

        Self {
            predefined,
            custom: RwLock::new(custom),
            store,
        }
    }

    /// Look up a definition by id.
    pub async fn lookup(&self, id: &str) -> Option<WorkflowDefinition> {
        if let Some(def) = self.predefined.iter().find(|d| d.id == id) {
            return Some(def.clone());
        }
        self.custom
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    /// List definitions: predefined entries in table order, then custom
    /// entries by creation time.
    pub async fn list(&self, filter: WorkflowFilter) -> Vec<WorkflowDefinition> {
        let mut out = Vec::new();
        if matches!(filter, WorkflowFilter::All | WorkflowFilter::Predefined) {
            out.extend(self.predefined.iter().cloned());
        }
        if matches!(filter, WorkflowFilter::All | WorkflowFilter::Custom) {
            out.extend(self.custom.read().await.iter().cloned());
        }
        out
    }

    /// Create a custom workflow from a validated draft.
    ///
    /// The new definition is added to the in-memory custom set and persisted
    /// through the store. A persistence failure is logged but does not undo
    /// the in-memory addition: the definition is usable immediately and will
    /// be re-persisted on the next successful save.
    pub async fn create(&self, draft: WorkflowDraft) -> Result<WorkflowDefinition, CatalogError> {
        validate_draft(&draft)?;

        let mut custom = self.custom.write().await;

        let taken = self.predefined.iter().any(|d| d.id == draft.id)
            || custom.iter().any(|d| d.id == draft.id);
        if taken {
            return Err(CatalogError::DuplicateWorkflow(draft.id));
        }

        let def = WorkflowDefinition {
            id: draft.id,
            name: draft.name,
            description: draft.description,
            steps: draft.steps,
            failure_policy: draft.failure_policy.unwrap_or_default(),
            created_at: Utc::now(),
            source: WorkflowSource::Custom,
        };

        custom.push(def.clone());
        if let Err(err) = self.store.save_custom_workflows(&custom).await {
            tracing::error!(
                workflow = def.id.as_str(),
                error = %err,
                "failed to persist custom workflows, definition remains registered in memory"
            );
        } else {
            tracing::info!(workflow = def.id.as_str(), "custom workflow created");
        }

        Ok(def)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use postflow_types::workflow::{FailurePolicy, StepDefinition};
    use serde_json::Map;

    use crate::workflow::testing::{FailingStore, MemoryStore};

    fn step(name: &str) -> StepDefinition {
        StepDefinition {
            name: name.to_string(),
            provider: "content".to_string(),
            tool: "generate".to_string(),
            params: Map::new(),
            condition: None,
        }
    }

    fn draft(id: &str) -> WorkflowDraft {
        WorkflowDraft {
            id: id.to_string(),
            name: format!("Workflow {id}"),
            description: String::new(),
            steps: vec![step("only")],
            failure_policy: None,
        }
    }

    fn custom_def(id: &str) -> WorkflowDefinition {
        WorkflowDefinition {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            steps: vec![step("only")],
            failure_policy: FailurePolicy::ContinueOnError,
            created_at: Utc::now(),
            source: WorkflowSource::Custom,
        }
    }

    // -----------------------------------------------------------------------
    // Startup
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_load_populates_predefined_table() {
        let catalog = WorkflowCatalog::load(MemoryStore::default()).await;
        for id in PREDEFINED_IDS {
            let def = catalog.lookup(id).await.expect("predefined id present");
            assert_eq!(def.source, WorkflowSource::Predefined);
        }
    }

    #[tokio::test]
    async fn test_load_skips_persisted_predefined_collision() {
        let store =
            MemoryStore::with_preload(vec![custom_def("publish"), custom_def("my-flow")]);
        let catalog = WorkflowCatalog::load(store).await;

        // The collision was dropped: "publish" resolves to the predefined entry
        let publish = catalog.lookup("publish").await.unwrap();
        assert_eq!(publish.source, WorkflowSource::Predefined);

        let customs = catalog.list(WorkflowFilter::Custom).await;
        let ids: Vec<&str> = customs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["my-flow"]);
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_registers_and_persists() {
        let catalog = WorkflowCatalog::load(MemoryStore::default()).await;
        let def = catalog.create(draft("evening-digest")).await.unwrap();
        assert_eq!(def.source, WorkflowSource::Custom);
        assert_eq!(def.failure_policy, FailurePolicy::ContinueOnError);

        let saves = catalog.store.saved.lock().unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0][0].id, "evening-digest");
    }

    #[tokio::test]
    async fn test_create_rejects_predefined_id() {
        let catalog = WorkflowCatalog::load(MemoryStore::default()).await;
        // Regardless of invocation order relative to other custom creations
        catalog.create(draft("first")).await.unwrap();
        let err = catalog.create(draft("publish")).await.unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateWorkflow(id) if id == "publish"));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_custom_id() {
        let catalog = WorkflowCatalog::load(MemoryStore::default()).await;
        catalog.create(draft("my-flow")).await.unwrap();
        let err = catalog.create(draft("my-flow")).await.unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateWorkflow(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_draft() {
        let catalog = WorkflowCatalog::load(MemoryStore::default()).await;
        let mut bad = draft("ok-id");
        bad.steps.clear();
        let err = catalog.create(bad).await.unwrap_err();
        assert!(matches!(err, CatalogError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_create_survives_persistence_failure() {
        let catalog = WorkflowCatalog::load(FailingStore).await;
        let def = catalog.create(draft("my-flow")).await.unwrap();
        assert_eq!(def.id, "my-flow");

        // Still resolvable despite the failed save
        assert!(catalog.lookup("my-flow").await.is_some());
    }

    // -----------------------------------------------------------------------
    // List
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_list_custom_round_trip() {
        let catalog = WorkflowCatalog::load(MemoryStore::default()).await;
        catalog.create(draft("alpha")).await.unwrap();
        catalog.create(draft("beta")).await.unwrap();

        let customs = catalog.list(WorkflowFilter::Custom).await;
        let ids: Vec<&str> = customs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "beta"]);
        assert!(ids.iter().all(|id| !PREDEFINED_IDS.contains(id)));
    }

    #[tokio::test]
    async fn test_list_all_orders_predefined_first() {
        let catalog = WorkflowCatalog::load(MemoryStore::default()).await;
        catalog.create(draft("alpha")).await.unwrap();

        let all = catalog.list(WorkflowFilter::All).await;
        let ids: Vec<&str> = all.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["publish", "create", "analyze", "batch", "alpha"]);

        let predefined = catalog.list(WorkflowFilter::Predefined).await;
        assert_eq!(predefined.len(), 4);
    }
}
