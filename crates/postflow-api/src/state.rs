//! Application state wiring the engine to its infra implementations.
//!
//! The catalog and executor are generic over the store trait; AppState pins
//! them to the concrete JSON-file store and hands shared `Arc`s to both the
//! CLI commands and the REST handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use postflow_core::media::registry::ImageModelRegistry;
use postflow_core::workflow::catalog::WorkflowCatalog;
use postflow_core::workflow::dispatch::StepDispatcher;
use postflow_core::workflow::executor::WorkflowExecutor;
use postflow_infra::adapters::build_dispatcher;
use postflow_infra::config::{load_config, load_model_catalog, resolve_data_dir};
use postflow_infra::storage::workflow_store::JsonFileWorkflowStore;

/// Concrete type aliases pinned to the infra implementations.
pub type ConcreteCatalog = WorkflowCatalog<JsonFileWorkflowStore>;
pub type ConcreteExecutor = WorkflowExecutor<JsonFileWorkflowStore>;

/// Shared application state used by both CLI commands and REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ConcreteCatalog>,
    pub executor: Arc<ConcreteExecutor>,
    pub dispatcher: Arc<StepDispatcher>,
    pub models: Arc<ImageModelRegistry>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: resolve the data dir, load config,
    /// build the catalog from the store, and register the provider adapters.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir)?;

        let store = JsonFileWorkflowStore::new(&data_dir);
        let catalog = Arc::new(WorkflowCatalog::load(store).await);

        let dispatcher = Arc::new(build_dispatcher(&config.providers));
        let executor = Arc::new(
            WorkflowExecutor::new(Arc::clone(&catalog), Arc::clone(&dispatcher))
                .with_step_deadline(Duration::from_secs(config.step_deadline_secs)),
        );

        let models = Arc::new(ImageModelRegistry::new(load_model_catalog(
            &data_dir, &config,
        )));

        Ok(Self {
            catalog,
            executor,
            dispatcher,
            models,
            data_dir,
        })
    }
}
