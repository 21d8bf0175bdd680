//! Workflow executor: the sequential step loop at the heart of the engine.
//!
//! One `execute` call resolves a definition, seeds the execution context from
//! the caller's params, and visits the steps strictly in definition order --
//! never in parallel, because step *i*'s effective params may depend on any
//! step *j* < *i*. Each dispatched step produces one [`StepResult`]; skipped
//! steps produce none. A dispatch failure only influences control flow
//! through the definition's failure policy; the sole hard failure `execute`
//! raises is an unresolvable workflow id.
//!
//! Cancellation is cooperative: `cancel` flips a token that the loop checks
//! *between* steps, so a step already dispatched always finishes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use postflow_types::workflow::{
    ExecutionRecord, ExecutionStatus, FailurePolicy, StepDefinition, StepResult, StepStatus,
    WorkflowDefinition, WorkflowSource,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::repository::workflow::WorkflowStore;

use super::catalog::WorkflowCatalog;
use super::condition::ConditionEvaluator;
use super::context::ExecutionContext;
use super::dispatch::{DispatchError, StepDispatcher};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default per-step deadline (5 minutes). Expiry flows through the same
/// success/error/abort-or-continue logic as any other dispatch failure.
pub const DEFAULT_STEP_DEADLINE_SECS: u64 = 300;

/// Workflow id used for runs synthesized from an inline step list.
pub const INLINE_WORKFLOW_ID: &str = "custom";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors `execute` can raise to the caller. Step-level dispatch errors are
/// never among them; those are captured in the execution record.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("unknown workflow: {0}")]
    UnknownWorkflow(String),
}

// ---------------------------------------------------------------------------
// ExecutionTarget
// ---------------------------------------------------------------------------

/// What to run: a cataloged definition or an ad-hoc step list.
#[derive(Debug, Clone)]
pub enum ExecutionTarget {
    /// Resolve a definition by id through the catalog.
    Workflow(String),
    /// Run an inline step list under `ContinueOnError`.
    Inline(Vec<StepDefinition>),
}

// ---------------------------------------------------------------------------
// WorkflowExecutor
// ---------------------------------------------------------------------------

/// The core state machine. Generic over the catalog's store so the API layer
/// can pin it to the concrete infra implementation.
pub struct WorkflowExecutor<S> {
    catalog: Arc<WorkflowCatalog<S>>,
    dispatcher: Arc<StepDispatcher>,
    evaluator: ConditionEvaluator,
    step_deadline: Duration,
    /// Cancellation tokens for live runs, keyed by execution id.
    live_runs: DashMap<String, CancellationToken>,
}

impl<S: WorkflowStore> WorkflowExecutor<S> {
    /// Create an executor with the default per-step deadline.
    pub fn new(catalog: Arc<WorkflowCatalog<S>>, dispatcher: Arc<StepDispatcher>) -> Self {
        Self {
            catalog,
            dispatcher,
            evaluator: ConditionEvaluator::new(),
            step_deadline: Duration::from_secs(DEFAULT_STEP_DEADLINE_SECS),
            live_runs: DashMap::new(),
        }
    }

    /// Override the per-step deadline.
    pub fn with_step_deadline(mut self, deadline: Duration) -> Self {
        self.step_deadline = deadline;
        self
    }

    /// Access the condition evaluator, e.g. to register named predicates at
    /// wiring time.
    pub fn evaluator_mut(&mut self) -> &mut ConditionEvaluator {
        &mut self.evaluator
    }

    /// Execute a workflow and return its record.
    ///
    /// Raises only [`ExecutorError::UnknownWorkflow`]; every step-level
    /// outcome, including dispatch errors and deadline expiry, is captured
    /// in the returned record.
    pub async fn execute(
        &self,
        target: ExecutionTarget,
        initial_params: Map<String, Value>,
    ) -> Result<ExecutionRecord, ExecutorError> {
        let definition = self.resolve(target).await?;
        let execution_id = format!("{}-{}", definition.id, Uuid::now_v7());
        let started_at = Utc::now();

        let cancel_token = CancellationToken::new();
        self.live_runs
            .insert(execution_id.clone(), cancel_token.clone());

        tracing::info!(
            execution_id = execution_id.as_str(),
            workflow = definition.id.as_str(),
            steps = definition.steps.len(),
            "starting workflow execution"
        );

        let mut ctx = ExecutionContext::new(initial_params);
        let mut results: Vec<StepResult> = Vec::new();
        let mut status = ExecutionStatus::Completed;

        for step in &definition.steps {
            if cancel_token.is_cancelled() {
                tracing::info!(
                    execution_id = execution_id.as_str(),
                    "cancellation observed between steps"
                );
                status = ExecutionStatus::Aborted;
                break;
            }

            if let Some(condition) = &step.condition {
                if !self.evaluator.evaluate(condition, &ctx) {
                    tracing::debug!(
                        execution_id = execution_id.as_str(),
                        step = step.name.as_str(),
                        condition = condition.as_str(),
                        "condition not met, skipping step"
                    );
                    continue;
                }
            }

            let effective = ctx.effective_params(&step.params);
            let dispatched = tokio::time::timeout(
                self.step_deadline,
                self.dispatcher
                    .dispatch(&step.provider, &step.tool, &effective),
            )
            .await;

            let failed = match dispatched {
                Ok(Ok(payload)) => {
                    ctx.merge_payload(&step.name, &payload);
                    results.push(StepResult::success(&step.name, payload));
                    false
                }
                Ok(Err(err)) => {
                    tracing::warn!(
                        execution_id = execution_id.as_str(),
                        step = step.name.as_str(),
                        error = %err,
                        "step dispatch failed"
                    );
                    results.push(StepResult::error(&step.name, err.to_string()));
                    true
                }
                Err(_elapsed) => {
                    let err = DispatchError::Timeout {
                        provider: step.provider.clone(),
                        tool: step.tool.clone(),
                    };
                    tracing::warn!(
                        execution_id = execution_id.as_str(),
                        step = step.name.as_str(),
                        deadline_secs = self.step_deadline.as_secs(),
                        "step deadline expired"
                    );
                    results.push(StepResult::error(&step.name, err.to_string()));
                    true
                }
            };

            if failed && definition.failure_policy == FailurePolicy::AbortOnError {
                status = ExecutionStatus::Aborted;
                break;
            }
        }

        self.live_runs.remove(&execution_id);

        let steps_completed = results
            .iter()
            .filter(|r| r.status == StepStatus::Success)
            .count();

        tracing::info!(
            execution_id = execution_id.as_str(),
            status = ?status,
            steps_completed,
            steps_total = definition.steps.len(),
            "workflow execution finished"
        );

        Ok(ExecutionRecord {
            execution_id,
            workflow_id: definition.id,
            steps_total: definition.steps.len(),
            steps_completed,
            results,
            status,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Request cooperative cancellation of a live run. Returns `false` when
    /// no run with this execution id is live.
    pub fn cancel(&self, execution_id: &str) -> bool {
        match self.live_runs.get(execution_id) {
            Some(token) => {
                token.cancel();
                tracing::info!(execution_id, "cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Execution ids of currently live runs.
    pub fn live_executions(&self) -> Vec<String> {
        self.live_runs.iter().map(|e| e.key().clone()).collect()
    }

    async fn resolve(&self, target: ExecutionTarget) -> Result<WorkflowDefinition, ExecutorError> {
        match target {
            ExecutionTarget::Workflow(id) => self
                .catalog
                .lookup(&id)
                .await
                .ok_or(ExecutorError::UnknownWorkflow(id)),
            ExecutionTarget::Inline(steps) => Ok(WorkflowDefinition {
                id: INLINE_WORKFLOW_ID.to_string(),
                name: "Inline steps".to_string(),
                description: String::new(),
                steps,
                failure_policy: FailurePolicy::ContinueOnError,
                created_at: Utc::now(),
                source: WorkflowSource::Custom,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
