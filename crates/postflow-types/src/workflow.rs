//! Workflow domain types for Postflow.
//!
//! Defines the canonical representation for workflows: an ordered list of
//! steps, each targeting a (provider, tool) pair, plus the failure policy
//! that governs what happens when a step errors. Execution outcome types
//! (`ExecutionRecord`, `StepResult`) live here too so that both the engine
//! and the API layer can speak them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Workflow Definition
// ---------------------------------------------------------------------------

/// A named, ordered list of steps plus a failure policy.
///
/// Step order is significant and immutable once stored: step *i* may depend
/// on the output of any step *j* < *i* through the execution context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Unique workflow id across the predefined and custom sets combined.
    pub id: String,
    /// Human-readable workflow name.
    pub name: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Ordered steps executed front to back.
    pub steps: Vec<StepDefinition>,
    /// What a step failure does to the rest of the run.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// When this definition was created.
    pub created_at: DateTime<Utc>,
    /// Whether this definition came from the built-in table or a caller.
    #[serde(default)]
    pub source: WorkflowSource,
}

/// One unit of work targeting a (provider, tool) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Step name, unique within its workflow.
    pub name: String,
    /// Provider addressed by name (e.g. "content", "publisher").
    pub provider: String,
    /// Tool exposed by that provider (e.g. "generate", "publish_post").
    pub tool: String,
    /// Static parameters merged under the execution context at dispatch time.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
    /// Optional flag name gating whether this step runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Governs whether a step failure halts the remaining run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// A failed step stops iteration; remaining steps get no result entry.
    AbortOnError,
    /// A failed step is recorded and the run moves on.
    #[default]
    ContinueOnError,
}

/// Where a definition came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowSource {
    /// Built from the fixed in-process table at startup; never persisted.
    Predefined,
    /// Created via the API and persisted through the workflow store.
    #[default]
    Custom,
}

/// Filter for workflow listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowFilter {
    #[default]
    All,
    Predefined,
    Custom,
}

impl std::str::FromStr for WorkflowFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(WorkflowFilter::All),
            "predefined" => Ok(WorkflowFilter::Predefined),
            "custom" => Ok(WorkflowFilter::Custom),
            other => Err(format!(
                "unknown filter '{other}' (expected all, predefined, or custom)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Execution outcome types
// ---------------------------------------------------------------------------

/// Status of a single dispatched step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Error,
}

/// Outcome of one dispatched step. Skipped steps produce no entry at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Name of the step this result belongs to.
    pub step_name: String,
    /// Success or error.
    pub status: StepStatus,
    /// Payload returned by the provider on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Error message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    /// Build a success result carrying the provider payload.
    pub fn success(step_name: impl Into<String>, payload: Value) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Success,
            payload: Some(payload),
            error: None,
        }
    }

    /// Build an error result carrying the dispatch error message.
    pub fn error(step_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Error,
            payload: None,
            error: Some(message.into()),
        }
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Every step was visited (dispatched or skipped).
    Completed,
    /// A failure under `AbortOnError`, or a cancellation, cut the run short.
    Aborted,
}

/// The immutable outcome summary of one run.
///
/// `steps_total` counts every defined step including skipped ones;
/// `steps_completed` counts only success-status results. `results` holds one
/// entry per *dispatched* step in visit order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Unique per run: workflow id plus a time-sortable suffix.
    pub execution_id: String,
    /// Id of the workflow that was executed.
    pub workflow_id: String,
    /// Number of steps in the definition.
    pub steps_total: usize,
    /// Number of steps that dispatched successfully.
    pub steps_completed: usize,
    /// Per-step outcomes in visit order; skipped steps are absent.
    pub results: Vec<StepResult>,
    /// Overall run status.
    pub status: ExecutionStatus,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_definition() -> WorkflowDefinition {
        WorkflowDefinition {
            id: "weekly-roundup".to_string(),
            name: "Weekly Roundup".to_string(),
            description: "Generate and publish the weekly roundup post".to_string(),
            steps: vec![
                StepDefinition {
                    name: "draft".to_string(),
                    provider: "content".to_string(),
                    tool: "generate".to_string(),
                    params: Map::from_iter([("topic".to_string(), json!("roundup"))]),
                    condition: None,
                },
                StepDefinition {
                    name: "publish".to_string(),
                    provider: "publisher".to_string(),
                    tool: "publish_post".to_string(),
                    params: Map::new(),
                    condition: Some("approved".to_string()),
                },
            ],
            failure_policy: FailurePolicy::AbortOnError,
            created_at: Utc::now(),
            source: WorkflowSource::Custom,
        }
    }

    // -----------------------------------------------------------------------
    // Serde roundtrips
    // -----------------------------------------------------------------------

    #[test]
    fn test_definition_json_roundtrip() {
        let def = sample_definition();
        let json_str = serde_json::to_string_pretty(&def).unwrap();
        let parsed: WorkflowDefinition = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.id, "weekly-roundup");
        assert_eq!(parsed.steps.len(), 2);
        assert_eq!(parsed.failure_policy, FailurePolicy::AbortOnError);
        assert_eq!(parsed.steps[1].condition.as_deref(), Some("approved"));
    }

    #[test]
    fn test_definition_yaml_roundtrip() {
        let def = sample_definition();
        let yaml = serde_yaml_ng::to_string(&def).unwrap();
        assert!(yaml.contains("weekly-roundup"));
        assert!(yaml.contains("abort_on_error"));
        let parsed: WorkflowDefinition = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed.steps[0].provider, "content");
        assert_eq!(parsed.steps[0].params["topic"], json!("roundup"));
    }

    #[test]
    fn test_failure_policy_defaults_to_continue() {
        let yaml = r#"
id: minimal
name: Minimal
steps:
  - name: only
    provider: content
    tool: generate
created_at: "2026-01-10T09:00:00Z"
"#;
        let def: WorkflowDefinition = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(def.failure_policy, FailurePolicy::ContinueOnError);
        assert_eq!(def.source, WorkflowSource::Custom);
        assert!(def.steps[0].params.is_empty());
    }

    // -----------------------------------------------------------------------
    // Step results
    // -----------------------------------------------------------------------

    #[test]
    fn test_step_result_constructors() {
        let ok = StepResult::success("draft", json!({"title": "Hello"}));
        assert_eq!(ok.status, StepStatus::Success);
        assert_eq!(ok.payload.unwrap()["title"], json!("Hello"));
        assert!(ok.error.is_none());

        let err = StepResult::error("publish", "service unavailable");
        assert_eq!(err.status, StepStatus::Error);
        assert!(err.payload.is_none());
        assert_eq!(err.error.as_deref(), Some("service unavailable"));
    }

    #[test]
    fn test_execution_record_json_roundtrip() {
        let record = ExecutionRecord {
            execution_id: "publish-0193".to_string(),
            workflow_id: "publish".to_string(),
            steps_total: 4,
            steps_completed: 2,
            results: vec![
                StepResult::success("draft", json!({"title": "t"})),
                StepResult::error("publish", "boom"),
            ],
            status: ExecutionStatus::Aborted,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        let json_str = serde_json::to_string(&record).unwrap();
        let parsed: ExecutionRecord = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.steps_total, 4);
        assert_eq!(parsed.steps_completed, 2);
        assert_eq!(parsed.status, ExecutionStatus::Aborted);
        assert_eq!(parsed.results.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Filter parsing
    // -----------------------------------------------------------------------

    #[test]
    fn test_workflow_filter_from_str() {
        assert_eq!("all".parse::<WorkflowFilter>().unwrap(), WorkflowFilter::All);
        assert_eq!(
            "predefined".parse::<WorkflowFilter>().unwrap(),
            WorkflowFilter::Predefined
        );
        assert_eq!(
            "custom".parse::<WorkflowFilter>().unwrap(),
            WorkflowFilter::Custom
        );
        assert!("weekly".parse::<WorkflowFilter>().is_err());
    }
}
