//! Workflow draft parsing and validation.
//!
//! Callers author custom workflows as YAML or JSON documents. A
//! [`WorkflowDraft`] is the caller-supplied shape before the catalog stamps
//! it with a creation time and source; `validate_draft` enforces the
//! structural constraints every definition must satisfy.

use postflow_types::workflow::{FailurePolicy, StepDefinition};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from parsing or validating a workflow draft.
#[derive(Debug, Error)]
pub enum DraftError {
    /// YAML/JSON parse failure.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Structural validation failure.
    #[error("validation error: {0}")]
    ValidationError(String),
}

// ---------------------------------------------------------------------------
// WorkflowDraft
// ---------------------------------------------------------------------------

/// A caller-authored workflow before catalog insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDraft {
    /// Requested workflow id. Must not collide with any existing id.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Ordered steps.
    pub steps: Vec<StepDefinition>,
    /// Failure policy; omitted drafts run under `ContinueOnError`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_policy: Option<FailurePolicy>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a YAML document into a validated draft.
pub fn parse_draft_yaml(yaml: &str) -> Result<WorkflowDraft, DraftError> {
    let draft: WorkflowDraft =
        serde_yaml_ng::from_str(yaml).map_err(|e| DraftError::ParseError(e.to_string()))?;
    validate_draft(&draft)?;
    Ok(draft)
}

/// Parse a JSON document into a validated draft.
pub fn parse_draft_json(json: &str) -> Result<WorkflowDraft, DraftError> {
    let draft: WorkflowDraft =
        serde_json::from_str(json).map_err(|e| DraftError::ParseError(e.to_string()))?;
    validate_draft(&draft)?;
    Ok(draft)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate structural constraints on a draft.
///
/// Checks:
/// - Id is non-empty, alphanumeric plus hyphens and underscores
/// - Name is non-empty
/// - At least one step exists
/// - Step names are non-empty and unique
/// - Every step has a non-empty provider and tool
pub fn validate_draft(draft: &WorkflowDraft) -> Result<(), DraftError> {
    if draft.id.is_empty() {
        return Err(DraftError::ValidationError(
            "workflow id must not be empty".to_string(),
        ));
    }
    if !draft
        .id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DraftError::ValidationError(format!(
            "workflow id '{}' contains invalid characters (only alphanumeric, hyphens, and underscores allowed)",
            draft.id
        )));
    }

    if draft.name.is_empty() {
        return Err(DraftError::ValidationError(
            "workflow name must not be empty".to_string(),
        ));
    }

    if draft.steps.is_empty() {
        return Err(DraftError::ValidationError(
            "workflow must have at least one step".to_string(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for step in &draft.steps {
        if step.name.is_empty() {
            return Err(DraftError::ValidationError(
                "step name must not be empty".to_string(),
            ));
        }
        if !seen.insert(step.name.as_str()) {
            return Err(DraftError::ValidationError(format!(
                "duplicate step name: '{}'",
                step.name
            )));
        }
        if step.provider.is_empty() || step.tool.is_empty() {
            return Err(DraftError::ValidationError(format!(
                "step '{}' must name a provider and a tool",
                step.name
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn step(name: &str) -> StepDefinition {
        StepDefinition {
            name: name.to_string(),
            provider: "content".to_string(),
            tool: "generate".to_string(),
            params: Map::new(),
            condition: None,
        }
    }

    fn draft(id: &str, steps: Vec<StepDefinition>) -> WorkflowDraft {
        WorkflowDraft {
            id: id.to_string(),
            name: "Test".to_string(),
            description: String::new(),
            steps,
            failure_policy: None,
        }
    }

    // -----------------------------------------------------------------------
    // YAML parsing
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_yaml_draft() {
        let yaml = r#"
id: evening-digest
name: Evening Digest
description: Summarize the day's posts and schedule tomorrow's
failure_policy: abort_on_error
steps:
  - name: summarize
    provider: analytics
    tool: generate_report
  - name: schedule
    provider: scheduler
    tool: add_job
    params:
      interval_minutes: 30
    condition: report_ready
"#;
        let draft = parse_draft_yaml(yaml).expect("should parse");
        assert_eq!(draft.id, "evening-digest");
        assert_eq!(draft.steps.len(), 2);
        assert_eq!(draft.failure_policy, Some(FailurePolicy::AbortOnError));
        assert_eq!(draft.steps[1].condition.as_deref(), Some("report_ready"));
        assert_eq!(
            draft.steps[1].params["interval_minutes"],
            serde_json::json!(30)
        );
    }

    #[test]
    fn test_parse_json_draft() {
        let json = r#"{
            "id": "reshare",
            "name": "Reshare",
            "steps": [
                {"name": "pick", "provider": "analytics", "tool": "top_posts"}
            ]
        }"#;
        let draft = parse_draft_json(json).expect("should parse");
        assert_eq!(draft.id, "reshare");
        assert!(draft.failure_policy.is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_draft_yaml(": :"),
            Err(DraftError::ParseError(_))
        ));
        assert!(matches!(
            parse_draft_json("{nope}"),
            Err(DraftError::ParseError(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn test_validation_rejects_empty_id() {
        let err = validate_draft(&draft("", vec![step("a")])).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_validation_rejects_invalid_id_characters() {
        let err = validate_draft(&draft("has spaces!", vec![step("a")])).unwrap_err();
        assert!(err.to_string().contains("invalid characters"));
    }

    #[test]
    fn test_validation_rejects_empty_steps() {
        let err = validate_draft(&draft("ok-id", vec![])).unwrap_err();
        assert!(err.to_string().contains("at least one step"));
    }

    #[test]
    fn test_validation_rejects_duplicate_step_names() {
        let err = validate_draft(&draft("ok-id", vec![step("a"), step("a")])).unwrap_err();
        assert!(err.to_string().contains("duplicate step name"));
    }

    #[test]
    fn test_validation_rejects_missing_provider() {
        let mut bad = step("a");
        bad.provider = String::new();
        let err = validate_draft(&draft("ok-id", vec![bad])).unwrap_err();
        assert!(err.to_string().contains("provider and a tool"));
    }

    #[test]
    fn test_underscores_allowed_in_id() {
        assert!(validate_draft(&draft("my_flow-2", vec![step("a")])).is_ok());
    }
}
