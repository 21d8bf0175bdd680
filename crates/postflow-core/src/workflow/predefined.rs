//! The fixed table of built-in workflow definitions.
//!
//! These four workflows cover the day-to-day content operations: one-shot
//! publishing, research-backed creation, performance analysis, and batched
//! generation with staggered publishing. They are rebuilt from this table at
//! every process start and are never loaded from, or written to, storage.

use chrono::Utc;
use postflow_types::workflow::{
    FailurePolicy, StepDefinition, WorkflowDefinition, WorkflowSource,
};
use serde_json::{Map, Value, json};

/// Ids reserved for the built-in workflows. Custom creation can never use
/// one of these, regardless of invocation order.
pub const PREDEFINED_IDS: [&str; 4] = ["publish", "create", "analyze", "batch"];

/// Build the predefined workflow table.
pub fn builtin_workflows() -> Vec<WorkflowDefinition> {
    vec![publish(), create(), analyze(), batch()]
}

fn publish() -> WorkflowDefinition {
    definition(
        "publish",
        "One-shot publish",
        "Generate a post with an image and publish it immediately",
        FailurePolicy::AbortOnError,
        vec![
            step("draft_content", "content", "generate"),
            step("render_image", "image", "generate_image"),
            step("publish_post", "publisher", "publish_post"),
            step("record_metrics", "analytics", "record_publication"),
        ],
    )
}

fn create() -> WorkflowDefinition {
    let mut publish_step = step("publish_post", "publisher", "publish_post");
    publish_step.condition = Some("user_confirmed".to_string());

    definition(
        "create",
        "Assisted creation",
        "Research the topic, draft a higher-quality post, and publish after confirmation",
        FailurePolicy::AbortOnError,
        vec![
            step("search_references", "content", "search"),
            step("survey_trending", "publisher", "search_posts"),
            step("draft_content", "content", "generate"),
            step("render_image", "image", "generate_image"),
            step("preview_post", "publisher", "preview_post"),
            publish_step,
        ],
    )
}

fn analyze() -> WorkflowDefinition {
    definition(
        "analyze",
        "Performance analysis",
        "Analyze account performance and produce optimization recommendations",
        FailurePolicy::ContinueOnError,
        vec![
            step("fetch_creator_stats", "publisher", "get_creator_info"),
            step("analyze_engagement", "analytics", "analyze_engagement"),
            step("build_report", "analytics", "generate_report"),
            step("draft_recommendations", "analytics", "get_recommendations"),
        ],
    )
}

fn batch() -> WorkflowDefinition {
    let mut generate = step("generate_batch", "content", "generate_batch");
    generate.params = params([("max_concurrent", json!(3))]);
    let mut stagger = step("stagger_publish", "scheduler", "add_job");
    stagger.params = params([("interval_minutes", json!(30))]);

    definition(
        "batch",
        "Batch operations",
        "Generate a batch of posts, quality-check them, and publish on a staggered schedule",
        FailurePolicy::ContinueOnError,
        vec![
            step("open_queue", "scheduler", "create_queue"),
            generate,
            step("quality_check", "content", "quality_check"),
            stagger,
        ],
    )
}

fn definition(
    id: &str,
    name: &str,
    description: &str,
    failure_policy: FailurePolicy,
    steps: Vec<StepDefinition>,
) -> WorkflowDefinition {
    WorkflowDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        steps,
        failure_policy,
        created_at: Utc::now(),
        source: WorkflowSource::Predefined,
    }
}

fn step(name: &str, provider: &str, tool: &str) -> StepDefinition {
    StepDefinition {
        name: name.to_string(),
        provider: provider.to_string(),
        tool: tool.to_string(),
        params: Map::new(),
        condition: None,
    }
}

fn params<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
