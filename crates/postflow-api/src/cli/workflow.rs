//! CLI workflow commands: execute, create, list, show.

use std::path::Path;

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde_json::{Map, Value};

use postflow_core::workflow::definition::{parse_draft_json, parse_draft_yaml};
use postflow_core::workflow::executor::ExecutionTarget;
use postflow_types::workflow::{
    ExecutionRecord, ExecutionStatus, FailurePolicy, StepStatus, WorkflowFilter,
};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Execute
// ---------------------------------------------------------------------------

/// Run a workflow by id and render its execution record.
pub async fn execute_workflow(
    state: &AppState,
    workflow: &str,
    params_raw: Option<&str>,
    json: bool,
) -> Result<()> {
    let params = parse_params(params_raw)?;

    let record = state
        .executor
        .execute(ExecutionTarget::Workflow(workflow.to_string()), params)
        .await
        .with_context(|| format!("Failed to execute workflow '{workflow}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_record(&record);
    Ok(())
}

fn parse_params(raw: Option<&str>) -> Result<Map<String, Value>> {
    match raw {
        None => Ok(Map::new()),
        Some(text) => match serde_json::from_str::<Value>(text)
            .context("--params is not valid JSON")?
        {
            Value::Object(map) => Ok(map),
            _ => bail!("--params must be a JSON object"),
        },
    }
}

fn print_record(record: &ExecutionRecord) {
    let status = match record.status {
        ExecutionStatus::Completed => style("completed").green().bold(),
        ExecutionStatus::Aborted => style("aborted").red().bold(),
    };

    println!();
    println!(
        "  Workflow '{}' {} ({}/{} steps completed)",
        style(&record.workflow_id).cyan(),
        status,
        record.steps_completed,
        record.steps_total
    );
    println!("  Execution: {}", record.execution_id);
    println!();

    if record.results.is_empty() {
        println!("  (no steps were dispatched)");
        println!();
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Step", "Status", "Detail"]);

    for result in &record.results {
        let (status_cell, detail) = match result.status {
            StepStatus::Success => (
                Cell::new("success").fg(Color::Green),
                result
                    .payload
                    .as_ref()
                    .and_then(|p| p.as_object())
                    .map(|obj| {
                        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
                        keys.sort_unstable();
                        keys.join(", ")
                    })
                    .unwrap_or_default(),
            ),
            StepStatus::Error => (
                Cell::new("error").fg(Color::Red),
                result.error.clone().unwrap_or_default(),
            ),
        };
        table.add_row(vec![Cell::new(&result.step_name), status_cell, Cell::new(detail)]);
    }

    println!("{table}");
    println!();
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Register a custom workflow from a YAML or JSON file.
pub async fn create_workflow(state: &AppState, file: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let is_yaml = matches!(
        file.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let draft = if is_yaml {
        parse_draft_yaml(&content)?
    } else {
        parse_draft_json(&content)?
    };

    let def = state.catalog.create(draft).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&def)?);
    } else {
        println!();
        println!(
            "  {} Created workflow '{}'",
            style("*").green().bold(),
            style(&def.id).cyan()
        );
        println!("  Steps: {}", def.steps.len());
        println!("  Failure policy: {}", policy_label(def.failure_policy));
        println!();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// List workflows matching a filter.
pub async fn list_workflows(state: &AppState, filter: &str, json: bool) -> Result<()> {
    let filter: WorkflowFilter = filter.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let workflows = state.catalog.list(filter).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&workflows)?);
        return Ok(());
    }

    if workflows.is_empty() {
        println!();
        println!("  No workflows match this filter.");
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Name", "Source", "Steps", "On failure"]);

    for def in &workflows {
        table.add_row(vec![
            Cell::new(&def.id).fg(Color::Cyan),
            Cell::new(&def.name),
            Cell::new(format!("{:?}", def.source).to_lowercase()),
            Cell::new(def.steps.len()),
            Cell::new(policy_label(def.failure_policy)),
        ]);
    }

    println!("{table}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Show
// ---------------------------------------------------------------------------

/// Show one workflow definition.
pub async fn show_workflow(state: &AppState, workflow: &str, json: bool) -> Result<()> {
    let Some(def) = state.catalog.lookup(workflow).await else {
        bail!("Workflow '{workflow}' not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&def)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} ({})",
        style(&def.name).cyan().bold(),
        style(&def.id).dim()
    );
    if !def.description.is_empty() {
        println!("  {}", def.description);
    }
    println!("  Failure policy: {}", policy_label(def.failure_policy));
    println!();

    for (idx, step) in def.steps.iter().enumerate() {
        let target = format!("{}.{}", step.provider, step.tool);
        match &step.condition {
            Some(cond) => println!(
                "  {}. {} -> {} (if {})",
                idx + 1,
                step.name,
                style(target).dim(),
                cond
            ),
            None => println!("  {}. {} -> {}", idx + 1, step.name, style(target).dim()),
        }
    }
    println!();

    Ok(())
}

fn policy_label(policy: FailurePolicy) -> &'static str {
    match policy {
        FailurePolicy::AbortOnError => "abort on error",
        FailurePolicy::ContinueOnError => "continue on error",
    }
}
