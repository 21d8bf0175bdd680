//! CLI image-model management subcommands.

use anyhow::{Result, bail};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use postflow_types::model::SelectionStrategy;

use crate::state::AppState;

/// Image-model subcommands.
#[derive(Subcommand)]
pub enum ModelCommand {
    /// List image generation models.
    List {
        /// Include disabled models.
        #[arg(long)]
        all: bool,
    },

    /// Select a model for a generation request.
    Select {
        /// Strategy: cost_first, quality_first, speed_first, or balanced.
        #[arg(long)]
        strategy: Option<String>,

        /// Preferred model id.
        #[arg(long)]
        prefer: Option<String>,

        /// Desired aspect ratio.
        #[arg(long, default_value = "3:4")]
        aspect_ratio: String,
    },

    /// Enable a model.
    Enable {
        /// Model id.
        id: String,
    },

    /// Disable a model.
    Disable {
        /// Model id.
        id: String,
    },
}

/// Handle a model subcommand.
pub async fn handle_model_command(cmd: ModelCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        ModelCommand::List { all } => list_models(state, all, json),
        ModelCommand::Select {
            strategy,
            prefer,
            aspect_ratio,
        } => select_model(state, strategy.as_deref(), prefer.as_deref(), &aspect_ratio, json),
        ModelCommand::Enable { id } => set_enabled(state, &id, true, json),
        ModelCommand::Disable { id } => set_enabled(state, &id, false, json),
    }
}

fn list_models(state: &AppState, include_disabled: bool, json: bool) -> Result<()> {
    let models = state.models.list_models(include_disabled);

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Name", "Enabled", "Submodels", "Key required"]);

    for model in &models {
        let enabled = if model.enabled {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(&model.id).fg(Color::Cyan),
            Cell::new(&model.name),
            enabled,
            Cell::new(model.submodels.join(", ")),
            Cell::new(if model.api_key_required { "yes" } else { "no" }),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn select_model(
    state: &AppState,
    strategy: Option<&str>,
    prefer: Option<&str>,
    aspect_ratio: &str,
    json: bool,
) -> Result<()> {
    let strategy = strategy
        .map(|s| s.parse::<SelectionStrategy>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let Some(selected) = state.models.select_model(strategy, prefer, aspect_ratio) else {
        bail!("No suitable image model is enabled");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} / {}",
        style("*").green().bold(),
        style(&selected.name).cyan(),
        selected.submodel_id
    );
    println!("  Upstream model id: {}", selected.submodel.model_id);
    if let Some(cost) = selected.cost_estimate {
        println!("  Estimated cost: ${cost:.3} per image");
    }
    println!();

    Ok(())
}

fn set_enabled(state: &AppState, id: &str, enabled: bool, json: bool) -> Result<()> {
    if !state.models.set_enabled(id, enabled) {
        bail!("Model '{id}' not found");
    }

    if json {
        println!(
            "{}",
            serde_json::json!({ "id": id, "enabled": enabled })
        );
    } else {
        let verb = if enabled { "enabled" } else { "disabled" };
        println!(
            "  {} Model '{}' {}",
            style("*").green().bold(),
            style(id).cyan(),
            verb
        );
    }

    Ok(())
}
