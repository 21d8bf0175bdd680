//! Postflow CLI and REST API entry point.
//!
//! Binary name: `pflow`
//!
//! Parses CLI arguments, initializes the workflow catalog and provider
//! adapters, then dispatches to the appropriate command handler or starts
//! the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use console::style;
use postflow_observe::tracing_setup::TracingOptions;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "pflow", &mut std::io::stdout());
        return Ok(());
    }

    // The server installs the full observability stack; one-shot commands
    // get a verbosity-scaled fmt subscriber.
    if let Commands::Serve { otel, log_json, .. } = &cli.command {
        postflow_observe::tracing_setup::init_tracing(TracingOptions {
            otel: *otel,
            json_logs: *log_json,
        })
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    } else {
        let filter = match cli.verbose {
            0 if cli.quiet => "error",
            0 => "warn",
            1 => "info,postflow=debug",
            _ => "trace",
        };
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_target(false)
            .init();
    }

    let state = AppState::init().await?;

    match cli.command {
        Commands::Execute { workflow, params } => {
            cli::workflow::execute_workflow(&state, &workflow, params.as_deref(), cli.json)
                .await?;
        }

        Commands::Create { file } => {
            cli::workflow::create_workflow(&state, &file, cli.json).await?;
        }

        Commands::List { filter } => {
            cli::workflow::list_workflows(&state, &filter, cli.json).await?;
        }

        Commands::Show { workflow } => {
            cli::workflow::show_workflow(&state, &workflow, cli.json).await?;
        }

        Commands::Models { action } => {
            cli::model::handle_model_command(action, &state, cli.json).await?;
        }

        Commands::Serve { port, host, .. } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(addr = addr.as_str(), "REST API listening");

            if !cli.quiet {
                println!();
                println!(
                    "  {} Postflow API listening on {}",
                    style("*").green().bold(),
                    style(&addr).cyan()
                );
                println!();
            }

            let router = http::router::build_router(state);
            axum::serve(listener, router).await?;

            postflow_observe::tracing_setup::shutdown_tracing();
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
