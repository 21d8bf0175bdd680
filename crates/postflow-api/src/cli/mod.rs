//! CLI command definitions and dispatch for the `pflow` binary.
//!
//! Uses clap derive macros for argument parsing. Workflow commands mirror
//! the REST surface: execute, create, list, show, plus image-model
//! management and the API server.

pub mod model;
pub mod workflow;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Automate your social-media content operations.
#[derive(Parser)]
#[command(name = "pflow", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a workflow by id.
    Execute {
        /// Workflow id (predefined or custom).
        workflow: String,

        /// Initial parameters as a JSON object.
        #[arg(long)]
        params: Option<String>,
    },

    /// Create a custom workflow from a YAML or JSON file.
    Create {
        /// Path to the workflow definition file.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List workflows.
    #[command(alias = "ls")]
    List {
        /// Filter: all, predefined, or custom.
        #[arg(long, default_value = "all")]
        filter: String,
    },

    /// Show a workflow definition.
    Show {
        /// Workflow id.
        workflow: String,
    },

    /// Manage image generation models.
    Models {
        #[command(subcommand)]
        action: model::ModelCommand,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "8700")]
        port: u16,

        /// Host to bind.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Bridge tracing spans to OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,

        /// Emit JSON log lines instead of human-readable text.
        #[arg(long)]
        log_json: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}
