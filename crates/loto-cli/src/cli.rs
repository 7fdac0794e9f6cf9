use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "LOTO isolation planning toolkit", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute a minimal isolation plan for an asset
    Plan {
        /// Domain graph directory or file
        #[arg(long)]
        graphs: PathBuf,
        /// Tag identifying the node(s) to isolate (e.g. "asset")
        #[arg(long)]
        asset: String,
        /// Rule pack file
        #[arg(long)]
        rules: PathBuf,
        /// Optional planner config override
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output file for the resulting plan (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Apply a plan's actions to a set of domain graphs
    Apply {
        /// Plan file produced by `plan`
        #[arg(long)]
        plan: PathBuf,
        /// Domain graph directory or file
        #[arg(long)]
        graphs: PathBuf,
        /// Output file for the resulting graphs (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Run stimuli against a set of (already applied) domain graphs
    Simulate {
        /// Domain graph directory or file
        #[arg(long)]
        graphs: PathBuf,
        /// Comma-separated stimulus names (e.g. REMOTE_OPEN,PUMP_START)
        #[arg(long, value_delimiter = ',')]
        stimuli: Vec<String>,
        /// Seed for deterministic path tie-breaking
        #[arg(long)]
        seed: Option<u64>,
        /// Output file for the simulation report (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Evaluate production impact of the current graph state
    Evaluate {
        /// Domain graph directory or file
        #[arg(long)]
        graphs: PathBuf,
        /// Units/areas/penalties side-car file (YAML or JSON)
        #[arg(long)]
        units: PathBuf,
        /// Output file for the impact result (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Record a dual-approval gate's approval and report its state
    Approve {
        /// Gate state file, created on first use
        #[arg(long)]
        gate: PathBuf,
        /// Approver identity
        #[arg(long)]
        user: String,
    },
}
