use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tfvc-labels")]
#[command(about = "A TUI for browsing TFVC labels and the items they capture")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the interactive TUI (default)
    Run {
        /// Path to a JSON project-data file (an array of labels, each
        /// with its captured items); the built-in demo data is used
        /// when omitted
        #[arg(short, long)]
        data: Option<String>,
        /// Project name shown in the header
        #[arg(short, long, default_value = "Fabrikam")]
        project: String,
        /// Simulated per-request latency in milliseconds
        #[arg(long, default_value = "150")]
        latency_ms: u64,
    },
    /// Generate a screenshot from a JSON state snapshot
    Screenshot {
        /// Path to the JSON snapshot file
        #[arg(short, long)]
        config: String,
        /// Output file for the screenshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
        /// Terminal width for rendering
        #[arg(long, default_value = "120")]
        width: u16,
        /// Terminal height for rendering
        #[arg(long, default_value = "40")]
        height: u16,
    },
    /// Execute a command against a snapshot and output the result
    Execute {
        /// Path to the JSON snapshot file
        #[arg(short, long)]
        config: String,
        /// Command to execute (e.g., "labels_down", "open_label", "filter:a")
        #[arg(short = 'x', long)]
        command: String,
        /// Output file for the resulting snapshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
        /// Also generate a screenshot of the result
        #[arg(long)]
        screenshot: bool,
        /// Terminal width for screenshot (if enabled)
        #[arg(long, default_value = "120")]
        width: u16,
        /// Terminal height for screenshot (if enabled)
        #[arg(long, default_value = "40")]
        height: u16,
    },
    /// Fetch labels and save the resulting state snapshot without running the TUI
    SaveState {
        /// Path to a JSON project-data file (demo data when omitted)
        #[arg(short, long)]
        data: Option<String>,
        /// Project name recorded in the snapshot
        #[arg(short, long, default_value = "Fabrikam")]
        project: String,
        /// Output file for the snapshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}
