pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "clipmirror")]
#[command(about = "Mirrors hockey highlight links posted to reddit", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/clipmirror/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll feeds until interrupted
    Run {
        /// Override the sweep interval (e.g. "30s", "1m")
        #[arg(short, long)]
        interval: Option<String>,
    },
    /// Sweep every feed once and wait for the results
    Once,
    /// Show which handlers a link would be sent to
    Classify {
        url: String,
        /// Domain as the feed reports it (default: derived from the URL)
        #[arg(short, long)]
        domain: Option<String>,
    },
    /// Check whether an item has been handled
    Seen { id: String },
    /// Mark an item as handled so the bot never replies to it
    Mark { id: String },
}
