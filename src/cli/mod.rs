//! CLI module for Notat.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Notat - YouTube Notes
///
/// A CLI tool that turns YouTube videos into structured notes.
/// The name "Notat" comes from the Norwegian word for "note."
#[derive(Parser, Debug)]
#[command(name = "notat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate structured notes for a YouTube video
    Notes {
        /// YouTube URL (watch, youtu.be, shorts, or embed)
        url: String,

        /// Print the result as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Fetch the transcript for a YouTube video without generating notes
    Transcript {
        /// YouTube URL (watch, youtu.be, shorts, or embed)
        url: String,

        /// Write the transcript to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
