//! Command-line argument definitions for the Stencil CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects detection or batch planning; the
//! configuration file and logging verbosity apply to both.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Stencil template tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Detect variables, patterns and integrity issues in a structure file
    Detect(DetectArgs),

    /// Plan how rows of data map onto a template's variables
    Plan(PlanArgs),
}

#[derive(clap::Args, Debug)]
pub struct DetectArgs {
    /// Path to the structure JSON exported from the design tool
    pub input: String,

    /// Path to the output JSON file
    #[arg(short, long, default_value = "detect.json")]
    pub output: String,

    /// Hierarchy predictions from a layout classifier (JSON)
    #[arg(long)]
    pub hints: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PlanArgs {
    /// Path to the structure JSON exported from the design tool
    pub input: String,

    /// Output of a previous `detect` run; detection is rerun when omitted
    #[arg(long)]
    pub variables: Option<String>,

    /// JSON object mapping variable keys to row columns
    #[arg(long)]
    pub mapping: String,

    /// JSON array of row objects
    #[arg(long)]
    pub rows: String,

    /// Path to the output JSON file
    #[arg(short, long, default_value = "plan.json")]
    pub output: String,
}
