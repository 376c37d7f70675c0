//! Command-line argument definitions for the Compass CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the session document, the report path,
//! the configuration file and the logging verbosity.

use clap::Parser;
use log::LevelFilter;

/// Command-line arguments for the Compass assessment tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the session document
    #[arg(help = "Path to the session document (TOML)")]
    pub input: String,

    /// Path to the assessment report
    #[arg(short, long, default_value = "report.toml")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Exercise the submissions belong to
    #[arg(long, default_value_t = 1)]
    pub exercise_id: u64,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value_t = LevelFilter::Info, ignore_case = true)]
    pub log_level: LevelFilter,
}
