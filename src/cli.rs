//! Command-line interface parsing for Bagyo
//!
//! One-shot by default: fetch a snapshot, print it, exit. `--watch` keeps the
//! process running and refreshes on a fixed interval.

use clap::Parser;

/// Bagyo - typhoon and earthquake tracking around the Philippine Area of
/// Responsibility
#[derive(Parser, Debug)]
#[command(name = "bagyo")]
#[command(about = "Track typhoons, earthquakes, and low pressure areas around the PAR")]
#[command(version)]
pub struct Cli {
    /// Minimum earthquake magnitude to include
    #[arg(long, default_value_t = 4.5)]
    pub min_magnitude: f64,

    /// Maximum number of earthquakes to include
    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    /// Print the snapshot as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Keep running and refresh the snapshot on an interval
    #[arg(long)]
    pub watch: bool,

    /// Refresh interval in seconds for watch mode
    #[arg(long, default_value_t = 60)]
    pub interval: u64,

    /// Verbose diagnostic logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
