//! [`Args`] definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Real-estate investment analysis.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// [`Command`] to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// Command to run.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyzes a scenario input document and prints the result.
    Analyze {
        /// Path to the JSON input document, `-` for the standard input.
        input: PathBuf,

        /// Name of the scenario.
        #[arg(short, long, default_value = "Scenario")]
        name: String,

        /// Refreshes the market report before printing the result.
        #[arg(long)]
        refresh_market: bool,

        /// Prints only the analysis snapshot.
        #[arg(long, conflicts_with = "metrics")]
        snapshot_only: bool,

        /// Prints the headline metrics as text.
        #[arg(long)]
        metrics: bool,
    },

    /// Estimates the market rent of every unit of a scenario input document.
    EstimateRents {
        /// Path to the JSON input document, `-` for the standard input.
        input: PathBuf,
    },
}
