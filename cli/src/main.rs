//! Sprout CLI
//!
//! Command-line interface for operating the Sprout measurement backend.
//!
//! # Usage
//!
//! ```bash
//! sprout --help
//! sprout health
//! sprout submit --child 5a62be07de34500146d9c544 --kind weight --value 31.4
//! ```

#![deny(unsafe_code)]

use clap::{Parser, Subcommand};
use shared::models::MeasurementSubmission;

/// Sprout CLI - measurement backend command-line interface
#[derive(Parser)]
#[command(name = "sprout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API server URL
    #[arg(
        short,
        long,
        env = "SPROUT_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API server health
    Health,
    /// Print the JSON body for a measurement submission
    Submit {
        /// Owning child id
        #[arg(long)]
        child: String,
        /// Measurement kind (weight or body_fat)
        #[arg(long)]
        kind: String,
        /// Observed value
        #[arg(long)]
        value: f64,
        /// Unit (defaults per kind)
        #[arg(long)]
        unit: Option<String>,
        /// ISO-8601 timestamp
        #[arg(long)]
        timestamp: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Health) => {
            println!("Checking health of Sprout API at {}...", cli.api_url);
            println!("Health check not yet implemented");
        }
        Some(Commands::Submit {
            child,
            kind,
            value,
            unit,
            timestamp,
        }) => {
            let unit = unit.unwrap_or_else(|| default_unit(&kind).to_string());
            let submission = MeasurementSubmission::new()
                .with_type(kind)
                .with_timestamp(timestamp)
                .with_value(value)
                .with_unit(unit)
                .with_child_id(child);
            println!("{}", serde_json::to_string_pretty(&submission)?);
        }
        None => {
            println!("Sprout CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn default_unit(kind: &str) -> &'static str {
    match kind {
        "body_fat" => "%",
        _ => "kg",
    }
}
