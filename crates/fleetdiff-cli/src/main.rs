//! fleetdiff CLI - compare Fleet agent policies against golden fixtures.

use clap::{Parser, Subcommand};

mod commands;

use commands::{canonicalize, compare, update};

#[derive(Parser)]
#[command(name = "fleetdiff")]
#[command(about = "Canonicalize and compare Fleet agent policies against golden fixtures")]
struct Cli {
    /// Enable trace logging (shows both policies after cleaning)
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the canonical form of a policy
    Canonicalize {
        /// Input policy file (or stdin if not provided)
        input: Option<String>,
    },
    /// Compare a downloaded policy against a golden fixture
    Compare {
        /// Path to the expected (golden) policy
        expected: String,
        /// Path to the found (downloaded) policy
        found: String,
        /// Output the verdict as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the canonical form of a downloaded policy as the golden
    /// fixture for a test config
    Update {
        /// Path to the test config the fixture belongs to
        test_config: String,
        /// Path to the found (downloaded) policy
        found: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Canonicalize { input } => canonicalize::run(input),
        Commands::Compare {
            expected,
            found,
            json,
        } => compare::run(expected, found, json),
        Commands::Update { test_config, found } => update::run(test_config, found),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
