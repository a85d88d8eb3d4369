// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Guardian - a child-safety channel monitoring agent.
//!
//! This is the binary entry point for the Guardian agent.

mod history;
mod serve;
mod status;

use clap::{Parser, Subcommand};

/// Guardian - a child-safety channel monitoring agent.
#[derive(Parser, Debug)]
#[command(name = "guardian", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start monitoring the configured channel.
    Serve,
    /// Show the persisted session status for the configured channel.
    Status,
    /// Show the classification history for the configured channel.
    History,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match guardian_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            guardian_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Status) => status::run_status(config).await,
        Some(Commands::History) => history::run_history(config).await,
        None => {
            println!("guardian: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
