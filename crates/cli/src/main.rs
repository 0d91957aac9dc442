//! Launchpad CLI - Database migrations and signup management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! launchpad migrate
//!
//! # Print every captured signup as JSON lines
//! launchpad signups list
//!
//! # Capture an email without going through the HTTP API
//! launchpad signups add -e someone@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `signups list` - Export captured signups
//! - `signups add` - Capture a single email

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(author, version, about = "Launchpad CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage captured signups
    Signups {
        #[command(subcommand)]
        action: SignupAction,
    },
}

#[derive(Subcommand)]
enum SignupAction {
    /// Print every signup as one JSON object per line
    List,
    /// Capture a new signup
    Add {
        /// Email address to capture
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Signups { action } => match action {
            SignupAction::List => commands::signups::list().await?,
            SignupAction::Add { email } => commands::signups::add(&email).await?,
        },
    }
    Ok(())
}
