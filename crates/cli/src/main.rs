//! Voltlane CLI - catalog seeding and admin management.
//!
//! # Usage
//!
//! ```bash
//! # Seed the product catalog from a YAML file
//! vl-cli seed -f catalog.yaml
//!
//! # Create (or promote) an admin profile document
//! vl-cli admin create -u uid-42 -e admin@example.com -n "Admin Name"
//! ```
//!
//! # Commands
//!
//! - `seed` - Seed the product catalog
//! - `admin create` - Create admin profile documents
//!
//! Both commands talk to the remote document service configured by
//! `VOLTLANE_REMOTE_URL` and `VOLTLANE_REMOTE_API_KEY`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vl-cli")]
#[command(author, version, about = "Voltlane CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the product catalog from a YAML file
    Seed {
        /// Path to the YAML catalog file
        #[arg(short, long)]
        file: String,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create an admin profile document (or promote an existing one)
    Create {
        /// Provider-assigned auth uid
        #[arg(short, long)]
        uid: String,

        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { file } => commands::seed::catalog(&file).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { uid, email, name } => {
                commands::admin::create_user(&uid, &email, &name).await?;
            }
        },
    }
    Ok(())
}
