//! Roastline operations CLI.
//!
//! One binary for the jobs that run outside the web servers:
//!
//! - `migrate` - Apply database migrations (`storefront`, `admin`, or `all`)
//! - `admin create` - Create an admin account with a hashed password
//! - `seed products` - Load catalog products from a YAML file
//!
//! # Examples
//!
//! ```bash
//! roastline migrate all
//! roastline admin create -e admin@example.com -n "Admin Name" -r super_admin -p <password>
//! roastline seed products -f seeds/products.yaml
//! ```
//!
//! Connection strings come from the same environment variables the servers
//! read (`STOREFRONT_DATABASE_URL`, `ADMIN_DATABASE_URL`), with `.env`
//! loaded when present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "roastline")]
#[command(author, version, about = "Roastline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply schema migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Migrate the storefront (shop) database
    Storefront,
    /// Migrate the admin database
    Admin,
    /// Migrate both databases
    All,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Email the account signs in with
        #[arg(short, long)]
        email: String,

        /// Name shown in the back office
        #[arg(short, long)]
        name: String,

        /// One of `super_admin`, `admin`, `viewer`
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Initial password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Seed catalog products from a YAML file
    Products {
        /// Path to the YAML seed file
        #[arg(short, long)]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("Aborting: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => {
            if matches!(target, MigrateTarget::Storefront | MigrateTarget::All) {
                commands::migrate::storefront().await?;
            }
            if matches!(target, MigrateTarget::Admin | MigrateTarget::All) {
                commands::migrate::admin().await?;
            }
        }
        Commands::Admin {
            action:
                AdminAction::Create {
                    email,
                    name,
                    role,
                    password,
                },
        } => {
            commands::admin::create_user(&email, &name, &role, &password).await?;
        }
        Commands::Seed {
            target: SeedTarget::Products { file },
        } => {
            commands::seed::products(&file).await?;
        }
    }
    Ok(())
}
