//! # Inventory API Main Entry Point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inventory_api::{
    config::{AppConfig, ConfigLoader},
    db, seeds,
    server::run_server,
    telemetry,
};
use sea_orm::DatabaseConnection;

#[derive(Parser, Debug)]
#[command(name = "inventory-api", version, about = "Multi-tenant inventory API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Migrate, seed and serve HTTP (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Apply migrations, seed the super admin and exit
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;

    telemetry::init_tracing(&config).context("Failed to initialize tracing")?;
    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => {
            connect_and_migrate(&config).await?;
        }
        Command::Seed => {
            let db = connect_and_migrate(&config).await?;
            let outcome = seeds::seed_super_admin(&db, &config.super_admin).await?;
            tracing::info!(?outcome, "Seeding finished");
        }
        Command::Serve => {
            let db = connect_and_migrate(&config).await?;
            seeds::seed_super_admin(&db, &config.super_admin)
                .await
                .context("Failed to seed super admin")?;
            run_server(config, db).await?;
        }
    }

    Ok(())
}

async fn connect_and_migrate(config: &AppConfig) -> Result<DatabaseConnection> {
    let db = db::init_pool(config).await?;
    db::run_migrations(&db).await?;
    Ok(db)
}
