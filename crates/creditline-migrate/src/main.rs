use std::path::PathBuf;

use anyhow::{Result, bail};
use creditline_platform::{
    REQUIRED_TABLES, ServiceConfig, connect_database, run_migrations, validate_schema,
};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Migrate,
    Validate,
}

impl Command {
    fn parse(arg: Option<&str>) -> Result<Self> {
        match arg {
            None | Some("migrate") => Ok(Self::Migrate),
            Some("validate") => Ok(Self::Validate),
            Some(other) => bail!("unknown command '{other}'; expected 'migrate' or 'validate'"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "creditline_migrate=info,creditline_platform=info".to_string()),
        )
        .init();

    let arg = std::env::args().nth(1);
    let command = Command::parse(arg.as_deref())?;

    let config = ServiceConfig::from_env("")?;
    let pool = connect_database(config.require_database_url()?).await?;

    match command {
        Command::Migrate => {
            let dir = PathBuf::from(
                std::env::var("MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string()),
            );
            let applied = run_migrations(&pool, &dir).await?;
            if applied.is_empty() {
                info!("schema is up to date");
            } else {
                info!(count = applied.len(), "applied migrations: {}", applied.join(", "));
            }
        }
        Command::Validate => {
            let missing = validate_schema(&pool).await?;
            if !missing.is_empty() {
                error!("missing tables: {}", missing.join(", "));
                bail!("schema validation failed");
            }
            info!(tables = REQUIRED_TABLES.len(), "schema validated");
        }
    }

    Ok(())
}
