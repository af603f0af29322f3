use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::db::{ensure_schema, PoolManager};
use crate::startup;

#[derive(Parser)]
#[command(name = "lifeos-ingest")]
#[command(about = "LifeOS - financial transaction ingestion endpoint", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Create the transactions table if it is missing, then exit
    Schema,

    /// Validate configuration and database connectivity
    Check,
}

pub async fn handle_schema(config: &Config) -> anyhow::Result<()> {
    let pool = PoolManager::new(config).await?;
    let result = ensure_schema(&pool).await;
    pool.shutdown().await;
    result?;

    println!("✓ Table 'transactions' is ready");
    Ok(())
}

pub async fn handle_check(config: &Config) -> anyhow::Result<()> {
    println!("Configuration:");
    println!("  Port: {}", config.server_port);
    println!("  Database URL: {}", mask_password(&config.database_url));
    println!("  Max connections: {}", config.max_connections);
    println!("  Acquire timeout: {}s", config.acquire_timeout_secs);

    let report = startup::validate_environment(config).await;
    report.print();

    if !report.is_valid() {
        anyhow::bail!("startup validation failed");
    }
    Ok(())
}

fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if let Some(slash_pos) = url[..colon_pos].rfind("//") {
                let prefix = &url[..slash_pos + 2];
                let user = &url[slash_pos + 2..colon_pos];
                let suffix = &url[at_pos..];
                return format!("{}{}:****{}", prefix, user, suffix);
            }
        }
    }
    url.to_string()
}
