use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::adapters::PostgresTransactionRepository;
use crate::config::Config;
use crate::db::{ensure_schema, PoolManager};
use crate::{create_app, AppState};

/// Connects the pool, probes the database and makes sure the schema exists.
/// The pool is closed again if any later step fails.
pub async fn bootstrap(config: &Config) -> Result<PoolManager> {
    let pool = PoolManager::new(config)
        .await
        .context("Unable to connect to database")?;

    if let Err(e) = prepare(&pool).await {
        pool.shutdown().await;
        return Err(e);
    }

    Ok(pool)
}

async fn prepare(pool: &PoolManager) -> Result<()> {
    pool.health_check()
        .await
        .context("Database health check failed")?;
    ensure_schema(pool)
        .await
        .context("Failed to create table")?;
    Ok(())
}

/// Runs the server until it stops, then drains the pool whatever the outcome.
pub async fn run_server(config: Config) -> Result<()> {
    let pool = bootstrap(&config).await?;

    let repository = Arc::new(PostgresTransactionRepository::new(pool.clone()));
    let app = create_app(AppState::new(repository));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let builder = match axum::Server::try_bind(&addr) {
        Ok(builder) => builder,
        Err(e) => {
            pool.shutdown().await;
            return Err(e).with_context(|| format!("Failed to bind {}", addr));
        }
    };

    tracing::info!("Server starting on port {}", config.server_port);
    let served = builder
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    pool.shutdown().await;
    served.context("Server exited with an error")
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Unable to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

pub struct ValidationReport {
    pub environment: bool,
    pub database: bool,
    pub schema: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.environment && self.database && self.schema
    }

    pub fn print(&self) {
        println!("\n=== Startup Validation Report ===");
        println!("Environment Variables: {}", status(self.environment));
        println!("Database Connectivity: {}", status(self.database));
        println!("Transactions Table:    {}", status(self.schema));

        if !self.errors.is_empty() {
            println!("\nErrors:");
            for error in &self.errors {
                println!("  ❌ {}", error);
            }
        }

        println!("\nOverall Status: {}", if self.is_valid() { "✅ PASS" } else { "❌ FAIL" });
        println!("=================================\n");
    }
}

fn status(ok: bool) -> &'static str {
    if ok { "✅ OK" } else { "❌ FAIL" }
}

pub async fn validate_environment(config: &Config) -> ValidationReport {
    let mut report = ValidationReport {
        environment: true,
        database: true,
        schema: true,
        errors: Vec::new(),
    };

    if let Err(e) = validate_env_vars(config) {
        report.environment = false;
        report.errors.push(format!("Environment: {}", e));
    }

    match PoolManager::new(config).await {
        Ok(pool) => {
            if let Err(e) = pool.health_check().await {
                report.database = false;
                report.errors.push(format!("Database: {}", e));
            }
            if let Err(e) = validate_schema(&pool).await {
                report.schema = false;
                report.errors.push(format!("Schema: {:#}", e));
            }
            pool.shutdown().await;
        }
        Err(e) => {
            report.database = false;
            report.schema = false;
            report.errors.push(format!("Database: {}", e));
        }
    }

    report
}

fn validate_env_vars(config: &Config) -> Result<()> {
    if config.database_url.is_empty() {
        anyhow::bail!("DATABASE_URL is empty");
    }
    if config.max_connections == 0 {
        anyhow::bail!("DATABASE_MAX_CONNECTIONS must be greater than 0");
    }

    Ok(())
}

async fn validate_schema(pool: &PoolManager) -> Result<()> {
    let mut conn = pool.acquire().await?;
    let exists: bool = sqlx::query_scalar("SELECT to_regclass('public.transactions') IS NOT NULL")
        .fetch_one(&mut *conn)
        .await
        .context("Failed to look up transactions table")?;

    if !exists {
        anyhow::bail!("table 'transactions' does not exist; run `lifeos-ingest schema`");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;

    fn config(port: u16, max_connections: u32) -> Config {
        Config {
            server_port: port,
            database_url: "postgres://localhost:5432/lifeos".to_string(),
            max_connections,
            acquire_timeout_secs: 1,
            log_format: LogFormat::Text,
        }
    }

    #[test]
    fn test_validate_env_vars_accepts_defaults() {
        assert!(validate_env_vars(&config(8080, 10)).is_ok());
    }

    #[test]
    fn test_validate_env_vars_zero_max_connections() {
        assert!(validate_env_vars(&config(8080, 0)).is_err());
    }

    #[test]
    fn test_validate_env_vars_empty_database_url() {
        let mut config = config(8080, 10);
        config.database_url = String::new();

        assert!(validate_env_vars(&config).is_err());
    }

    #[test]
    fn test_report_validity() {
        let report = ValidationReport {
            environment: true,
            database: false,
            schema: true,
            errors: vec!["Database: refused".to_string()],
        };
        assert!(!report.is_valid());
    }
}
