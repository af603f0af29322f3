use anyhow::Context;
use dotenvy::dotenv;
use sqlx::postgres::PgConnectOptions;
use std::env;
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .context("DATABASE_URL is required")?;
        PgConnectOptions::from_str(&database_url)
            .context("Unable to parse DATABASE_URL")?;

        let server_port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };
        if server_port == 0 {
            anyhow::bail!("PORT must be greater than 0");
        }

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be greater than 0");
        }

        let acquire_timeout_secs = match lookup("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .context("DATABASE_ACQUIRE_TIMEOUT_SECS must be a number of seconds")?,
            None => DEFAULT_ACQUIRE_TIMEOUT_SECS,
        };

        let log_format = parse_log_format(lookup("LOG_FORMAT").as_deref())?;

        Ok(Config {
            server_port,
            database_url,
            max_connections,
            acquire_timeout_secs,
            log_format,
        })
    }
}

fn parse_log_format(raw: Option<&str>) -> anyhow::Result<LogFormat> {
    match raw.map(str::trim) {
        None | Some("") => Ok(LogFormat::Text),
        Some(value) if value.eq_ignore_ascii_case("text") => Ok(LogFormat::Text),
        Some(value) if value.eq_ignore_ascii_case("json") => Ok(LogFormat::Json),
        Some(other) => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config =
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/lifeos")]))
                .unwrap();

        assert_eq!(config.server_port, 8080);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.acquire_timeout_secs, DEFAULT_ACQUIRE_TIMEOUT_SECS);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "9000")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL is required"));
    }

    #[test]
    fn test_blank_database_url() {
        assert!(Config::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).is_err());
    }

    #[test]
    fn test_unparseable_database_url() {
        let err = Config::from_lookup(lookup_from(&[("DATABASE_URL", "not a url")]))
            .unwrap_err();
        assert!(err.to_string().contains("Unable to parse DATABASE_URL"));
    }

    #[test]
    fn test_custom_port_and_pool_settings() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://user:pw@db:5432/lifeos"),
            ("PORT", "9090"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
            ("DATABASE_ACQUIRE_TIMEOUT_SECS", "2"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 9090);
        assert_eq!(config.max_connections, 25);
        assert_eq!(config.acquire_timeout_secs, 2);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/lifeos"),
            ("PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/lifeos"),
            ("PORT", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT must be greater than 0"));
    }

    #[test]
    fn test_zero_max_connections_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/lifeos"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_log_format() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/lifeos"),
            ("LOG_FORMAT", "xml"),
        ]));
        assert!(result.is_err());
    }
}
