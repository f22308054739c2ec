//! Workflow configuration loaded from environment variables.

use store::PostgresStore;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Order creation configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `ORDERING_REJECT_ZERO_QUANTITY`: reject lines with quantity 0 (default: `false`)
/// - `ORDERING_COMPENSATE_ON_STOCK_FAILURE`: discard the order if the stock
///   decrement fails (default: `true`)
/// - `DATABASE_URL`: PostgreSQL connection string (default: unset)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingConfig {
    pub reject_zero_quantity: bool,
    pub compensate_on_stock_failure: bool,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl OrderingConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(default)
        };

        Self {
            reject_zero_quantity: flag(
                "ORDERING_REJECT_ZERO_QUANTITY",
                defaults.reject_zero_quantity,
            ),
            compensate_on_stock_failure: flag(
                "ORDERING_COMPENSATE_ON_STOCK_FAILURE",
                defaults.compensate_on_stock_failure,
            ),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|&n: &u32| n > 0)
                .unwrap_or(defaults.max_connections),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .and_then(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
        }
    }

    /// Opens the PostgreSQL store at `database_url` and runs migrations.
    ///
    /// Returns None when no database is configured.
    pub async fn connect_postgres(&self) -> store::Result<Option<PostgresStore>> {
        let Some(url) = self.database_url.as_deref() else {
            return Ok(None);
        };

        let store = PostgresStore::connect(url, self.max_connections).await?;
        store.run_migrations().await?;
        tracing::info!(max_connections = self.max_connections, "connected to PostgreSQL");
        Ok(Some(store))
    }
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            reject_zero_quantity: false,
            compensate_on_stock_failure: true,
            database_url: None,
            max_connections: 5,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
