#![cfg_attr(
    not(any(feature = "pg", feature = "sqlite")),
    allow(unused_imports, unused_variables, dead_code, unreachable_code)
)]

//! Store wiring and the SeaORM side of the paging engine.
//!
//! - [`DbHandle`] connects to SQLite (default) or PostgreSQL (`pg` feature)
//!   through typed SQLx pool options and exposes a SeaORM connection.
//! - [`config`] holds the serde configuration for a connection.
//! - [`paging`] turns `query_core` sort specs and page requests into SeaORM
//!   queries and assembles pages with the configured count strategy.
//!
//! # Example
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> query_db::Result<()> {
//!     use query_db::{ConnectOpts, DbHandle};
//!
//!     let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
//!     let conn = db.sea();
//!     // run migrations, build repositories on `conn` ...
//!     # let _ = conn;
//!     db.close().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod paging;

pub use config::{DbConnConfig, PoolCfg};
pub use paging::{
    fetch_page, fetch_sorted, Counted, FieldMap, QueryError, SortExt, TOTAL_COUNT_ALIAS,
};

use std::time::Duration;

#[cfg(feature = "pg")]
use sea_orm::SqlxPostgresConnector;
#[cfg(feature = "sqlite")]
use sea_orm::SqlxSqliteConnector;
use sea_orm::DatabaseConnection;
#[cfg(feature = "pg")]
use sqlx::postgres::PgPoolOptions;
#[cfg(feature = "sqlite")]
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use thiserror::Error;
use tracing::{debug, info};

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle and helpers.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Connection options.
/// Covers the common sqlx pool knobs; each driver applies the subset it supports.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Minimum number of connections in the pool.
    pub min_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    /// Idle timeout before a connection is closed.
    pub idle_timeout: Option<Duration>,
    /// Maximum lifetime for a connection.
    pub max_lifetime: Option<Duration>,
    /// Test connection health before acquire.
    pub test_before_acquire: bool,
    /// For SQLite file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            max_lifetime: None,
            test_before_acquire: false,
            create_sqlite_dirs: true,
        }
    }
}

const DEFAULT_SQLITE_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Main handle.
#[derive(Debug)]
pub struct DbHandle {
    engine: DbEngine,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Detect engine by DSN.
    ///
    /// Note: we only check scheme prefixes and don't mutate the tail (credentials etc.).
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_credentials_in_dsn(Some(dsn))))
        }
    }

    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        info!(dsn = %redact_credentials_in_dsn(Some(dsn)), ?engine, "connecting to database");

        match engine {
            #[cfg(feature = "pg")]
            DbEngine::Postgres => {
                let mut o = PgPoolOptions::new();
                if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(n) = opts.min_conns {
                    o = o.min_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                o = o
                    .idle_timeout(opts.idle_timeout)
                    .max_lifetime(opts.max_lifetime)
                    .test_before_acquire(opts.test_before_acquire);

                let pool = o.connect(dsn).await?;
                Ok(Self {
                    engine,
                    sea: SqlxPostgresConnector::from_sqlx_postgres_pool(pool),
                })
            }
            #[cfg(feature = "sqlite")]
            DbEngine::Sqlite => {
                use std::str::FromStr;

                let in_memory = is_sqlite_memory(dsn);
                if !in_memory && opts.create_sqlite_dirs {
                    ensure_sqlite_parent_dir(dsn)?;
                }

                let mut connect = SqliteConnectOptions::from_str(dsn)?
                    .create_if_missing(true)
                    .foreign_keys(true)
                    .synchronous(SqliteSynchronous::Normal);
                if in_memory {
                    connect = connect.journal_mode(SqliteJournalMode::Memory);
                } else {
                    connect = connect
                        .journal_mode(SqliteJournalMode::Wal)
                        .busy_timeout(DEFAULT_SQLITE_BUSY_TIMEOUT);
                }

                let mut o = SqlitePoolOptions::new();
                if in_memory {
                    // every pooled connection to :memory: is a separate database,
                    // so keep exactly one and never recycle it
                    debug!("in-memory sqlite: pinning pool to a single connection");
                    o = o
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None);
                } else {
                    if let Some(n) = opts.max_conns {
                        o = o.max_connections(n);
                    }
                    if let Some(n) = opts.min_conns {
                        o = o.min_connections(n);
                    }
                    o = o
                        .idle_timeout(opts.idle_timeout)
                        .max_lifetime(opts.max_lifetime);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                o = o.test_before_acquire(opts.test_before_acquire);

                let pool = o.connect_with(connect).await?;
                Ok(Self {
                    engine,
                    sea: SqlxSqliteConnector::from_sqlx_sqlite_pool(pool),
                })
            }
            #[cfg(not(feature = "pg"))]
            DbEngine::Postgres => Err(DbError::FeatureDisabled("PostgreSQL feature not enabled")),
            #[cfg(not(feature = "sqlite"))]
            DbEngine::Sqlite => Err(DbError::FeatureDisabled("SQLite feature not enabled")),
        }
    }

    /// Graceful pool close.
    pub async fn close(self) -> Result<()> {
        self.sea.close().await?;
        Ok(())
    }

    /// Get the backend.
    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// Get SeaORM connection (clone; cheap handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }
}

fn is_sqlite_memory(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

#[cfg(feature = "sqlite")]
fn ensure_sqlite_parent_dir(dsn: &str) -> Result<()> {
    let tail = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or(dsn);
    let path = tail.split('?').next().unwrap_or(tail);
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Replace the password part of a DSN with `***` so it can be logged.
pub fn redact_credentials_in_dsn(dsn: Option<&str>) -> String {
    let Some(dsn) = dsn else {
        return "<none>".to_string();
    };
    match url::Url::parse(dsn) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("***")).is_ok() {
                url.to_string()
            } else {
                "<redacted>".to_string()
            }
        }
        Ok(_) => dsn.to_string(),
        Err(_) if dsn.contains('@') => "<redacted>".to_string(),
        Err(_) => dsn.to_string(),
    }
}
