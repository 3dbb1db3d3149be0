//! Database configuration types.
//!
//! These are deserialized directly from Figment configuration (the `database`
//! section of the application config).
//!
//! ```yaml
//! database:
//!   dsn: "sqlite://data/members.db"
//!   pool:
//!     max_conns: 5
//!     acquire_timeout: 10s
//! ```
//!
//! Relative SQLite paths are resolved against the application home directory
//! by [`DbConnConfig::resolve_dsn`]; in-memory DSNs are kept as-is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConnectOpts, DbError, Result};

/// Connection config: a full DSN plus optional pool overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DbConnConfig {
    pub dsn: String,

    // Connection pool overrides:
    #[serde(default)]
    pub pool: Option<PoolCfg>,

    /// Create missing parent directories for SQLite files (default: true).
    #[serde(default = "default_true")]
    pub create_sqlite_dirs: bool,
}

impl Default for DbConnConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite::memory:".to_string(),
            pool: None,
            create_sqlite_dirs: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PoolCfg {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    #[serde(with = "humantime_serde", default)]
    pub acquire_timeout: Option<Duration>,
    #[serde(with = "humantime_serde", default)]
    pub idle_timeout: Option<Duration>,
    #[serde(with = "humantime_serde", default)]
    pub max_lifetime: Option<Duration>,
    pub test_before_acquire: Option<bool>,
}

impl PoolCfg {
    /// Overlay the set fields on top of `opts`.
    pub fn apply(&self, mut opts: ConnectOpts) -> ConnectOpts {
        if let Some(max_conns) = self.max_conns {
            opts.max_conns = Some(max_conns);
        }
        if let Some(min_conns) = self.min_conns {
            opts.min_conns = Some(min_conns);
        }
        if let Some(acquire_timeout) = self.acquire_timeout {
            opts.acquire_timeout = Some(acquire_timeout);
        }
        if let Some(idle_timeout) = self.idle_timeout {
            opts.idle_timeout = Some(idle_timeout);
        }
        if let Some(max_lifetime) = self.max_lifetime {
            opts.max_lifetime = Some(max_lifetime);
        }
        if let Some(test_before_acquire) = self.test_before_acquire {
            opts.test_before_acquire = test_before_acquire;
        }
        opts
    }
}

impl DbConnConfig {
    /// Connection options: defaults overlaid with the `pool` section.
    pub fn connect_opts(&self) -> ConnectOpts {
        let base = ConnectOpts {
            create_sqlite_dirs: self.create_sqlite_dirs,
            ..ConnectOpts::default()
        };
        match &self.pool {
            Some(pool) => pool.apply(base),
            None => base,
        }
    }

    /// Expand a sqlite DSN into an absolute-path DSN using `base_dir`.
    /// - Keeps in-memory DSNs as-is.
    /// - Non-sqlite DSNs are returned unchanged.
    /// - Normalizes backslashes into forward slashes.
    pub fn resolve_dsn(&self, base_dir: &Path) -> Result<String> {
        let dsn = self.dsn.trim();
        if !dsn.starts_with("sqlite:") || crate::is_sqlite_memory(dsn) {
            return Ok(dsn.to_string());
        }

        let db_path = dsn
            .strip_prefix("sqlite://")
            .or_else(|| dsn.strip_prefix("sqlite:"))
            .unwrap_or(dsn);
        let (path_str, query) = match db_path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (db_path, None),
        };

        let mut p = PathBuf::from(path_str);
        if p.as_os_str().is_empty() {
            return Err(DbError::InvalidConfig(format!(
                "empty SQLite path in DSN '{dsn}'"
            )));
        }
        if p.is_relative() {
            p = base_dir.join(p);
        }

        let mut out = String::from("sqlite://");
        out.push_str(&p.to_string_lossy().replace('\\', "/"));
        if let Some(q) = query {
            out.push('?');
            out.push_str(q);
        }
        Ok(out)
    }
}
