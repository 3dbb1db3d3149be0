use anyhow::{Context, Result};
use query_db::DbConnConfig;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Application configuration: strongly-typed global sections plus a
/// per-module configuration bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base directory for relative SQLite paths and log files.
    /// Empty means `$HOME/.members`; normalized to an absolute path on load.
    #[serde(default)]
    pub home_dir: String,
    /// Database connection (optional, in-memory SQLite if None).
    pub database: Option<DbConnConfig>,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
    /// Per-module configuration bag: module_name → arbitrary JSON/YAML value.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/members.log"; empty disables the file sink
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_age_days: Option<u32>,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

const DEFAULT_HOME_SUBDIR: &str = ".members";

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/members.log".to_string(),
            file_level: "debug".to_string(),
            max_age_days: Some(7),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            database: Some(DbConnConfig {
                dsn: "sqlite://database/members.db".to_string(),
                ..DbConnConfig::default()
            }),
            logging: Some(default_logging_config()),
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    /// Also normalizes `home_dir` into an absolute path and creates the directory.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let config_path = config_path.as_ref();
        if !config_path.exists() {
            anyhow::bail!("config file not found: {}", config_path.display());
        }

        // Optional sections stay None unless YAML/ENV provide them.
        let base = AppConfig {
            home_dir: String::new(),
            database: None,
            logging: None,
            modules: HashMap::new(),
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path))
            // Example: APP__DATABASE__DSN=sqlite::memory: maps to database.dsn
            .merge(Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

        normalize_home_dir_inplace(&mut config).context("Failed to resolve home_dir")?;

        Ok(config)
    }

    /// Load configuration from file or fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c = Self::default();
                normalize_home_dir_inplace(&mut c)
                    .context("Failed to resolve home_dir (defaults)")?;
                Ok(c)
            }
        }
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Typed view of one module's configuration; missing sections yield `T::default()`.
    pub fn module_config<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(name) {
            Some(raw) => serde_json::from_value(raw.clone())
                .with_context(|| format!("Invalid configuration for module '{name}'")),
            None => Ok(T::default()),
        }
    }

    /// Database section, defaulting to in-memory SQLite.
    pub fn database_or_default(&self) -> DbConnConfig {
        self.database.clone().unwrap_or_default()
    }

    pub fn home_path(&self) -> PathBuf {
        PathBuf::from(&self.home_dir)
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        // Verbose flags raise the console level of the "default" section.
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            default_section.console_level = match args.verbose {
                0 => default_section.console_level.clone(), // keep
                1 => "debug".to_string(),
                _ => "trace".to_string(),
            };
        }
    }
}

/// Command line arguments relevant to configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub print_config: bool,
    pub verbose: u8,
}

/// Resolve `home_dir` (empty, `~/...`, relative or absolute) to an absolute path and create it.
fn normalize_home_dir_inplace(config: &mut AppConfig) -> Result<()> {
    let raw = config.home_dir.trim();

    let resolved: PathBuf = if raw.is_empty() {
        dirs::home_dir()
            .context("cannot determine the user home directory")?
            .join(DEFAULT_HOME_SUBDIR)
    } else if let Some(rest) = raw.strip_prefix("~/") {
        dirs::home_dir()
            .context("cannot expand '~' in home_dir")?
            .join(rest)
    } else {
        let p = PathBuf::from(raw);
        if p.is_absolute() {
            p
        } else {
            std::env::current_dir()?.join(p)
        }
    };

    std::fs::create_dir_all(&resolved)
        .with_context(|| format!("cannot create home_dir {}", resolved.display()))?;
    config.home_dir = resolved.to_string_lossy().to_string();
    Ok(())
}
