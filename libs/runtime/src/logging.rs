use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::{level_filters::LevelFilter, Level};
use tracing_subscriber::{filter::Targets, fmt};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_AGE_DAYS: u32 = 7;

// -------- level helpers --------
fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

fn level_filter(s: &str) -> LevelFilter {
    parse_tracing_level(s).map_or(LevelFilter::OFF, LevelFilter::from_level)
}

/// Returns true if target == crate_name or target starts with "crate_name::"
fn matches_crate_prefix(target: &str, crate_name: &str) -> bool {
    target == crate_name
        || (target.starts_with(crate_name) && target[crate_name.len()..].starts_with("::"))
}

// -------- rotating writer for files --------
#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file writer poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file writer poisoned"))?
            .flush()
    }
}

// A writer that may be None (drops writes)
struct RoutedWriter(Option<RotWriter>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Route records to per-crate files by target prefix, falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<RotWriter>,
    by_prefix: HashMap<String, RotWriter>,
}

impl FileRouter {
    fn resolve_for(&self, target: &str) -> Option<RotWriter> {
        self.by_prefix
            .iter()
            .find(|(name, _)| matches_crate_prefix(target, name))
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.resolve_for(meta.target()))
    }
}

// -------- path resolution helpers --------

/// Resolve a log file path against `base_dir` (home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Create a rotating writer, ensuring the parent directory exists.
fn create_rotating_writer(
    section: &Section,
    base_dir: &Path,
) -> Result<RotWriter, Box<dyn std::error::Error + Send + Sync>> {
    let log_path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let file_limit = match section.max_backups {
        Some(n) => FileLimit::MaxFiles(n),
        None => FileLimit::Age(chrono::Duration::days(i64::from(
            section.max_age_days.unwrap_or(DEFAULT_MAX_AGE_DAYS),
        ))),
    };

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(file_limit),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None, // file permissions (Unix only)
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

// -------- filter construction --------

/// Console filter: "default" section sets the fallback level, other keys are crate targets.
fn console_targets(cfg: &LoggingConfig) -> Targets {
    let mut targets = Targets::new().with_default(
        cfg.get("default")
            .map_or(LevelFilter::INFO, |s| level_filter(&s.console_level)),
    );
    for (name, section) in cfg.iter().filter(|(k, _)| k.as_str() != "default") {
        targets = targets.with_target(name.clone(), level_filter(&section.console_level));
    }
    targets
}

/// File filter: only sections with a file sink contribute.
fn file_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get("default")
        .filter(|s| !s.file.trim().is_empty())
        .map_or(LevelFilter::OFF, |s| level_filter(&s.file_level));

    let mut targets = Targets::new().with_default(default);
    for (name, section) in cfg.iter().filter(|(k, _)| k.as_str() != "default") {
        let level = if section.file.trim().is_empty() {
            // routed to the default file, if any
            default.min(level_filter(&section.file_level))
        } else {
            level_filter(&section.file_level)
        };
        targets = targets.with_target(name.clone(), level);
    }
    targets
}

fn build_file_router(cfg: &LoggingConfig, base_dir: &Path) -> FileRouter {
    let mut router = FileRouter::default();

    for (name, section) in cfg {
        if section.file.trim().is_empty() {
            continue;
        }
        match create_rotating_writer(section, base_dir) {
            Ok(writer) if name == "default" => router.default = Some(writer),
            Ok(writer) => {
                router.by_prefix.insert(name.clone(), writer);
            }
            Err(e) => eprintln!(
                "Failed to init log file for '{}': {} ({})",
                name,
                resolve_log_path(&section.file, base_dir).display(),
                e
            ),
        }
    }

    router
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: LoggingConfig containing the logging sections
/// - `base_dir`: base directory used to resolve relative log file paths (usually home_dir)
///
/// Console output goes to stderr so that command output on stdout stays machine-readable.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, prelude::*, Registry};

    // Bridge `log` → `tracing` *before* installing the subscriber
    let _ = tracing_log::LogTracer::init();

    let ansi = std::io::stderr().is_terminal();
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let router = build_file_router(cfg, base_dir);
    if router.is_empty() {
        let _ = Registry::default().with(console_layer).try_init();
        return;
    }

    let file_layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_writer(router)
        .with_filter(file_targets(cfg));

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

// =================== tests ===================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_age_days: None,
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn test_logging_level_parsing() {
        assert_eq!(parse_tracing_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_tracing_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_tracing_level("Info"), Some(Level::INFO));
        assert_eq!(parse_tracing_level("warn"), Some(Level::WARN));
        assert_eq!(parse_tracing_level("ERROR"), Some(Level::ERROR));
        assert_eq!(parse_tracing_level("off"), None);
        assert_eq!(parse_tracing_level("none"), None);
        assert_eq!(parse_tracing_level("invalid"), Some(Level::INFO)); // defaults to INFO
    }

    #[test]
    fn test_crate_prefix_matching() {
        assert!(matches_crate_prefix("query_db", "query_db"));
        assert!(matches_crate_prefix("query_db::paging", "query_db"));
        assert!(!matches_crate_prefix("query_dbx", "query_db"));
        assert!(!matches_crate_prefix("members", "query_db"));
    }

    #[test]
    fn test_console_targets_levels() {
        let mut cfg = default_logging_config();
        cfg.insert("query_db".into(), section("trace", "", "off"));
        cfg.insert("members".into(), section("off", "", "off"));

        let targets = console_targets(&cfg);
        assert!(targets.would_enable("query_db::paging", &Level::TRACE));
        assert!(!targets.would_enable("members::domain", &Level::ERROR));
        assert!(targets.would_enable("sqlx::query", &Level::INFO));
        assert!(!targets.would_enable("sqlx::query", &Level::DEBUG));
    }

    #[test]
    fn test_file_targets_without_default_file() {
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section("info", "", "debug"));
        cfg.insert("query_db".into(), section("info", "logs/db.log", "debug"));

        let targets = file_targets(&cfg);
        assert!(targets.would_enable("query_db", &Level::DEBUG));
        assert!(!targets.would_enable("members", &Level::ERROR));
    }

    #[test]
    fn test_file_paths_resolved_against_home_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));

        let abs = tmp.path().join("abs.log");
        assert_eq!(resolve_log_path(&abs.to_string_lossy(), Path::new("/x")), abs);
    }

    #[test]
    fn test_file_router_creates_writers() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section("info", "nested/app.log", "debug"));
        cfg.insert("query_db".into(), section("info", "nested/db.log", "debug"));
        cfg.insert("members".into(), section("info", "", "debug"));

        let router = build_file_router(&cfg, tmp.path());
        assert!(router.default.is_some());
        assert_eq!(router.by_prefix.len(), 1);
        assert!(tmp.path().join("nested").exists(), "parent dir must be created");

        assert!(router.resolve_for("query_db::paging").is_some());
        // unrouted targets fall back to the default file
        assert!(router.resolve_for("members::domain").is_some());
    }
}
