//! Structured JSONL logging.
//!
//! Stdout carries the rendered changelog, so log records go to a file, or to
//! stderr when no log file can be opened. Never to stdout.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "CHANGELING_LOG_PATH";
const ENV_LOG_DIR: &str = "CHANGELING_LOG_DIR";
const LOG_FILE_SUFFIX: &str = ".jsonl";

/// Where and under which name logs are written.
#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    /// Service name, used for the log file name.
    pub service: String,
    /// Directory for JSONL log files, from configuration.
    pub log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Build from the package name and an optional configured directory.
    pub fn new(log_dir: Option<PathBuf>) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            log_dir,
        }
    }
}

/// Keeps the background log writer alive; drop it last.
pub struct ObservabilityGuard {
    _log_guard: WorkerGuard,
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails only if a global subscriber is already installed.
pub fn init_observability(
    cfg: &ObservabilityConfig,
    env_filter: EnvFilter,
) -> Result<ObservabilityGuard> {
    let (writer, guard) = match open_log_writer(&cfg.service, cfg.log_dir.as_deref()) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("Warning: {err}. Falling back to stderr logging.");
            tracing_appender::non_blocking(std::io::stderr())
        }
    };

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(true)
        .with_ansi(false)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .try_init()
        .context("a global tracing subscriber is already set")?;

    tracing::debug!(service = %cfg.service, "observability initialized");
    Ok(ObservabilityGuard { _log_guard: guard })
}

/// Pick the log filter from CLI flags.
///
/// `-q` wins over `-v`; without either, `RUST_LOG` wins over the configured
/// level.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    match (quiet, verbose) {
        (true, _) => EnvFilter::new("error"),
        (false, 0) => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
        }
        (false, 1) => EnvFilter::new("debug"),
        (false, _) => EnvFilter::new("trace"),
    }
}

fn open_log_writer(service: &str, config_dir: Option<&Path>) -> Result<(NonBlocking, WorkerGuard)> {
    let sources = LogSources {
        path: std::env::var_os(ENV_LOG_PATH).map(PathBuf::from),
        dir: std::env::var_os(ENV_LOG_DIR).map(PathBuf::from),
        config_dir: config_dir.map(Path::to_path_buf),
    };
    let file = sources.resolve(service)?;

    let appender = tracing_appender::rolling::daily(&file.dir, &file.name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Candidate log locations, highest precedence first.
#[derive(Debug, Default)]
struct LogSources {
    path: Option<PathBuf>,
    dir: Option<PathBuf>,
    config_dir: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
struct LogFile {
    dir: PathBuf,
    name: String,
}

impl LogSources {
    fn resolve(self, service: &str) -> Result<LogFile> {
        let default_name = format!("{service}{LOG_FILE_SUFFIX}");

        if let Some(path) = self.path {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .with_context(|| format!("{ENV_LOG_PATH} must end in a UTF-8 file name"))?
                .to_string();
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            return LogFile::writable(dir, name);
        }

        if let Some(dir) = self.dir.or(self.config_dir) {
            return LogFile::writable(dir, default_name);
        }

        let candidates = directories::ProjectDirs::from("", "", service)
            .map(|dirs| dirs.data_local_dir().join("logs"))
            .into_iter()
            .chain(std::env::current_dir().ok());

        candidates
            .filter_map(|dir| LogFile::writable(dir, default_name.clone()).ok())
            .next()
            .context("no writable log directory found")
    }
}

impl LogFile {
    fn writable(dir: PathBuf, name: String) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
        let path = dir.join(&name);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        Ok(Self { dir, name })
    }
}
