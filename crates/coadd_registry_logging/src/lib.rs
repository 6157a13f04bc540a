//! Logging setup for the coadd registry tools.
//!
//! Every diagnostic goes to stderr. A log file can be attached on top; it
//! receives the same events without ANSI colouring.

use anyhow::{Context, Result};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "coadd_registry=info,coadd_registry_db=info";
const VERBOSE_LOG_FILTER: &str = "coadd_registry=debug,coadd_registry_db=debug";

/// Logging configuration for the registry binaries.
pub struct LogConfig<'a> {
    /// Widen the default filter to debug. `RUST_LOG` still wins when set.
    pub verbose: bool,
    /// Append a copy of every event to this file.
    pub log_file: Option<&'a Path>,
}

/// Initialize tracing with stderr output and an optional file layer.
///
/// The returned guard flushes the file writer when dropped; hold it until
/// the program exits.
pub fn init_logging(config: LogConfig<'_>) -> Result<Option<WorkerGuard>> {
    let mut log_guard: Option<WorkerGuard> = None;
    let file_layer = match config.log_file {
        Some(path) => {
            let (dir, file_name) = split_log_path(path)?;
            let file_appender = tracing_appender::rolling::never(dir, file_name);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            log_guard = Some(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_filter(log_filter(config.verbose)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_target(false)
                .with_filter(log_filter(config.verbose)),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(log_guard)
}

fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        })
    })
}

/// Split a log path into the directory the appender writes into and the
/// file name it appends to. A bare file name lives in the working directory.
fn split_log_path(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.is_dir() {
        anyhow::bail!("Log directory does not exist: {}", dir.display());
    }
    Ok((dir, PathBuf::from(file_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_split_log_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("build.log");

        let (dir, file_name) = split_log_path(&path).unwrap();
        assert_eq!(dir, tmp.path());
        assert_eq!(file_name, PathBuf::from("build.log"));
    }

    #[test]
    fn test_bare_file_name_uses_working_directory() {
        let (dir, file_name) = split_log_path(Path::new("build.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file_name, PathBuf::from("build.log"));
    }

    #[test]
    fn test_missing_parent_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("build.log");
        assert!(split_log_path(&path).is_err());
    }

    #[test]
    fn test_appender_appends_to_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("build.log");
        std::fs::write(&path, "earlier run\n").unwrap();

        let (dir, file_name) = split_log_path(&path).unwrap();
        let mut appender = tracing_appender::rolling::never(dir, file_name);
        appender.write_all(b"r ... started\n").unwrap();
        appender.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "earlier run\nr ... started\n");
    }
}
