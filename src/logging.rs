//! `tracing` subscriber setup.
//!
//! Filtering comes from `RUST_LOG`; with it unset only errors are recorded.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Log to stderr. Used by the headless `run` command.
pub fn init_stderr() {
    // A second init (e.g. from tests) leaves the first subscriber in place.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

/// Log to `path` through a non-blocking writer so the TUI's screen is never
/// written to. Keep the returned guard alive until exit to flush the file.
pub fn init_file(path: &Path) -> io::Result<Option<WorkerGuard>> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log path has no UTF-8 file name: {}", path.display()),
        ));
    };
    std::fs::create_dir_all(dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .map_err(io::Error::other)?;
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        // Global subscriber already installed; drop guard so writer shuts down.
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_as_log_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(init_file(dir.path()).is_err());
    }

    #[test]
    fn path_without_file_name_is_an_error() {
        let err = init_file(Path::new("/")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
