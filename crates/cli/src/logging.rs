use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

const LOG_FILE_NAME: &str = "gridpad.log";

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gridpad")
        .join(LOG_FILE_NAME)
}

/// Route `log` records to a file. The terminal is owned by the TUI, so
/// nothing is written to stdout or stderr. Returns None (logging off) if the
/// log directory can't be created.
pub fn setup_logging(path: Option<&Path>) -> Option<WorkerGuard> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_log_path);
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| LOG_FILE_NAME.into());

    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Failed to create log directory {}: {}", dir.display(), e);
        return None;
    }

    // Append session separator to existing log file
    if let Ok(mut file) = OpenOptions::new().append(true).open(dir.join(&file_name)) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let _ = writeln!(file, "\n=== gridpad session {} ===\n", timestamp);
    }

    let file_appender = tracing_appender::rolling::never(&dir, &file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    // RUST_LOG overrides; default is info everywhere, debug for our crates
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,gridpad=debug"));

    // `try_init` also installs the log -> tracing bridge
    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Failed to install logger: {}", e);
        return None;
    }

    Some(guard)
}
