//! File-based logging using simplelog
//!
//! Log file location depends on build type:
//! - Debug builds: current working directory (for development convenience)
//! - Release builds: cache directory (~/.cache/flux/ on Linux)

use anyhow::{Context, Result};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

/// Get the log file path based on build type
fn log_file_path() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let filename = format!("flux-demo-{}.log", timestamp);

    if cfg!(debug_assertions) {
        PathBuf::from(filename)
    } else {
        flux_storage::paths::cache_dir()
            .map(|dir| dir.join(&filename))
            .unwrap_or_else(|_| PathBuf::from(filename))
    }
}

/// Map a `RUST_LOG` value to a level, defaulting to Info
fn level_from_env(value: Option<&str>) -> LevelFilter {
    match value.map(str::to_lowercase).as_deref() {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Initialize file-based logging
///
/// Returns the path to the log file.
pub fn init() -> Result<PathBuf> {
    let log_file = log_file_path();
    let level = level_from_env(std::env::var("RUST_LOG").ok().as_deref());

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|c| c) // Fallback if local time offset fails
        .build();

    let file = File::create(&log_file)
        .with_context(|| format!("Failed to create log file: {:?}", log_file))?;

    WriteLogger::init(level, config, file).context("Failed to initialize logger")?;

    Ok(log_file)
}
