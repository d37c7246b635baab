use anyhow::{Context, Result};
use simplelog::{Config, ConfigBuilder, LevelFilter, WriteLogger};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub fn log_file_path(executable: &Path) -> PathBuf {
    let mut path = OsString::from(executable.as_os_str());
    path.push(".log");
    PathBuf::from(path)
}

// Bare messages, and only from this crate.
pub fn config() -> Config {
    ConfigBuilder::new()
        .set_max_level(LevelFilter::Off)
        .set_time_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_location_level(LevelFilter::Off)
        .add_filter_allow_str("gedcom_fetch")
        .build()
}

pub fn init(log_file: &Path) -> Result<()> {
    let file = fs::File::create(log_file)
        .with_context(|| format!("Failed to create log file {:?}", log_file))?;

    WriteLogger::init(LevelFilter::Debug, config(), file)
        .context("Failed to install logger")?;

    Ok(())
}

pub fn shutdown() {
    log::logger().flush();
}
