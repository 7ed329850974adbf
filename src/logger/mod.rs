//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Leveled error, warning, info and debug messages
//! - File-based logging support
//!
//! Responders never log; the router and server loop are the only callers.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{Config, LOG_LEVELS};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Index into `LOG_LEVELS` of the most verbose level still written
static MAX_LEVEL: AtomicUsize = AtomicUsize::new(2);

const ERROR: usize = 0;
const WARN: usize = 1;
const INFO: usize = 2;
const DEBUG: usize = 3;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    if let Some(level) = LOG_LEVELS.iter().position(|l| *l == config.logging.level) {
        MAX_LEVEL.store(level, Ordering::Relaxed);
    }
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn enabled(level: usize) -> bool {
    level <= MAX_LEVEL.load(Ordering::Relaxed)
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(writer) => writer.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    if !enabled(INFO) {
        return;
    }
    write_info("======================================");
    write_info("pagekit started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    for mount in &config.mounts {
        write_info(&format!("Mount: {} -> {}", mount.url_prefix, mount.directory));
    }
    if let Some(path) = config.error_path() {
        write_info(&format!("Error page: {path}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================");
}

pub fn log_server_stop() {
    log_info("Shutdown signal received, no longer accepting connections");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    if enabled(ERROR) {
        write_error(&format!("[ERROR] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(WARN) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_info(message: &str) {
    if enabled(INFO) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if enabled(DEBUG) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
