//! Protocol Log
//!
//! Every inbound command, outbound response and error condition is handed
//! to a [`LogSink`]. Sinks only decide where the line goes; the caller
//! formats the message.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;

/// Which side of the protocol wrote a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Client => f.write_str("CLIENT"),
            Role::Server => f.write_str("SERVER"),
        }
    }
}

/// Append-only destination for protocol log lines
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str);
}

impl<L: LogSink + ?Sized> LogSink for &L {
    fn log(&self, message: &str) {
        (**self).log(message)
    }
}

impl<L: LogSink + ?Sized> LogSink for Arc<L> {
    fn log(&self, message: &str) {
        (**self).log(message)
    }
}

/// File sink when a path is configured, tracing otherwise
pub fn open_sink(log_file: Option<&Path>, role: Role) -> Arc<dyn LogSink> {
    match log_file {
        Some(path) => Arc::new(FileLog::new(path, role)),
        None => Arc::new(TracingLog::new(role)),
    }
}

// =============================================================================
// Tracing
// =============================================================================

/// Forwards protocol lines to `tracing` at INFO level
#[derive(Debug, Clone, Copy)]
pub struct TracingLog {
    role: Role,
}

impl TracingLog {
    pub fn new(role: Role) -> Self {
        Self { role }
    }
}

impl LogSink for TracingLog {
    fn log(&self, message: &str) {
        tracing::info!(role = %self.role, "{}", message);
    }
}

// =============================================================================
// File
// =============================================================================

/// Appends `ROLE - [HH:MM:SS dd/mm/YYYY] - message` lines to a file
///
/// The file is opened per line so several processes can share it.
#[derive(Debug, Clone)]
pub struct FileLog {
    path: PathBuf,
    role: Role,
}

impl FileLog {
    /// Timestamp layout of each line
    pub const TIMESTAMP_FORMAT: &'static str = "%H:%M:%S %d/%m/%Y";

    pub fn new(path: impl Into<PathBuf>, role: Role) -> Self {
        Self {
            path: path.into(),
            role,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, message: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let timestamp = chrono::Local::now().format(Self::TIMESTAMP_FORMAT);
        writeln!(file, "{} - [{}] - {}", self.role, timestamp, message)?;
        Ok(())
    }
}

impl LogSink for FileLog {
    fn log(&self, message: &str) {
        // Logging never takes the session down
        if let Err(e) = self.append(message) {
            tracing::warn!("Error writing log file {}: {}", self.path.display(), e);
        }
    }
}

// =============================================================================
// Memory
// =============================================================================

/// Keeps every line in memory, mostly for tests
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines logged so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// True if any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }
}

impl LogSink for MemoryLog {
    fn log(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }
}
