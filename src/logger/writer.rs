//! Access log sink
//!
//! Access lines go to stdout or an append-only file. Diagnostic events are
//! handled by the tracing subscriber, see [`super::init`].

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global access log sink
static ACCESS_SINK: OnceLock<AccessSink> = OnceLock::new();

/// Access log output target
enum AccessSink {
    Stdout,
    File(Mutex<File>),
}

impl AccessSink {
    fn write_line(&self, line: &str) {
        match self {
            Self::Stdout => {
                let mut out = io::stdout().lock();
                let _ = writeln!(out, "{line}");
            }
            Self::File(file) => {
                // A poisoned lock drops the line rather than the request
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{line}");
                }
            }
        }
    }
}

/// Open or create a log file for appending
pub fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the access log sink. Called once at startup.
pub fn init(access_log_file: Option<&str>) -> io::Result<()> {
    let sink = match access_log_file {
        Some(path) => AccessSink::File(Mutex::new(open_log_file(path)?)),
        None => AccessSink::Stdout,
    };
    ACCESS_SINK.set(sink).map_err(|_| {
        io::Error::new(io::ErrorKind::AlreadyExists, "Access log already initialized")
    })
}

/// Write one access line; falls back to stdout before `init`
pub fn write_access(line: &str) {
    ACCESS_SINK
        .get()
        .unwrap_or(&AccessSink::Stdout)
        .write_line(line);
}
