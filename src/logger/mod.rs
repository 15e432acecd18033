use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::panic::Location;
use std::sync::{Arc, Mutex, PoisonError};

use crate::level::Level;

const COLOR_RESET: &str = "\x1b[0m";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open log file {path}: {source}")]
    OpenLogFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("unknown log level {0:?}")]
    UnknownLevel(String),
}

/// Construction options for a [`Logger`]. All fields default to off/empty, so
/// `Options::default()` gives an unfiltered, uncolored, stdout-only logger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Module name prefixed to every line, hierarchical via `/`.
    pub module: String,
    /// Minimum level written; `None` disables filtering entirely.
    pub min_level: Option<Level>,
    /// Wrap the bracketed tag in ANSI color codes on stdout.
    pub color: bool,
    /// Path of the mirror file; the empty string means no file.
    pub file_path: String,
    /// Gates whether `file_path` is honored at all.
    pub mirror_to_file: bool,
    /// Drop the stdout copy of every line.
    pub suppress_stdout: bool,
}

/// Leveled line logger. Each call formats one line and writes it to stdout
/// and/or a shared append-only file, synchronously on the caller's thread.
#[derive(Clone)]
pub struct Logger {
    module: String,
    min_level: Option<Level>,
    color: bool,
    stdout: bool,
    file: Option<Arc<Mutex<File>>>,
}

impl Logger {
    /// Opens the mirror file (read/write, create, append) if one is
    /// configured. Open failure is returned, not fatal; aborting is the
    /// caller's choice.
    pub fn new(options: Options) -> Result<Self, Error> {
        let file = if options.mirror_to_file && !options.file_path.is_empty() {
            let file = OpenOptions::new()
                .read(true)
                .create(true)
                .append(true)
                .open(&options.file_path)
                .map_err(|source| Error::OpenLogFile {
                    path: options.file_path.clone(),
                    source,
                })?;
            Some(Arc::new(Mutex::new(file)))
        } else {
            None
        };

        Ok(Self {
            module: options.module,
            min_level: options.min_level,
            color: options.color,
            stdout: !options.suppress_stdout,
            file,
        })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn min_level(&self) -> Option<Level> {
        self.min_level
    }

    /// Derives a child logger named `parent/module`, sharing the minimum
    /// level, color flag, stdout flag, and the file writer with the parent.
    /// An empty `module` leaves the name unchanged.
    pub fn sub(&self, module: &str) -> Logger {
        let mut child = self.clone();
        if !module.is_empty() {
            child.module = format!("{}/{}", self.module, module);
        }
        child
    }

    /// Writes one line at `level`, or does nothing at all when `level` is
    /// below the configured minimum. Prefer the [`debugf!`](crate::debugf),
    /// [`infof!`](crate::infof), [`warnf!`](crate::warnf) and
    /// [`errorf!`](crate::errorf) macros for printf-style calls.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl Display) {
        if let Some(min) = self.min_level {
            if level < min {
                return;
            }
        }
        let caller = Location::caller();
        let now = Local::now();
        let message = message.to_string();

        if let Some(file) = &self.file {
            let line = self.file_line(level, caller, &now, &message);
            let mut file = file.lock().unwrap_or_else(PoisonError::into_inner);
            let _ = writeln!(file, "{line}");
        }
        if self.stdout {
            println!("{}", self.stdout_line(level, &now, &message));
        }
    }

    /// Bracket contents: `LEVEL` alone for an unnamed logger, else
    /// `module LEVEL`.
    fn tag(&self, level: Level) -> String {
        if self.module.is_empty() {
            level.as_str().to_string()
        } else {
            format!("{} {}", self.module, level)
        }
    }

    fn stdout_line(&self, level: Level, now: &DateTime<Local>, message: &str) -> String {
        let (start, reset) = if self.color && !level.color_code().is_empty() {
            (level.color_code(), COLOR_RESET)
        } else {
            ("", "")
        };
        format!(
            "{}{start} [{}]{reset} {message}",
            now.format("%H:%M:%S%.3f"),
            self.tag(level)
        )
    }

    /// File lines carry the caller location instead of ANSI codes, and a
    /// date-bearing timestamp.
    fn file_line(
        &self,
        level: Level,
        caller: &Location<'_>,
        now: &DateTime<Local>,
        message: &str,
    ) -> String {
        let file = caller.file();
        let file = file.rsplit(['/', '\\']).next().unwrap_or(file);
        format!(
            "{} {file}:{} [{}] {message}",
            now.format("%Y/%m/%d %H:%M:%S"),
            caller.line(),
            self.tag(level)
        )
    }
}

#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log($crate::Level::Debug, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log($crate::Level::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log($crate::Level::Warn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log($crate::Level::Error, format_args!($($arg)*))
    };
}
