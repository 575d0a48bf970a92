//! Logging to the terminal and a dated log file
//!
//! Log lines go to stderr so command output on stdout stays pipeable.
//! When a log file is open every line is also appended with a timestamp.

use chrono::{Datelike, Local, NaiveDate, Timelike};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub(crate) static LOG_FILE: Mutex<Option<File>> = Mutex::new(None);

static QUIET: AtomicBool = AtomicBool::new(false);

const LOG_PREFIX: &str = "policy-report-";
const LOG_SUFFIX: &str = ".log";
const RETENTION_DAYS: i64 = 7;

/// Default log directory: `<data_dir>/policy-report/logs`
pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("policy-report").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// File name for a given day: policy-report-YYYY-MM-DD.log
pub fn log_file_name(date: NaiveDate) -> String {
    format!("{}{:04}-{:02}-{:02}{}", LOG_PREFIX, date.year(), date.month(), date.day(), LOG_SUFFIX)
}

/// Initialize logging - creates today's log file in `log_dir` and cleans old logs
pub fn init_logging(log_dir: &Path) -> Option<PathBuf> {
    if fs::create_dir_all(log_dir).is_err() {
        return None;
    }

    let today = Local::now().date_naive();
    remove_old_logs(log_dir, today);

    let log_path = log_dir.join(log_file_name(today));
    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => {
            if let Ok(mut guard) = LOG_FILE.lock() {
                *guard = Some(file);
            }
            Some(log_path)
        }
        Err(_) => None,
    }
}

/// Delete our log files dated more than a week before `today`
pub fn remove_old_logs(log_dir: &Path, today: NaiveDate) -> usize {
    let cutoff = today - chrono::Duration::days(RETENTION_DAYS);
    let mut removed = 0;

    if let Ok(entries) = fs::read_dir(log_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let date = path.file_name()
                .and_then(|n| n.to_str())
                .and_then(|name| name.strip_prefix(LOG_PREFIX))
                .and_then(|s| s.strip_suffix(LOG_SUFFIX))
                .and_then(|date_str| NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok());

            if let Some(date) = date {
                if date < cutoff && fs::remove_file(&path).is_ok() {
                    removed += 1;
                }
            }
        }
    }

    removed
}

/// Suppress the terminal copy of non-error lines
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

fn write_to_file(tag: &str, msg: &str) {
    let now = Local::now();
    let timestamp = format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second());

    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(ref mut file) = *guard {
            let _ = writeln!(file, "{} {}{}", timestamp, tag, msg);
        }
    }
}

/// Log to both terminal and file
pub fn log_both(msg: &str) {
    if !QUIET.load(Ordering::Relaxed) {
        eprintln!("{}", msg);
    }
    write_to_file("", msg);
}

/// Log error to both terminal and file
pub fn elog_both(msg: &str) {
    eprintln!("{}", msg);
    write_to_file("[ERROR] ", msg);
}

/// Macro for logging to both terminal and file
#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        $crate::logging::log_both(&format!($($arg)*))
    };
}

/// Macro for error logging to both terminal and file
#[macro_export]
macro_rules! elog {
    ($($arg:tt)*) => {
        $crate::logging::elog_both(&format!($($arg)*))
    };
}
