//! JSON-lines logger for ingestion events
//!
//! One line per event: `event`, then `severity`, then the caller's fields in
//! key order. ERROR and FATAL go to stderr, everything else to stdout. A
//! process-wide threshold, set from the config `log_level`, hides the lower
//! severities so scripted callers can read the outcome line alone.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

/// Log severity levels, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Trace,
    Info,
    /// Rejected requests
    Warn,
    /// Infrastructure failures
    Error,
    /// Batch log corruption
    Fatal,
}

const LEVELS: [Severity; 5] = [
    Severity::Trace,
    Severity::Info,
    Severity::Warn,
    Severity::Error,
    Severity::Fatal,
];

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// ERROR and FATAL: never filtered, written to stderr.
    fn is_failure(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LEVELS
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown log level '{}'", s.to_ascii_lowercase()))
    }
}

static THRESHOLD: AtomicU8 = AtomicU8::new(Severity::Info as u8);

/// One rendered log line.
#[derive(Serialize)]
struct LogLine<'a> {
    event: &'a str,
    severity: Severity,
    #[serde(flatten)]
    fields: BTreeMap<&'a str, &'a str>,
}

impl<'a> LogLine<'a> {
    /// Fields named `event` or `severity` are dropped. For repeated keys the
    /// last value wins.
    fn new(severity: Severity, event: &'a str, fields: &[(&'a str, &'a str)]) -> Self {
        let fields = fields
            .iter()
            .copied()
            .filter(|(key, _)| !matches!(*key, "event" | "severity"))
            .collect();
        Self {
            event,
            severity,
            fields,
        }
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        serde_json::to_writer(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

/// Process-wide structured logger
pub struct Logger;

impl Logger {
    /// Sets the lowest severity that is written. ERROR and FATAL always are.
    pub fn set_min_severity(severity: Severity) {
        THRESHOLD.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity() -> Severity {
        let stored = THRESHOLD.load(Ordering::Relaxed) as usize;
        LEVELS.get(stored).copied().unwrap_or(Severity::Fatal)
    }

    fn enabled(severity: Severity) -> bool {
        severity.is_failure() || severity >= Self::min_severity()
    }

    /// Writes one event line if `severity` passes the threshold.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }
        let line = LogLine::new(severity, event, fields);
        // A lost log line never changes an ingestion outcome.
        let _ = if severity.is_failure() {
            line.write_to(&mut io::stderr().lock())
        } else {
            line.write_to(&mut io::stdout().lock())
        };
    }
}

#[cfg(test)]
fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    LogLine::new(severity, event, fields)
        .write_to(&mut buffer)
        .unwrap();
    String::from_utf8(buffer).unwrap()
}
