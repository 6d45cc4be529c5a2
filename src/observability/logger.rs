//! Structured JSON logger
//!
//! - One line per event, written synchronously
//! - `event` first, then `severity`, then fields sorted by key
//! - Everything goes to stderr; stdout belongs to command output
//!
//! Only the `pagevault` binary logs. The library returns errors and
//! leaves logging to its caller.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace = 0,
    Info = 1,
    /// Recoverable issue; the command still succeeds
    Warn = 2,
    /// Operation failed
    Error = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One log line: `event` and `severity` lead, fields follow in key order.
#[derive(Serialize)]
struct LogRecord<'a> {
    event: &'a str,
    severity: &'static str,
    #[serde(flatten)]
    fields: BTreeMap<&'a str, &'a str>,
}

/// Structured logger writing JSON lines.
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        Self::log_to_writer(severity, event, fields, &mut io::stderr());
    }

    pub(crate) fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        // A failed log write must never fail the command.
        let Ok(line) = Self::format_line(severity, event, fields) else {
            return;
        };
        let _ = writer.write_all(&line);
        let _ = writer.flush();
    }

    fn format_line(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
    ) -> serde_json::Result<Vec<u8>> {
        let record = LogRecord {
            event,
            severity: severity.as_str(),
            fields: fields.iter().copied().collect(),
        };
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        Ok(line)
    }
}

#[cfg(test)]
pub(crate) fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::log_to_writer(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn test_log_json_format() {
        let output = capture_log(Severity::Info, "VERSION_RECORDED", &[("sequence_number", "3")]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["event"], "VERSION_RECORDED");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["sequence_number"], "3");
    }

    #[test]
    fn test_log_deterministic_ordering() {
        let output1 = capture_log(Severity::Info, "TEST", &[("zebra", "1"), ("apple", "2")]);
        let output2 = capture_log(Severity::Info, "TEST", &[("apple", "2"), ("zebra", "1")]);
        assert_eq!(output1, output2);
        assert!(output1.find("apple").unwrap() < output1.find("zebra").unwrap());
    }

    #[test]
    fn test_log_escapes_special_chars() {
        let output = capture_log(
            Severity::Error,
            "INTEGRITY_FAILURE",
            &[("message", "expected \"a\"\nline2\u{1}")],
        );
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["message"], "expected \"a\"\nline2\u{1}");
    }

    #[test]
    fn test_log_repeated_key_keeps_last_value() {
        let output = capture_log(Severity::Info, "TEST", &[("path", "a"), ("path", "b")]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["path"], "b");
        assert_eq!(output.matches("\"path\"").count(), 1);
    }

    #[test]
    fn test_log_one_line_event_first() {
        let output = capture_log(Severity::Warn, "MY_EVENT", &[("a", "1"), ("b", "2")]);
        assert_eq!(output.matches('\n').count(), 1);
        assert!(output.starts_with("{\"event\":\"MY_EVENT\",\"severity\":\"WARN\""));
    }
}
