//! Observability for the `pagevault` binary
//!
//! Structured JSON log lines on stderr, one per typed [`Event`]. The
//! version engine itself never logs: it returns errors and the binary
//! decides what to report.
//!
//! ```ignore
//! use pagevault::observability::{log_event, Event};
//!
//! log_event(Event::VersionRecorded, &[("sequence_number", "4"), ("kind", "delta")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a typed event at its own severity.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // Verifies no panic
        log_event(Event::ChainLoaded, &[("path", "/tmp/chain.json")]);
        log_event(Event::IntegrityFailure, &[]);
    }

    #[test]
    fn test_event_line_uses_event_severity() {
        let event = Event::DiffFallback;
        let line = logger::capture_log(event.severity(), event.as_str(), &[]);
        assert!(line.contains("\"severity\":\"WARN\""));
    }
}
