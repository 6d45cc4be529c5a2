//! Typed events logged by the `pagevault` binary

use std::fmt;

use super::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration loaded (or defaults applied)
    ConfigLoaded,
    /// Chain file read and structurally validated
    ChainLoaded,
    /// Chain file written
    ChainSaved,
    /// New version appended
    VersionRecorded,
    /// New version stored as a snapshot for a reason other than being first
    SnapshotForced,
    /// Diff exceeded the edit distance cap; full replacement used
    DiffFallback,
    /// Version reconstructed and verified
    VersionRead,
    /// Reconstruction refused: hash mismatch or broken delta
    IntegrityFailure,
    /// Chain audit started
    AuditStart,
    /// Chain audit finished
    AuditComplete,
    /// Earlier version made current again
    RestoreComplete,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ChainLoaded => "CHAIN_LOADED",
            Event::ChainSaved => "CHAIN_SAVED",
            Event::VersionRecorded => "VERSION_RECORDED",
            Event::SnapshotForced => "SNAPSHOT_FORCED",
            Event::DiffFallback => "DIFF_FALLBACK",
            Event::VersionRead => "VERSION_READ",
            Event::IntegrityFailure => "INTEGRITY_FAILURE",
            Event::AuditStart => "AUDIT_BEGIN",
            Event::AuditComplete => "AUDIT_COMPLETE",
            Event::RestoreComplete => "RESTORE_COMPLETE",
        }
    }

    /// Severity the event is logged at.
    pub fn severity(&self) -> Severity {
        match self {
            Event::IntegrityFailure => Severity::Error,
            Event::DiffFallback => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::ChainLoaded,
            Event::ChainSaved,
            Event::VersionRecorded,
            Event::SnapshotForced,
            Event::DiffFallback,
            Event::VersionRead,
            Event::IntegrityFailure,
            Event::AuditStart,
            Event::AuditComplete,
            Event::RestoreComplete,
        ];
        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::IntegrityFailure.severity(), Severity::Error);
        assert_eq!(Event::DiffFallback.severity(), Severity::Warn);
        assert_eq!(Event::VersionRecorded.severity(), Severity::Info);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::AuditStart), "AUDIT_BEGIN");
    }
}
