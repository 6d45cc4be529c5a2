//! Chain audit
//!
//! Reconstructs and verifies every version of a chain, collecting failures
//! instead of stopping at the first one. `last_good` is the highest
//! version that verified with every earlier version verifying too; it is
//! the point a repository can safely re-snapshot from.

use crate::errors::{VersionError, VersionErrorCode};
use crate::reconstruct::{reconstruct_version_with, ReconstructOptions};
use crate::version::{SequenceNumber, VersionRecord};

/// One version that failed the audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFailure {
    pub sequence_number: SequenceNumber,
    pub error: VersionError,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuditReport {
    pub versions_checked: usize,
    pub failures: Vec<AuditFailure>,
    pub last_good: Option<SequenceNumber>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn first_failure(&self) -> Option<&AuditFailure> {
        self.failures.first()
    }

    /// True if any failure indicates damaged data rather than a bad request.
    pub fn has_corruption(&self) -> bool {
        self.failures.iter().any(|f| f.error.is_corruption())
    }

    /// Failures with the given code.
    pub fn failures_with(&self, code: VersionErrorCode) -> impl Iterator<Item = &AuditFailure> {
        self.failures.iter().filter(move |f| f.error.code() == code)
    }
}

pub(crate) fn audit(chain: &[VersionRecord], options: &ReconstructOptions) -> AuditReport {
    let mut report = AuditReport::default();
    let mut expected = SequenceNumber::FIRST;
    let mut intact = true;

    for record in chain {
        let sequence_number = record.sequence_number();
        report.versions_checked += 1;

        let result = if sequence_number != expected {
            Err(VersionError::invalid_argument(format!(
                "expected version {}, found {}",
                expected, sequence_number
            )))
        } else if sequence_number == SequenceNumber::FIRST && !record.is_snapshot() {
            Err(VersionError::invalid_argument("version 1 must be a snapshot"))
        } else {
            reconstruct_version_with(chain, sequence_number, options).map(|_| ())
        };

        match result {
            Ok(()) if intact => report.last_good = Some(sequence_number),
            Ok(()) => {}
            Err(error) => {
                intact = false;
                report.failures.push(AuditFailure {
                    sequence_number,
                    error,
                });
            }
        }

        expected = match sequence_number.next() {
            Ok(next) => next,
            Err(_) => break,
        };
    }

    report
}
