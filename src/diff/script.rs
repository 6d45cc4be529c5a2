//! Edit script types
//!
//! An edit script is an ordered list of Keep / Delete / Insert operations.
//! Concatenating Keep + Delete text in order yields the base text;
//! concatenating Keep + Insert text in order yields the target text.
//!
//! Operation type is an explicit enum variant, never a sentinel integer.

use serde::{Deserialize, Serialize};

use crate::errors::{VersionError, VersionResult};

/// Operation kind, with the stable tag used by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperationKind {
    /// Text present in both base and target
    Keep = 0,
    /// Text present only in the base
    Delete = 1,
    /// Text present only in the target
    Insert = 2,
}

impl OperationKind {
    /// Convert from u8, returns None for values outside the defined set
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OperationKind::Keep),
            1 => Some(OperationKind::Delete),
            2 => Some(OperationKind::Insert),
            _ => None,
        }
    }

    /// Convert to u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Upper-case name, as used in diagnostics
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Keep => "KEEP",
            OperationKind::Delete => "DELETE",
            OperationKind::Insert => "INSERT",
        }
    }
}

/// A single edit operation carrying its text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "text", rename_all = "snake_case")]
pub enum Operation {
    Keep(String),
    Delete(String),
    Insert(String),
}

impl Operation {
    /// Build an operation from its kind and text
    pub fn new(kind: OperationKind, text: String) -> Self {
        match kind {
            OperationKind::Keep => Operation::Keep(text),
            OperationKind::Delete => Operation::Delete(text),
            OperationKind::Insert => Operation::Insert(text),
        }
    }

    #[inline]
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Keep(_) => OperationKind::Keep,
            Operation::Delete(_) => OperationKind::Delete,
            Operation::Insert(_) => OperationKind::Insert,
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        match self {
            Operation::Keep(t) | Operation::Delete(t) | Operation::Insert(t) => t,
        }
    }

    #[inline]
    pub fn is_keep(&self) -> bool {
        matches!(self, Operation::Keep(_))
    }

    /// Length of the operation text in Unicode scalar values
    pub fn char_len(&self) -> usize {
        self.text().chars().count()
    }
}

/// Change counts for an edit script, in Unicode scalar values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub additions: usize,
    pub deletions: usize,
    pub unchanged: usize,
}

impl DiffStats {
    /// Returns true when the script changes nothing
    pub fn is_unchanged(&self) -> bool {
        self.additions == 0 && self.deletions == 0
    }
}

/// An immutable, ordered edit script.
///
/// Every operation carries non-empty text. Scripts produced by the diff
/// engine are normalised: adjacent operations of the same kind are merged,
/// and within a run of edits the Delete precedes the Insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EditScript {
    operations: Vec<Operation>,
}

impl EditScript {
    /// The empty script (transforms "" into "").
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a script from raw operations, rejecting empty operation text.
    ///
    /// The operations are kept exactly as given (no merging), so a decoded
    /// script compares equal to the script that was encoded.
    pub fn from_operations(operations: Vec<Operation>) -> VersionResult<Self> {
        if let Some(index) = operations.iter().position(|op| op.text().is_empty()) {
            return Err(VersionError::invalid_argument(format!(
                "operation {} ({}) has empty text",
                index,
                operations[index].kind().as_str()
            )));
        }
        Ok(Self { operations })
    }

    /// Build a normalised script. Empty texts are dropped.
    pub(crate) fn normalized(operations: Vec<Operation>) -> Self {
        Self {
            operations: normalize(operations),
        }
    }

    /// Delete all of `base`, insert all of `target`.
    pub fn full_replacement(base: &str, target: &str) -> Self {
        let mut operations = Vec::with_capacity(2);
        if !base.is_empty() {
            operations.push(Operation::Delete(base.to_string()));
        }
        if !target.is_empty() {
            operations.push(Operation::Insert(target.to_string()));
        }
        Self { operations }
    }

    #[inline]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Consume the script, returning its operations.
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    /// True if the script contains only Keep operations.
    pub fn is_identity(&self) -> bool {
        self.operations.iter().all(Operation::is_keep)
    }

    /// The text this script expects to be applied to (Keep + Delete).
    pub fn base_text(&self) -> String {
        self.collect_text(|op| !matches!(op, Operation::Insert(_)))
    }

    /// The text this script produces (Keep + Insert).
    pub fn target_text(&self) -> String {
        self.collect_text(|op| !matches!(op, Operation::Delete(_)))
    }

    /// Byte length of the target text, without building it.
    pub fn target_len(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| !matches!(op, Operation::Delete(_)))
            .map(|op| op.text().len())
            .sum()
    }

    /// Bytes of Delete and Insert text: what the script changes.
    pub fn changed_bytes(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| !op.is_keep())
            .map(|op| op.text().len())
            .sum()
    }

    /// Addition / deletion / unchanged counts.
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for op in &self.operations {
            let len = op.char_len();
            match op {
                Operation::Keep(_) => stats.unchanged += len,
                Operation::Delete(_) => stats.deletions += len,
                Operation::Insert(_) => stats.additions += len,
            }
        }
        stats
    }

    fn collect_text(&self, include: impl Fn(&Operation) -> bool) -> String {
        let mut out = String::new();
        for op in self.operations.iter().filter(|op| include(op)) {
            out.push_str(op.text());
        }
        out
    }
}

/// Merge adjacent operations and order each edit run as Delete, Insert.
///
/// Reordering within a run is safe: deletes only consume base text and
/// inserts only produce target text, so their relative order inside a run
/// changes neither side.
pub(crate) fn normalize(operations: Vec<Operation>) -> Vec<Operation> {
    let mut out: Vec<Operation> = Vec::with_capacity(operations.len());
    let mut deleted = String::new();
    let mut inserted = String::new();

    fn flush(out: &mut Vec<Operation>, deleted: &mut String, inserted: &mut String) {
        if !deleted.is_empty() {
            out.push(Operation::Delete(std::mem::take(deleted)));
        }
        if !inserted.is_empty() {
            out.push(Operation::Insert(std::mem::take(inserted)));
        }
    }

    for op in operations {
        match op {
            Operation::Keep(text) => {
                if text.is_empty() {
                    continue;
                }
                flush(&mut out, &mut deleted, &mut inserted);
                match out.last_mut() {
                    Some(Operation::Keep(prev)) => prev.push_str(&text),
                    _ => out.push(Operation::Keep(text)),
                }
            }
            Operation::Delete(text) => deleted.push_str(&text),
            Operation::Insert(text) => inserted.push_str(&text),
        }
    }
    flush(&mut out, &mut deleted, &mut inserted);
    out
}
