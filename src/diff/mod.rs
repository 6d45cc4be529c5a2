//! Diff engine
//!
//! Computes an edit script between two text states. Pure functions, no
//! shared state; safe to call from any number of threads.
//!
//! Pipeline:
//! 1. Strip the common prefix and suffix (kept verbatim)
//! 2. Myers shortest edit over the remaining middle, in Unicode scalars
//! 3. Normalise runs (Delete before Insert, adjacent ops merged)
//! 4. Optional semantic cleanup of stray equalities
//!
//! When a distance cap is configured and the middle needs more edits than
//! the cap allows, the result is a full replacement (Delete all, Insert all)
//! and the outcome says so explicitly via [`DiffStrategy::FullReplacement`].

mod cleanup;
mod myers;
mod script;

pub use script::{DiffStats, EditScript, Operation, OperationKind};

use serde::{Deserialize, Serialize};

/// Options controlling a diff computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    /// Upper bound on the Myers edit distance; `None` is unbounded.
    pub max_edit_distance: Option<usize>,
    /// Dissolve short equalities between larger edits.
    pub semantic_cleanup: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            max_edit_distance: None,
            semantic_cleanup: true,
        }
    }
}

impl DiffOptions {
    /// Plain minimal Myers output, unbounded.
    pub fn minimal() -> Self {
        Self {
            max_edit_distance: None,
            semantic_cleanup: false,
        }
    }

    /// Cap the edit distance.
    pub fn with_max_edit_distance(mut self, max: usize) -> Self {
        self.max_edit_distance = Some(max);
        self
    }
}

/// How an edit script was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStrategy {
    /// Myers search completed within the distance cap.
    Myers,
    /// Distance cap exceeded; the script deletes everything and inserts everything.
    FullReplacement,
}

/// Result of a diff computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOutcome {
    pub script: EditScript,
    pub strategy: DiffStrategy,
    /// Myers edit distance over the differing middle; `None` on fallback.
    pub edit_distance: Option<usize>,
}

impl DiffOutcome {
    /// True if the distance cap forced a full replacement.
    pub fn is_fallback(&self) -> bool {
        self.strategy == DiffStrategy::FullReplacement
    }
}

/// Diff with default options (unbounded, semantic cleanup on).
///
/// The cleanup pass can trade a few extra edited characters for readable
/// runs; use [`diff_minimal`] for the plain shortest edit script.
pub fn diff(base: &str, target: &str) -> EditScript {
    diff_with(base, target, &DiffOptions::default()).script
}

/// Diff without semantic cleanup: longest common subsequence maximised.
pub fn diff_minimal(base: &str, target: &str) -> EditScript {
    diff_with(base, target, &DiffOptions::minimal()).script
}

/// Diff with explicit options.
pub fn diff_with(base: &str, target: &str, options: &DiffOptions) -> DiffOutcome {
    if base == target {
        let script = if base.is_empty() {
            EditScript::empty()
        } else {
            EditScript::normalized(vec![Operation::Keep(base.to_string())])
        };
        return DiffOutcome {
            script,
            strategy: DiffStrategy::Myers,
            edit_distance: Some(0),
        };
    }

    let a: Vec<char> = base.chars().collect();
    let b: Vec<char> = target.chars().collect();

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];

    let Some((middle, distance)) = myers::shortest_edit(mid_a, mid_b, options.max_edit_distance)
    else {
        return DiffOutcome {
            script: EditScript::full_replacement(base, target),
            strategy: DiffStrategy::FullReplacement,
            edit_distance: None,
        };
    };

    let mut operations = Vec::with_capacity(middle.len() + 2);
    if prefix > 0 {
        operations.push(Operation::Keep(a[..prefix].iter().collect()));
    }
    operations.extend(middle);
    if suffix > 0 {
        operations.push(Operation::Keep(a[a.len() - suffix..].iter().collect()));
    }

    let script = if options.semantic_cleanup {
        EditScript::normalized(cleanup::semantic_cleanup(operations))
    } else {
        EditScript::normalized(operations)
    };

    DiffOutcome {
        script,
        strategy: DiffStrategy::Myers,
        edit_distance: Some(distance),
    }
}
