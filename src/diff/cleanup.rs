//! Semantic cleanup pass
//!
//! A minimal script often keeps stray single characters in the middle of a
//! rewrite ("world" -> "amdWiki" keeps the `d`). Such an equality is
//! dissolved into Delete + Insert when it is no longer than the largest edit
//! on each side of it. Repeats until no equality qualifies; each round removes
//! one Keep, so the pass terminates.

use super::script::{normalize, Operation};

/// Dissolve short equalities sandwiched between larger edits.
pub(crate) fn semantic_cleanup(operations: Vec<Operation>) -> Vec<Operation> {
    let mut ops = normalize(operations);
    while let Some(index) = find_dissolvable_keep(&ops) {
        let text = ops[index].text().to_string();
        ops.splice(
            index..=index,
            [Operation::Delete(text.clone()), Operation::Insert(text)],
        );
        ops = normalize(ops);
    }
    ops
}

fn find_dissolvable_keep(ops: &[Operation]) -> Option<usize> {
    ops.iter().enumerate().find_map(|(index, op)| {
        if !op.is_keep() {
            return None;
        }
        let len = op.char_len();
        let before = edit_weight(ops[..index].iter().rev());
        let after = edit_weight(ops[index + 1..].iter());
        (before > 0 && after > 0 && len <= before && len <= after).then_some(index)
    })
}

/// Largest of (deleted, inserted) chars in the edit run starting at `run`.
fn edit_weight<'a>(run: impl Iterator<Item = &'a Operation>) -> usize {
    let (mut deleted, mut inserted) = (0, 0);
    for op in run.take_while(|op| !op.is_keep()) {
        match op {
            Operation::Delete(_) => deleted += op.char_len(),
            Operation::Insert(_) => inserted += op.char_len(),
            Operation::Keep(_) => unreachable!("take_while stops at keeps"),
        }
    }
    deleted.max(inserted)
}
