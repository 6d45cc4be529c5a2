//! Diff Engine Property Tests
//!
//! Randomized checks, seeded so failures reproduce:
//! - applying diff(a, b) to a yields b
//! - an edit script carries both of its texts
//! - the distance cap never produces a wrong script

use pagevault::diff::{diff, diff_minimal, diff_with, DiffOptions, DiffStrategy, Operation};
use pagevault::reconstruct::apply;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHABET: &[char] = &['a', 'b', 'c', ' ', '\n', 'é', '日', '🙂'];

fn random_text(rng: &mut StdRng, max_len: usize) -> String {
    let len = rng.gen_range(0..=max_len);
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

/// Apply a handful of random insertions and deletions to `text`.
fn mutate(rng: &mut StdRng, text: &str) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    for _ in 0..rng.gen_range(0..6) {
        if !chars.is_empty() && rng.gen_bool(0.5) {
            let at = rng.gen_range(0..chars.len());
            let len = rng.gen_range(1..=(chars.len() - at).min(4));
            chars.drain(at..at + len);
        } else {
            let at = rng.gen_range(0..=chars.len());
            let insert = random_text(rng, 4);
            for (i, c) in insert.chars().enumerate() {
                chars.insert(at + i, c);
            }
        }
    }
    chars.into_iter().collect()
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_random_pairs_apply_to_target() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0001);
    for _ in 0..500 {
        let a = random_text(&mut rng, 40);
        let b = random_text(&mut rng, 40);

        let script = diff(&a, &b);
        assert_eq!(apply(&a, &script).unwrap(), b, "diff({:?}, {:?})", a, b);

        let minimal = diff_minimal(&a, &b);
        assert_eq!(apply(&a, &minimal).unwrap(), b, "diff_minimal({:?}, {:?})", a, b);
    }
}

#[test]
fn test_small_edits_apply_to_target() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0002);
    for _ in 0..500 {
        let a = random_text(&mut rng, 120);
        let b = mutate(&mut rng, &a);
        let script = diff(&a, &b);
        assert_eq!(script.base_text(), a);
        assert_eq!(script.target_text(), b);
        assert_eq!(apply(&a, &script).unwrap(), b);
    }
}

#[test]
fn test_minimal_diff_is_never_longer_than_cleaned() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0003);
    for _ in 0..300 {
        let a = random_text(&mut rng, 60);
        let b = mutate(&mut rng, &a);
        let minimal = diff_minimal(&a, &b).stats();
        let cleaned = diff(&a, &b).stats();
        assert!(
            minimal.additions + minimal.deletions <= cleaned.additions + cleaned.deletions,
            "minimal diff changed more than cleaned diff for {:?} -> {:?}",
            a,
            b
        );
    }
}

// =============================================================================
// Identity Tests
// =============================================================================

#[test]
fn test_identity_is_single_keep() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0004);
    for _ in 0..100 {
        let a = random_text(&mut rng, 50);
        let script = diff(&a, &a);
        assert!(script.is_identity());
        if a.is_empty() {
            assert!(script.is_empty());
        } else {
            assert_eq!(script.operations(), &[Operation::Keep(a.clone())]);
        }
    }
}

#[test]
fn test_adjacent_operations_never_share_kind() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0005);
    for _ in 0..300 {
        let a = random_text(&mut rng, 60);
        let b = mutate(&mut rng, &a);
        let script = diff(&a, &b);
        for pair in script.operations().windows(2) {
            assert_ne!(pair[0].kind(), pair[1].kind(), "unmerged run in {:?}", script);
        }
        assert!(script.operations().iter().all(|op| !op.text().is_empty()));
    }
}

// =============================================================================
// Distance Cap Tests
// =============================================================================

#[test]
fn test_capped_diff_still_reconstructs() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0006);
    let options = DiffOptions::default().with_max_edit_distance(3);
    let mut fallbacks = 0;
    for _ in 0..300 {
        let a = random_text(&mut rng, 40);
        let b = random_text(&mut rng, 40);
        let outcome = diff_with(&a, &b, &options);
        if outcome.strategy == DiffStrategy::FullReplacement {
            fallbacks += 1;
            assert!(outcome.is_fallback());
            assert_eq!(outcome.edit_distance, None);
        }
        assert_eq!(apply(&a, &outcome.script).unwrap(), b);
    }
    assert!(fallbacks > 0);
}
