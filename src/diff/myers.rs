//! Myers O(ND) shortest edit script in linear space
//!
//! Bisects the problem on the middle snake: a forward search from the
//! origin and a reverse search from the end advance one edit at a time
//! until their furthest-reaching paths overlap on a diagonal `k = x - y`.
//! The overlap point lies on a shortest path, so both halves are solved
//! independently. Each bisection holds two frontiers of O(N + M) entries
//! and nothing survives the recursion but the step list.
//!
//! Tie-break: when the frontiers on both neighbouring diagonals are equally
//! far, the path extends by a deletion rather than an insertion. Runs are
//! normalised afterwards, so a Delete always precedes an adjacent Insert.

use super::script::{normalize, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Keep,
    Delete,
    Insert,
}

/// Compute the shortest edit path from `a` to `b`.
///
/// Returns the grouped operations and the edit distance, or `None` if the
/// edit distance exceeds `max_distance`. A capped search stops as soon as
/// the distance is known to exceed the cap, so it costs O((N + M) * cap).
pub(crate) fn shortest_edit(
    a: &[char],
    b: &[char],
    max_distance: Option<usize>,
) -> Option<(Vec<Operation>, usize)> {
    let mut search = Search {
        a,
        b,
        steps: Vec::with_capacity(a.len() + b.len()),
    };
    search.conquer(0, a.len(), 0, b.len(), max_distance)?;

    let distance = search.steps.iter().filter(|s| **s != Step::Keep).count();
    if let Some(limit) = max_distance {
        if distance > limit {
            return None;
        }
    }
    let ops = group(&search.steps, a, b);
    Some((normalize(ops), distance))
}

/// Result of one bisection.
enum Bisect {
    /// A point on a shortest path, in absolute coordinates.
    Split(usize, usize),
    /// No overlap within the search range; the inputs share nothing usable.
    Disjoint,
    /// The distance cap was passed.
    OverLimit,
}

struct Search<'a> {
    a: &'a [char],
    b: &'a [char],
    steps: Vec<Step>,
}

impl Search<'_> {
    /// Append the steps turning `a[a0..a1]` into `b[b0..b1]`.
    ///
    /// `limit` only applies to this call, not to the halves it recurses
    /// into: once the top-level bisection succeeds, the full distance is
    /// checked by the caller.
    fn conquer(
        &mut self,
        mut a0: usize,
        mut a1: usize,
        mut b0: usize,
        mut b1: usize,
        limit: Option<usize>,
    ) -> Option<()> {
        while a0 < a1 && b0 < b1 && self.a[a0] == self.b[b0] {
            self.steps.push(Step::Keep);
            a0 += 1;
            b0 += 1;
        }
        let mut suffix = 0;
        while a0 < a1 && b0 < b1 && self.a[a1 - 1] == self.b[b1 - 1] {
            a1 -= 1;
            b1 -= 1;
            suffix += 1;
        }

        if a0 == a1 || b0 == b1 {
            self.replace(a1 - a0, b1 - b0);
        } else {
            match self.bisect(a0, a1, b0, b1, limit) {
                Bisect::Split(x, y) => {
                    self.conquer(a0, x, b0, y, None)?;
                    self.conquer(x, a1, y, b1, None)?;
                }
                Bisect::Disjoint => self.replace(a1 - a0, b1 - b0),
                Bisect::OverLimit => return None,
            }
        }

        self.steps.extend(std::iter::repeat(Step::Keep).take(suffix));
        Some(())
    }

    fn replace(&mut self, deleted: usize, inserted: usize) {
        self.steps.extend(std::iter::repeat(Step::Delete).take(deleted));
        self.steps.extend(std::iter::repeat(Step::Insert).take(inserted));
    }

    /// Find the middle snake of `a[a0..a1]` against `b[b0..b1]`.
    ///
    /// Both ranges are non-empty and differ in their first and last
    /// characters. Frontier entries of -1 mark diagonals not reached yet;
    /// diagonals that run off the edit graph shrink the search window.
    fn bisect(&self, a0: usize, a1: usize, b0: usize, b1: usize, limit: Option<usize>) -> Bisect {
        let n = (a1 - a0) as isize;
        let m = (b1 - b0) as isize;
        let max_d = (n + m + 1) / 2;
        let offset = max_d;
        let len = (2 * max_d + 1) as usize;
        let mut forward = vec![-1isize; len];
        let mut reverse = vec![-1isize; len];
        forward[(offset + 1) as usize] = 0;
        reverse[(offset + 1) as usize] = 0;

        let delta = n - m;
        // With an odd delta the paths meet during a forward step.
        let front = delta % 2 != 0;
        let (mut k1_start, mut k1_end, mut k2_start, mut k2_end) = (0, 0, 0, 0);

        for d in 0..max_d {
            // Every earlier step failed to overlap, so the distance is at
            // least 2d - 1.
            if let Some(limit) = limit {
                if d > 0 && (2 * d - 1) as usize > limit {
                    return Bisect::OverLimit;
                }
            }

            let mut k1 = -d + k1_start;
            while k1 <= d - k1_end {
                let i = (offset + k1) as usize;
                let mut x1 = if k1 == -d || (k1 != d && forward[i - 1] < forward[i + 1]) {
                    forward[i + 1]
                } else {
                    forward[i - 1] + 1
                };
                let mut y1 = x1 - k1;
                while x1 >= 0
                    && y1 >= 0
                    && x1 < n
                    && y1 < m
                    && self.a[a0 + x1 as usize] == self.b[b0 + y1 as usize]
                {
                    x1 += 1;
                    y1 += 1;
                }
                forward[i] = x1;
                if x1 > n {
                    k1_end += 2;
                } else if y1 > m {
                    k1_start += 2;
                } else if front {
                    let j = offset + delta - k1;
                    if j >= 0 && (j as usize) < len && reverse[j as usize] != -1 {
                        let x2 = n - reverse[j as usize];
                        if x1 >= x2 {
                            return self.split(a0, a1, b0, b1, x1, y1);
                        }
                    }
                }
                k1 += 2;
            }

            let mut k2 = -d + k2_start;
            while k2 <= d - k2_end {
                let i = (offset + k2) as usize;
                let mut x2 = if k2 == -d || (k2 != d && reverse[i - 1] < reverse[i + 1]) {
                    reverse[i + 1]
                } else {
                    reverse[i - 1] + 1
                };
                let mut y2 = x2 - k2;
                while x2 >= 0
                    && y2 >= 0
                    && x2 < n
                    && y2 < m
                    && self.a[a1 - 1 - x2 as usize] == self.b[b1 - 1 - y2 as usize]
                {
                    x2 += 1;
                    y2 += 1;
                }
                reverse[i] = x2;
                if x2 > n {
                    k2_end += 2;
                } else if y2 > m {
                    k2_start += 2;
                } else if !front {
                    let j = offset + delta - k2;
                    if j >= 0 && (j as usize) < len && forward[j as usize] != -1 {
                        let x1 = forward[j as usize];
                        let y1 = x1 - (j - offset);
                        if x1 >= n - x2 {
                            return self.split(a0, a1, b0, b1, x1, y1);
                        }
                    }
                }
                k2 += 2;
            }
        }

        if let Some(limit) = limit {
            if (n + m) as usize > limit {
                return Bisect::OverLimit;
            }
        }
        Bisect::Disjoint
    }

    /// Convert a relative overlap point into a split, refusing points that
    /// would leave one half as large as the whole.
    fn split(&self, a0: usize, a1: usize, b0: usize, b1: usize, x: isize, y: isize) -> Bisect {
        if x < 0 || y < 0 {
            return Bisect::Disjoint;
        }
        let (x, y) = (a0 + x as usize, b0 + y as usize);
        if x > a1 || y > b1 || (x, y) == (a0, b0) || (x, y) == (a1, b1) {
            return Bisect::Disjoint;
        }
        Bisect::Split(x, y)
    }
}

/// Turn per-character steps into text-carrying operations.
fn group(steps: &[Step], a: &[char], b: &[char]) -> Vec<Operation> {
    let mut ops: Vec<Operation> = Vec::new();
    let mut current: Option<(Step, String)> = None;
    let (mut x, mut y) = (0usize, 0usize);

    for &step in steps {
        let c = match step {
            Step::Keep => {
                let c = a[x];
                x += 1;
                y += 1;
                c
            }
            Step::Delete => {
                let c = a[x];
                x += 1;
                c
            }
            Step::Insert => {
                let c = b[y];
                y += 1;
                c
            }
        };
        if let Some((kind, text)) = current.as_mut() {
            if *kind == step {
                text.push(c);
                continue;
            }
        }
        if let Some((kind, text)) = current.take() {
            ops.push(to_operation(kind, text));
        }
        current = Some((step, c.to_string()));
    }
    if let Some((kind, text)) = current {
        ops.push(to_operation(kind, text));
    }
    ops
}

fn to_operation(step: Step, text: String) -> Operation {
    match step {
        Step::Keep => Operation::Keep(text),
        Step::Delete => Operation::Delete(text),
        Step::Insert => Operation::Insert(text),
    }
}
