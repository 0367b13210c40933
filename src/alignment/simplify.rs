//! Lossless reduction of an alignment set.
//!
//! Two alignments are replaced by their bounding union when either
//! - one lies inside the other on both sides, or
//! - they share an identical span on one side and their spans on the other side
//!   overlap, touch, or are separated by whitespace only.
//!
//! The scan merges the first eligible pair in `(i, j)` order, writes the union at `i`,
//! drops `j`, and starts over until a full scan finds nothing. The highlighting code
//! depends on this exact order, so the result must not be re-sorted.

use crate::alignment::text::Utf16Text;
use crate::types::Alignment;

pub fn simplify(
    alignments: Vec<Alignment>,
    from: &Utf16Text<'_>,
    to: &Utf16Text<'_>,
) -> Vec<Alignment> {
    debug_assert!(alignments.iter().all(Alignment::is_valid));
    let mut set = alignments;
    let input_len = set.len();
    while let Some((i, j)) = first_mergeable_pair(&set, from, to) {
        set[i] = set[i].union(&set[j]);
        set.remove(j);
    }
    tracing::debug!(
        input = input_len,
        output = set.len(),
        merges = input_len - set.len(),
        "simplify: reached fixpoint"
    );
    set
}

pub fn can_merge(a: &Alignment, b: &Alignment, from: &Utf16Text<'_>, to: &Utf16Text<'_>) -> bool {
    if contains(a, b) || contains(b, a) {
        return true;
    }
    let same_from = a.from_start == b.from_start && a.from_end == b.from_end;
    if same_from && spans_join(to, (a.to_start, a.to_end), (b.to_start, b.to_end)) {
        return true;
    }
    let same_to = a.to_start == b.to_start && a.to_end == b.to_end;
    same_to && spans_join(from, (a.from_start, a.from_end), (b.from_start, b.from_end))
}

fn first_mergeable_pair(
    set: &[Alignment],
    from: &Utf16Text<'_>,
    to: &Utf16Text<'_>,
) -> Option<(usize, usize)> {
    for i in 0..set.len() {
        for j in i + 1..set.len() {
            if can_merge(&set[i], &set[j], from, to) {
                return Some((i, j));
            }
        }
    }
    None
}

/// `inner` lies within `outer` on both sides.
fn contains(outer: &Alignment, inner: &Alignment) -> bool {
    outer.from_start <= inner.from_start
        && inner.from_end <= outer.from_end
        && outer.to_start <= inner.to_start
        && inner.to_end <= outer.to_end
}

/// Overlapping, touching, or separated only by whitespace.
fn spans_join(text: &Utf16Text<'_>, a: (u16, u16), b: (u16, u16)) -> bool {
    let (first, second) = if a.0 <= b.0 { (a, b) } else { (b, a) };
    second.0 <= first.1 || text.is_blank(first.1, second.0)
}
