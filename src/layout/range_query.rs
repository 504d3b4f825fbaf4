//! Bounded search over document-ordered geometry.
//!
//! Binary search finds one entry overlapping the target rect, then the match
//! grows outward while neighbors could still overlap. Cost is O(log n + k) for
//! k matching entries instead of a scan over the whole stack.
//!
//! # Contract
//! The slice must be sorted by ascending `origin.y` with non-decreasing bottom
//! edges. The engine keeps entries in stacking order, which satisfies this by
//! construction. If no entry overlaps the rect the result is empty, never the
//! nearest entry.

use super::cache::GeometryEntry;
use crate::model::Rect;
use std::cmp::Ordering;
use std::ops::Range;

/// Generic order-aware search.
///
/// - `compare` classifies an item relative to the target: `Less` if it lies
///   entirely before, `Greater` if entirely after, `Equal` if it may match.
/// - `keep_backward` / `keep_forward` decide whether expansion continues to
///   the previous / next item.
/// - `matches` is the exact predicate; non-matching items at either end of the
///   expanded run are trimmed.
pub fn bounded_search<T, C, B, F, M>(
    items: &[T],
    compare: C,
    keep_backward: B,
    keep_forward: F,
    matches: M,
) -> Range<usize>
where
    C: Fn(&T) -> Ordering,
    B: Fn(&T) -> bool,
    F: Fn(&T) -> bool,
    M: Fn(&T) -> bool,
{
    let Ok(hit) = items.binary_search_by(|item| compare(item)) else {
        return 0..0;
    };

    let mut start = hit;
    while start > 0 && keep_backward(&items[start - 1]) {
        start -= 1;
    }

    let mut end = hit + 1;
    while end < items.len() && keep_forward(&items[end]) {
        end += 1;
    }

    while start < end && !matches(&items[start]) {
        start += 1;
    }
    while end > start && !matches(&items[end - 1]) {
        end -= 1;
    }

    if start == end {
        0..0
    } else {
        start..end
    }
}

/// Positions of the entries whose frames overlap `rect` vertically.
///
/// Collapsed entries sitting between two overlapping entries are included so
/// the result stays contiguous.
pub fn intersecting(entries: &[GeometryEntry], rect: &Rect) -> Range<usize> {
    if rect.height() <= 0.0 {
        return 0..0;
    }
    let (top, bottom) = (rect.min_y(), rect.max_y());

    bounded_search(
        entries,
        |entry| {
            let frame = entry.frame();
            let collapsed = frame.height() <= 0.0;
            if (!collapsed && frame.max_y() <= top) || (collapsed && frame.min_y() < top) {
                Ordering::Less
            } else if frame.min_y() >= bottom {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        },
        |entry| entry.frame().max_y() > top || entry.frame().min_y() >= top,
        |entry| entry.frame().min_y() < bottom,
        |entry| entry.frame().intersects_vertically(rect),
    )
}
