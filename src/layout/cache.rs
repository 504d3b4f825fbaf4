//! Geometry cache: per-region attributes from the last full rebuild.
//!
//! Entries live in a single `Vec` in document (stacking) order. Neighbor links
//! are positions into that `Vec`, not references, so entries carry no
//! ownership relation to each other or to the regions they describe.
//!
//! # Validity
//!
//! ```text
//! Empty --begin_rebuild--> Running --finish_rebuild--> Finished
//!   ^                                                     |
//!   +----------------------- invalidate ------------------+
//! ```
//!
//! While `Running` the entries are half-built and must not be queried.

use super::range_query;
use crate::model::{Point, Rect, RegionId, Size};
use std::collections::HashMap;
use std::ops::Range;

/// Cached computed attributes for one region.
///
/// # Invariants
/// - `max_y == round(content_size.height + origin.y)` after every mutation
/// - `previous`/`next` are positions in the owning cache, in document order
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryEntry {
    region: RegionId,
    origin: Point,
    content_size: Size,
    max_y: f64,
    previous: Option<usize>,
    next: Option<usize>,
}

impl GeometryEntry {
    /// Create an unlinked entry. Links are assigned by [`GeometryCache::add`].
    pub fn new(region: RegionId, origin: Point, content_size: Size) -> Self {
        Self {
            region,
            origin,
            content_size,
            max_y: compute_max_y(origin, content_size),
            previous: None,
            next: None,
        }
    }

    /// Region this entry belongs to.
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// Unrounded top-left of the region's stacked extent.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Stacked size: frame width and full layout height.
    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// Rounded bottom edge of the region's content.
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Position of the preceding entry, if any.
    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    /// Position of the following entry, if any.
    pub fn next(&self) -> Option<usize> {
        self.next
    }

    /// The full extent the region occupies in the stack.
    pub fn frame(&self) -> Rect {
        Rect {
            origin: self.origin,
            size: self.content_size,
        }
    }

    /// Move the entry; `max_y` follows.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
        self.max_y = compute_max_y(self.origin, self.content_size);
    }

    /// Resize the entry; `max_y` follows.
    pub fn set_content_size(&mut self, size: Size) {
        self.content_size = size;
        self.max_y = compute_max_y(self.origin, self.content_size);
    }

    /// Y at which the next region's top margin starts.
    ///
    /// A collapsed (zero-height) region reserves no space, including its
    /// bottom margin.
    pub fn trailing_edge(&self, margin_bottom: f64) -> f64 {
        advance(self.origin.y, self.content_size.height, margin_bottom)
    }
}

/// Running offset after laying out a region at `y` with `height` content.
///
/// Shared by the full rebuild and the incremental reflow so both produce the
/// same geometry for the same input.
pub(crate) fn advance(y: f64, height: f64, margin_bottom: f64) -> f64 {
    if height > 0.0 {
        y + height + margin_bottom
    } else {
        y
    }
}

fn compute_max_y(origin: Point, size: Size) -> f64 {
    (size.height + origin.y).round()
}

/// Cache validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheState {
    /// No entries; a full rebuild is required.
    #[default]
    Empty,
    /// A rebuild is in progress and must not be re-entered.
    Running,
    /// Entries are valid; only incremental positioning is needed.
    Finished,
}

/// Region identity → geometry, plus document order and validity.
#[derive(Debug, Clone, Default)]
pub struct GeometryCache {
    state: CacheState,
    entries: Vec<GeometryEntry>,
    positions: HashMap<RegionId, usize>,
    content_size: Size,
}

impl GeometryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current validity.
    pub fn state(&self) -> CacheState {
        self.state
    }

    /// Append an entry at the end of document order and link it to the
    /// previous last entry. Returns its position.
    ///
    /// Must be called during a rebuild in ascending document order. Out of
    /// order calls produce wrong neighbor links; debug builds assert.
    pub fn add(&mut self, mut entry: GeometryEntry) -> usize {
        debug_assert_eq!(
            self.state,
            CacheState::Running,
            "GeometryCache::add outside of a rebuild"
        );
        debug_assert!(
            self.entries
                .last()
                .is_none_or(|last| last.origin.y <= entry.origin.y),
            "GeometryCache::add out of document order"
        );
        debug_assert!(
            !self.positions.contains_key(&entry.region),
            "GeometryCache::add called twice for {}",
            entry.region
        );

        let position = self.entries.len();
        entry.previous = position.checked_sub(1);
        entry.next = None;
        if let Some(last) = self.entries.last_mut() {
            last.next = Some(position);
        }
        self.positions.insert(entry.region, position);
        self.entries.push(entry);
        position
    }

    /// O(1) lookup by region.
    pub fn entry_for(&self, region: RegionId) -> Option<&GeometryEntry> {
        self.positions
            .get(&region)
            .and_then(|&pos| self.entries.get(pos))
    }

    /// Document position of a region's entry.
    pub fn position_of(&self, region: RegionId) -> Option<usize> {
        self.positions.get(&region).copied()
    }

    /// Entry at a document position.
    pub fn entry_at(&self, position: usize) -> Option<&GeometryEntry> {
        self.entries.get(position)
    }

    pub(crate) fn entry_at_mut(&mut self, position: usize) -> Option<&mut GeometryEntry> {
        self.entries.get_mut(position)
    }

    /// All entries in document order.
    pub fn entries(&self) -> &[GeometryEntry] {
        &self.entries
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aggregate content size reported to the surface.
    pub fn content_size(&self) -> Size {
        self.content_size
    }

    pub(crate) fn set_content_size(&mut self, size: Size) {
        self.content_size = size;
    }

    /// Drop every entry and return to `Empty`.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.positions.clear();
        self.state = CacheState::Empty;
    }

    /// `Empty -> Running`. Returns false (and changes nothing) from any other
    /// state.
    pub fn begin_rebuild(&mut self) -> bool {
        if self.state != CacheState::Empty {
            return false;
        }
        self.entries.clear();
        self.positions.clear();
        self.state = CacheState::Running;
        true
    }

    /// `Running -> Finished`.
    pub fn finish_rebuild(&mut self, content_size: Size) {
        debug_assert_eq!(self.state, CacheState::Running);
        self.content_size = content_size;
        self.state = CacheState::Finished;
    }

    /// Positions of the contiguous run of entries intersecting `rect`
    /// vertically. Empty if none match.
    pub fn range_intersecting(&self, rect: &Rect) -> Range<usize> {
        debug_assert_ne!(
            self.state,
            CacheState::Running,
            "range query against a half-built cache"
        );
        range_query::intersecting(&self.entries, rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegionIdAllocator;

    fn running_cache() -> GeometryCache {
        let mut cache = GeometryCache::new();
        assert!(cache.begin_rebuild());
        cache
    }

    fn entry(id: RegionId, y: f64, height: f64) -> GeometryEntry {
        GeometryEntry::new(id, Point::new(0.0, y), Size::new(500.0, height))
    }

    #[test]
    fn max_y_is_rounded_sum() {
        let mut alloc = RegionIdAllocator::new();
        let e = GeometryEntry::new(alloc.allocate(), Point::new(0.0, 10.4), Size::new(1.0, 20.3));
        assert_eq!(e.max_y(), 31.0);
    }

    #[test]
    fn max_y_follows_mutations() {
        let mut alloc = RegionIdAllocator::new();
        let mut e = entry(alloc.allocate(), 0.0, 100.0);
        e.set_origin(Point::new(0.0, 50.0));
        assert_eq!(e.max_y(), 150.0);
        e.set_content_size(Size::new(500.0, 10.0));
        assert_eq!(e.max_y(), 60.0);
    }

    #[test]
    fn trailing_edge_skips_collapsed_regions() {
        let mut alloc = RegionIdAllocator::new();
        assert_eq!(entry(alloc.allocate(), 40.0, 100.0).trailing_edge(10.0), 150.0);
        assert_eq!(entry(alloc.allocate(), 40.0, 0.0).trailing_edge(10.0), 40.0);
    }

    #[test]
    fn add_links_neighbors_in_order() {
        let mut alloc = RegionIdAllocator::new();
        let ids: Vec<_> = (0..3).map(|_| alloc.allocate()).collect();
        let mut cache = running_cache();
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(cache.add(entry(*id, i as f64 * 100.0, 100.0)), i);
        }

        let first = cache.entry_for(ids[0]).unwrap();
        let middle = cache.entry_for(ids[1]).unwrap();
        let last = cache.entry_for(ids[2]).unwrap();
        assert_eq!((first.previous(), first.next()), (None, Some(1)));
        assert_eq!((middle.previous(), middle.next()), (Some(0), Some(2)));
        assert_eq!((last.previous(), last.next()), (Some(1), None));
    }

    #[test]
    fn state_transitions() {
        let mut cache = GeometryCache::new();
        assert_eq!(cache.state(), CacheState::Empty);

        assert!(cache.begin_rebuild());
        assert_eq!(cache.state(), CacheState::Running);
        assert!(!cache.begin_rebuild(), "rebuild must not be re-entered");

        cache.finish_rebuild(Size::new(500.0, 0.0));
        assert_eq!(cache.state(), CacheState::Finished);
        assert!(!cache.begin_rebuild(), "finished cache needs invalidation first");

        cache.invalidate();
        assert_eq!(cache.state(), CacheState::Empty);
    }

    #[test]
    fn invalidate_clears_entries_and_lookup() {
        let mut alloc = RegionIdAllocator::new();
        let id = alloc.allocate();
        let mut cache = running_cache();
        cache.add(entry(id, 0.0, 10.0));
        cache.finish_rebuild(Size::new(500.0, 10.0));

        cache.invalidate();

        assert!(cache.is_empty());
        assert!(cache.entry_for(id).is_none());
        assert_eq!(cache.position_of(id), None);
    }

    #[test]
    fn range_intersecting_uses_entries() {
        let mut alloc = RegionIdAllocator::new();
        let mut cache = running_cache();
        for i in 0..4 {
            cache.add(entry(alloc.allocate(), i as f64 * 250.0, 250.0));
        }
        cache.finish_rebuild(Size::new(500.0, 1000.0));

        let range = cache.range_intersecting(&Rect::new(0.0, 300.0, 500.0, 300.0));
        assert_eq!(range, 1..3);
    }
}
