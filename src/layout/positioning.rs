//! Kind-dependent placement rules.
//!
//! These are the only places where a wrapper and a native scrollable are laid
//! out differently. Everything here is a pure function of the cached entry and
//! the surface, which keeps the rules testable without an engine.

use super::cache::GeometryEntry;
use super::region::RegionKind;
use super::surface::Surface;
use crate::model::{Rect, FRAME_TOLERANCE};

/// Target geometry for one region in one positioning pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Frame in surface coordinates.
    pub frame: Rect,
    /// Offset of the region's content within its frame.
    pub internal_offset: f64,
    /// True if a native scrollable is scrolling its own content.
    pub self_scrolling: bool,
}

impl Placement {
    /// A region shrunk to nothing at its cached origin.
    pub fn collapsed(entry: &GeometryEntry) -> Self {
        let origin = entry.origin();
        Self {
            frame: Rect::new(origin.x, origin.y.round(), entry.content_size().width, 0.0),
            internal_offset: 0.0,
            self_scrolling: false,
        }
    }

    /// Collapse if the frame lies entirely outside `discardable`.
    pub fn discard_outside(self, entry: &GeometryEntry, discardable: &Rect) -> Self {
        if self.frame.intersects_vertically(discardable) {
            self
        } else {
            Self::collapsed(entry)
        }
    }
}

/// Frame height during a full rebuild.
///
/// Wrappers show their full pending height (up to one viewport). Native
/// scrollables may already be mid-scroll and only show the unseen remainder
/// of their content that fits below `y` in the viewport.
pub fn rebuild_height(
    kind: &RegionKind,
    surface: &Surface,
    y: f64,
    content_height: f64,
    current_offset: f64,
) -> f64 {
    let height = match kind {
        RegionKind::Wrapper(_) => surface.height().min(content_height),
        RegionKind::NativeScrollable(_) => {
            let remaining_bounds = (surface.bounds_max_y() - y).max(0.0);
            let remaining_content = (content_height - current_offset).max(0.0);
            surface.height().min(remaining_bounds.min(remaining_content))
        }
    };
    height.max(0.0)
}

/// Whether a native scrollable should scroll its own content instead of
/// being moved by the surface.
///
/// True only while the surface offset lies strictly between the region's
/// cached origin and bottom, and the region has at least a viewport worth of
/// content.
pub fn should_self_scroll(entry: &GeometryEntry, surface: &Surface) -> bool {
    let offset = surface.content_offset();
    let viewport = surface.height();
    viewport > 0.0
        && offset > entry.origin().y
        && offset < entry.max_y()
        && entry.content_size().height >= viewport - FRAME_TOLERANCE
}

/// Target placement for a region during incremental positioning.
pub fn place(kind: &RegionKind, entry: &GeometryEntry, surface: &Surface) -> Placement {
    let origin = entry.origin();
    let width = entry.content_size().width;
    let content = entry.content_size().height;
    let scrolled_into = surface.content_offset() - origin.y;

    match kind {
        RegionKind::Wrapper(_) => {
            let height = surface.height().min(content).max(0.0);
            let offset = scrolled_into.clamp(0.0, (content - height).max(0.0));
            Placement {
                frame: Rect::new(origin.x, (origin.y + offset).round(), width, height),
                internal_offset: offset,
                self_scrolling: false,
            }
        }
        RegionKind::NativeScrollable(_) if should_self_scroll(entry, surface) => {
            let height = surface.height();
            let offset = scrolled_into.min(content - height).max(0.0);
            Placement {
                frame: Rect::new(origin.x, (origin.y + offset).round(), width, height),
                internal_offset: offset,
                self_scrolling: true,
            }
        }
        RegionKind::NativeScrollable(_) => {
            // Stale internal offsets make clip-to-bounds drop content, so a
            // native region that is not self-scrolling always reads 0.
            let height = rebuild_height(kind, surface, origin.y, content, 0.0);
            Placement {
                frame: Rect::new(origin.x, origin.y.round(), width, height),
                internal_offset: 0.0,
                self_scrolling: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::wrapper::RegionWrapper;
    use crate::model::{ContentView, Point, RegionIdAllocator, Size};

    fn wrapper() -> RegionKind {
        RegionKind::Wrapper(RegionWrapper::new(ContentView::plain("w", 0.0)).unwrap())
    }

    fn native() -> RegionKind {
        RegionKind::NativeScrollable(ContentView::scrollable("n", 0.0))
    }

    fn entry(y: f64, height: f64) -> GeometryEntry {
        let id = RegionIdAllocator::new().allocate();
        GeometryEntry::new(id, Point::new(0.0, y), Size::new(500.0, height))
    }

    fn surface(offset: f64, height: f64) -> Surface {
        let mut s = Surface::new(Size::new(500.0, height));
        s.set_content_offset(offset);
        s
    }

    #[test]
    fn wrapper_rebuild_height_ignores_bounds() {
        let s = surface(0.0, 500.0);
        assert_eq!(rebuild_height(&wrapper(), &s, 900.0, 250.0, 0.0), 250.0);
        assert_eq!(rebuild_height(&wrapper(), &s, 0.0, 2000.0, 0.0), 500.0);
    }

    #[test]
    fn native_rebuild_height_shows_remaining_content_in_bounds() {
        let s = surface(0.0, 500.0);
        assert_eq!(rebuild_height(&native(), &s, 400.0, 250.0, 0.0), 100.0);
        assert_eq!(rebuild_height(&native(), &s, 900.0, 250.0, 0.0), 0.0);
        assert_eq!(rebuild_height(&native(), &s, 0.0, 250.0, 200.0), 50.0);
    }

    #[test]
    fn self_scroll_threshold_is_strict_at_origin() {
        let e = entry(250.0, 2000.0);
        assert!(!should_self_scroll(&e, &surface(250.0, 500.0)));
        assert!(should_self_scroll(&e, &surface(251.0, 500.0)));
    }

    #[test]
    fn self_scroll_requires_a_viewport_of_content() {
        let e = entry(250.0, 400.0);
        assert!(!should_self_scroll(&e, &surface(300.0, 500.0)));
    }

    #[test]
    fn self_scroll_stops_at_max_y() {
        let e = entry(0.0, 1000.0);
        assert!(should_self_scroll(&e, &surface(999.0, 500.0)));
        assert!(!should_self_scroll(&e, &surface(1000.0, 500.0)));
    }

    #[test]
    fn self_scrolling_native_is_pinned_then_released() {
        let e = entry(0.0, 1000.0);

        let pinned = place(&native(), &e, &surface(200.0, 500.0));
        assert!(pinned.self_scrolling);
        assert_eq!(pinned.internal_offset, 200.0);
        assert_eq!(pinned.frame, Rect::new(0.0, 200.0, 500.0, 500.0));

        let clamped = place(&native(), &e, &surface(800.0, 500.0));
        assert_eq!(clamped.internal_offset, 500.0);
        assert_eq!(clamped.frame.min_y(), 500.0);
        assert_eq!(clamped.frame.max_y(), 1000.0);
    }

    #[test]
    fn native_outside_scroll_range_resets_offset() {
        let e = entry(600.0, 1000.0);
        let p = place(&native(), &e, &surface(100.0, 500.0));
        assert!(!p.self_scrolling);
        assert_eq!(p.internal_offset, 0.0);
        assert_eq!(p.frame.min_y(), 600.0);
    }

    #[test]
    fn wrapper_is_proxy_scrolled() {
        let e = entry(100.0, 1200.0);
        let p = place(&wrapper(), &e, &surface(400.0, 500.0));
        assert!(!p.self_scrolling);
        assert_eq!(p.internal_offset, 300.0);
        assert_eq!(p.frame, Rect::new(0.0, 400.0, 500.0, 500.0));
    }

    #[test]
    fn wrapper_above_offset_sits_at_origin() {
        let e = entry(700.0, 250.0);
        let p = place(&wrapper(), &e, &surface(0.0, 500.0));
        assert_eq!(p.internal_offset, 0.0);
        assert_eq!(p.frame, Rect::new(0.0, 700.0, 500.0, 250.0));
    }

    #[test]
    fn discard_outside_collapses_frames_above_viewport() {
        let e = entry(250.0, 250.0);
        let s = surface(500.0, 500.0);
        let p = place(&wrapper(), &e, &s).discard_outside(&e, &s.discardable_rect(2.5));
        assert_eq!(p.frame.height(), 0.0);
        assert_eq!(p.frame.min_y(), 250.0);
    }
}
