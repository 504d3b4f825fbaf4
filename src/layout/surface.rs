//! The containing scroll surface, as far as the engine needs to know it.
//!
//! The engine never scrolls the surface. The host sets the content offset and
//! the engine reads it.

use crate::model::{Insets, Rect, Size};

/// Viewport size, content insets and current scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Surface {
    viewport: Size,
    content_insets: Insets,
    content_offset: f64,
}

impl Surface {
    /// Surface at offset 0 with no content insets.
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Viewport width; also the stack width.
    pub fn width(&self) -> f64 {
        self.viewport.width
    }

    /// Viewport height.
    pub fn height(&self) -> f64 {
        self.viewport.height
    }

    /// Insets applied to the scrollable content.
    pub fn content_insets(&self) -> Insets {
        self.content_insets
    }

    /// Vertical scroll offset.
    pub fn content_offset(&self) -> f64 {
        self.content_offset
    }

    pub(crate) fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub(crate) fn set_content_insets(&mut self, insets: Insets) {
        self.content_insets = insets;
    }

    pub(crate) fn set_content_offset(&mut self, offset: f64) {
        self.content_offset = offset;
    }

    /// What is on screen: the viewport placed at the content offset.
    pub fn visible_rect(&self) -> Rect {
        Rect::new(0.0, self.content_offset, self.width(), self.height())
    }

    /// Bottom edge of the visible rect.
    pub fn bounds_max_y(&self) -> f64 {
        self.content_offset + self.height()
    }

    /// Rect that selects regions for positioning work: the visible rect grown
    /// by `buffer` viewport heights above and below.
    pub fn valid_rect(&self, buffer: f64) -> Rect {
        self.visible_rect()
            .outset_vertically(self.height() * buffer.max(0.0))
    }

    /// Rect outside of which a region may be shrunk to zero height. Starts at
    /// the viewport top and spans `factor` viewport heights downward.
    pub fn discardable_rect(&self, factor: f64) -> Rect {
        Rect::new(
            0.0,
            self.content_offset,
            self.width(),
            self.height() * factor.max(1.0),
        )
    }

    /// Smallest content height the surface may report: its own viewport minus
    /// content insets.
    pub fn min_content_height(&self) -> f64 {
        (self.height() - self.content_insets.vertical()).max(0.0)
    }
}
