//! Stack members as seen by the engine.

use super::wrapper::RegionWrapper;
use crate::model::{
    approx_eq, ConfigurationError, ContentKind, ContentView, Insets, Rect, RegionId, Size,
};

/// The two materially different kinds of stack member.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionKind {
    /// A widget that owns its internal scroll offset.
    NativeScrollable(ContentView),
    /// Plain content wrapped to behave like a region. Always proxy-scrolled.
    Wrapper(RegionWrapper),
}

impl RegionKind {
    /// Pick the kind matching the content.
    ///
    /// # Errors
    /// Wrapping fails if plain content has no scrollable ancestor.
    pub fn for_content(content: ContentView) -> Result<Self, ConfigurationError> {
        match content.kind {
            ContentKind::NativeScrollable => Ok(Self::NativeScrollable(content)),
            ContentKind::Plain => RegionWrapper::new(content).map(Self::Wrapper),
        }
    }

    /// True for wrapped plain content.
    pub fn is_wrapper(&self) -> bool {
        matches!(self, Self::Wrapper(_))
    }

    /// The host content, unwrapped.
    pub fn real_content(&self) -> &ContentView {
        match self {
            Self::NativeScrollable(content) => content,
            Self::Wrapper(wrapper) => wrapper.real_content(),
        }
    }

    fn content_size(&self) -> Size {
        match self {
            Self::NativeScrollable(content) => content.size,
            Self::Wrapper(wrapper) => wrapper.content_size(),
        }
    }

    fn content_hidden(&self) -> bool {
        match self {
            Self::NativeScrollable(content) => content.hidden,
            Self::Wrapper(wrapper) => wrapper.is_hidden(),
        }
    }
}

/// Decoration drawn behind a region and its padding.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    /// What is drawn.
    pub content: ContentView,
    /// Where it is drawn: the region's stacked extent.
    pub frame: Rect,
}

/// One member of the vertical stack.
///
/// Holds the host-facing state the engine writes: frame and internal offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    id: RegionId,
    kind: RegionKind,
    hidden: bool,
    height_override: Option<f64>,
    frame: Rect,
    internal_offset: f64,
    background: Option<Background>,
}

impl Region {
    pub(crate) fn new(id: RegionId, kind: RegionKind, height_override: Option<f64>) -> Self {
        Self {
            id,
            kind,
            hidden: false,
            height_override,
            frame: Rect::ZERO,
            internal_offset: 0.0,
            background: None,
        }
    }

    /// Handle of this region.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Native or wrapper.
    pub fn kind(&self) -> &RegionKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut RegionKind {
        &mut self.kind
    }

    pub(crate) fn into_kind(self) -> RegionKind {
        self.kind
    }

    /// True if the region wraps plain content.
    pub fn is_wrapper(&self) -> bool {
        self.kind.is_wrapper()
    }

    /// The host content, unwrapped.
    pub fn real_content(&self) -> &ContentView {
        self.kind.real_content()
    }

    /// Hidden if the region itself or its wrapped content is hidden.
    pub fn is_hidden(&self) -> bool {
        self.hidden || self.kind.content_hidden()
    }

    /// Whether the region itself (not its content) is hidden.
    pub fn is_region_hidden(&self) -> bool {
        self.hidden
    }

    pub(crate) fn set_region_hidden(&mut self, hidden: bool) -> bool {
        let changed = self.hidden != hidden;
        self.hidden = hidden;
        changed
    }

    /// Whether the content has a containing scrollable ancestor.
    pub fn is_attached(&self) -> bool {
        self.real_content().attached
    }

    /// Fixed content height, if any.
    pub fn height_override(&self) -> Option<f64> {
        self.height_override
    }

    pub(crate) fn set_height_override(&mut self, height: Option<f64>) {
        self.height_override = height;
    }

    /// Intrinsic size as currently known to the engine.
    pub fn content_size(&self) -> Size {
        self.kind.content_size()
    }

    /// Height the region occupies in the stack: override or intrinsic
    /// height, plus vertical padding.
    pub fn layout_height(&self, padding: &Insets) -> f64 {
        let content = self
            .height_override
            .unwrap_or_else(|| self.content_size().height);
        (content + padding.vertical()).max(0.0)
    }

    /// Last frame written by the engine.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Last internal scroll offset written by the engine.
    pub fn internal_offset(&self) -> f64 {
        self.internal_offset
    }

    /// Write a frame. Returns false without writing if the new frame is within
    /// tolerance of the current one.
    pub(crate) fn set_frame(&mut self, frame: Rect) -> bool {
        if self.frame.approx_eq(&frame) {
            return false;
        }
        self.frame = frame;
        true
    }

    /// Write the internal offset. Returns false if within tolerance.
    pub(crate) fn set_internal_offset(&mut self, offset: f64) -> bool {
        if approx_eq(self.internal_offset, offset) {
            return false;
        }
        self.internal_offset = offset;
        true
    }

    /// Background decoration, if any.
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub(crate) fn background_mut(&mut self) -> Option<&mut Background> {
        self.background.as_mut()
    }

    pub(crate) fn replace_background(&mut self, background: Option<Background>) -> Option<Background> {
        std::mem::replace(&mut self.background, background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegionIdAllocator;

    fn region(content: ContentView) -> Region {
        let id = RegionIdAllocator::new().allocate();
        Region::new(id, RegionKind::for_content(content).unwrap(), None)
    }

    #[test]
    fn kind_follows_content() {
        assert!(region(ContentView::plain("p", 10.0)).is_wrapper());
        assert!(!region(ContentView::scrollable("s", 10.0)).is_wrapper());
    }

    #[test]
    fn native_scrollables_do_not_need_an_ancestor_to_register() {
        let kind = RegionKind::for_content(ContentView::scrollable("s", 10.0).detached());
        assert!(kind.is_ok());
    }

    #[test]
    fn hidden_content_hides_the_region() {
        let r = region(ContentView::plain("p", 10.0).hidden());
        assert!(r.is_hidden());
        assert!(!r.is_region_hidden());
    }

    #[test]
    fn layout_height_adds_padding_and_prefers_override() {
        let mut r = region(ContentView::plain("p", 100.0));
        let padding = Insets::new(5.0, 0.0, 7.0, 0.0);
        assert_eq!(r.layout_height(&padding), 112.0);

        r.set_height_override(Some(40.0));
        assert_eq!(r.layout_height(&padding), 52.0);
    }

    #[test]
    fn writes_within_tolerance_are_skipped() {
        let mut r = region(ContentView::plain("p", 100.0));
        assert!(r.set_frame(Rect::new(0.0, 10.0, 500.0, 100.0)));
        assert!(!r.set_frame(Rect::new(0.0, 10.0005, 500.0, 100.0)));
        assert!(r.set_internal_offset(3.0));
        assert!(!r.set_internal_offset(3.0001));
        assert_eq!(r.internal_offset(), 3.0);
    }
}
