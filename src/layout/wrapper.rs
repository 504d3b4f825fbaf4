//! Adapter that gives plain content the region interface.
//!
//! The wrapper mirrors the wrapped content's size and visibility. The engine
//! reads the mirrored values and never looks at the content directly, so a
//! change only takes effect once it has been reported through a notification.

use crate::model::{approx_eq, ConfigurationError, ContentView, Size};

/// Plain content presented as a scrollable region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionWrapper {
    content: ContentView,
    mirrored_size: Size,
    mirrored_hidden: bool,
}

impl RegionWrapper {
    /// Wrap `content`.
    ///
    /// # Errors
    /// [`ConfigurationError::NoScrollAncestor`] if the content is not attached
    /// to a scrollable ancestor; later geometry needs it for coordinate
    /// resolution.
    pub fn new(content: ContentView) -> Result<Self, ConfigurationError> {
        if !content.attached {
            return Err(ConfigurationError::NoScrollAncestor {
                label: content.label,
            });
        }
        Ok(Self {
            mirrored_size: content.size,
            mirrored_hidden: content.hidden,
            content,
        })
    }

    /// The original content.
    pub fn real_content(&self) -> &ContentView {
        &self.content
    }

    /// Unwrap, returning the original content.
    pub fn into_real_content(self) -> ContentView {
        self.content
    }

    /// Size reported to the engine.
    pub fn content_size(&self) -> Size {
        self.mirrored_size
    }

    /// Visibility reported to the engine.
    pub fn is_hidden(&self) -> bool {
        self.mirrored_hidden
    }

    /// Mirror a new intrinsic size. Returns true if the mirrored height moved
    /// by more than the frame tolerance, i.e. a relayout is warranted.
    pub fn content_size_changed(&mut self, size: Size) -> bool {
        self.content.size = size;
        let changed = !approx_eq(self.mirrored_size.height, size.height);
        self.mirrored_size = size;
        changed
    }

    /// Mirror the content's visibility. Returns true if it flipped.
    pub fn visibility_changed(&mut self, hidden: bool) -> bool {
        self.content.hidden = hidden;
        let changed = self.mirrored_hidden != hidden;
        self.mirrored_hidden = hidden;
        changed
    }

    /// Record whether the content still resolves to a scrollable ancestor.
    pub fn attachment_changed(&mut self, attached: bool) -> bool {
        let changed = self.content.attached != attached;
        self.content.attached = attached;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_requires_scroll_ancestor() {
        let err = RegionWrapper::new(ContentView::plain("orphan", 10.0).detached()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::NoScrollAncestor {
                label: "orphan".to_string()
            }
        );
    }

    #[test]
    fn mirrors_initial_state() {
        let wrapper = RegionWrapper::new(ContentView::plain("label", 44.0).hidden()).unwrap();
        assert_eq!(wrapper.content_size().height, 44.0);
        assert!(wrapper.is_hidden());
        assert_eq!(wrapper.real_content().label, "label");
    }

    #[test]
    fn size_change_is_mirrored_and_reported() {
        let mut wrapper = RegionWrapper::new(ContentView::plain("label", 44.0)).unwrap();

        assert!(wrapper.content_size_changed(Size::new(0.0, 80.0)));
        assert_eq!(wrapper.content_size().height, 80.0);
        assert_eq!(wrapper.real_content().size.height, 80.0);
    }

    #[test]
    fn sub_tolerance_size_change_is_not_reported() {
        let mut wrapper = RegionWrapper::new(ContentView::plain("label", 44.0)).unwrap();
        assert!(!wrapper.content_size_changed(Size::new(0.0, 44.0004)));
    }

    #[test]
    fn visibility_change_reports_flips_only() {
        let mut wrapper = RegionWrapper::new(ContentView::plain("label", 44.0)).unwrap();
        assert!(wrapper.visibility_changed(true));
        assert!(!wrapper.visibility_changed(true));
        assert!(wrapper.real_content().hidden);
        assert!(wrapper.visibility_changed(false));
    }

    #[test]
    fn into_real_content_returns_latest_state() {
        let mut wrapper = RegionWrapper::new(ContentView::plain("label", 44.0)).unwrap();
        wrapper.content_size_changed(Size::new(0.0, 12.0));
        let content = wrapper.into_real_content();
        assert_eq!(content.size.height, 12.0);
    }
}
