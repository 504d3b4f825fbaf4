//! Descriptors for the content a region presents.
//!
//! The host framework owns the real views. The engine only needs the facts
//! below, and learns about changes to them through notifications.

use super::geometry::Size;
use serde::{Deserialize, Serialize};

/// Whether content scrolls on its own or has to be wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Arbitrary view with no scroll mechanism of its own.
    #[default]
    Plain,
    /// Table/collection/list-like widget that owns an internal scroll offset.
    NativeScrollable,
}

/// Snapshot of a piece of host content.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentView {
    /// Human-readable label, used in logs and reports.
    pub label: String,
    /// Scroll capability.
    pub kind: ContentKind,
    /// Intrinsic content size.
    pub size: Size,
    /// Whether the content itself is hidden.
    pub hidden: bool,
    /// Whether the content resolves to a containing scrollable ancestor.
    pub attached: bool,
}

impl ContentView {
    /// Plain content of the given height. Width is decided by the layout.
    pub fn plain(label: impl Into<String>, height: f64) -> Self {
        Self {
            label: label.into(),
            kind: ContentKind::Plain,
            size: Size::new(0.0, height),
            hidden: false,
            attached: true,
        }
    }

    /// Natively-scrollable content with the given content height.
    pub fn scrollable(label: impl Into<String>, content_height: f64) -> Self {
        Self {
            kind: ContentKind::NativeScrollable,
            ..Self::plain(label, content_height)
        }
    }

    /// Mark the content hidden.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Mark the content as not attached to any scrollable ancestor.
    pub fn detached(mut self) -> Self {
        self.attached = false;
        self
    }

    /// True if the content scrolls itself.
    pub fn is_native_scrollable(&self) -> bool {
        self.kind == ContentKind::NativeScrollable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_defaults_to_visible_and_attached() {
        let c = ContentView::plain("header", 120.0);
        assert_eq!(c.kind, ContentKind::Plain);
        assert_eq!(c.size.height, 120.0);
        assert!(!c.hidden);
        assert!(c.attached);
    }

    #[test]
    fn builders_compose() {
        let c = ContentView::scrollable("feed", 2000.0).hidden().detached();
        assert!(c.is_native_scrollable());
        assert!(c.hidden);
        assert!(!c.attached);
    }
}
