//! Change notifications pushed into the engine.
//!
//! The engine never polls content. The host reports changes through
//! [`Notification`]s, either directly via `LayoutEngine::notify` or from
//! inside a [`RegionObserver`] callback while a pass is writing frames.

use crate::model::{Rect, RegionId, Size};

/// A change to a registered region's content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notification {
    /// The content's intrinsic size changed.
    ContentSizeChanged {
        /// Affected region.
        region: RegionId,
        /// New intrinsic size.
        size: Size,
    },
    /// The content was hidden or shown.
    VisibilityChanged {
        /// Affected region.
        region: RegionId,
        /// True if the content is now hidden.
        hidden: bool,
    },
    /// The content gained or lost its containing scrollable ancestor.
    AttachmentChanged {
        /// Affected region.
        region: RegionId,
        /// True if the content now has an ancestor.
        attached: bool,
    },
}

impl Notification {
    /// Region the notification is about.
    pub fn region(&self) -> RegionId {
        match self {
            Self::ContentSizeChanged { region, .. }
            | Self::VisibilityChanged { region, .. }
            | Self::AttachmentChanged { region, .. } => *region,
        }
    }
}

/// A frame/offset write the engine just applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionUpdate {
    /// Region that was written.
    pub region: RegionId,
    /// Frame after the write.
    pub frame: Rect,
    /// Internal scroll offset after the write.
    pub internal_offset: f64,
}

/// Collects notifications raised synchronously from observer callbacks.
#[derive(Debug, Default)]
pub struct Notifier {
    pending: Vec<Notification>,
}

impl Notifier {
    /// Create an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notification.
    pub fn push(&mut self, notification: Notification) {
        self.pending.push(notification);
    }

    /// Queue a [`Notification::ContentSizeChanged`].
    pub fn content_size_changed(&mut self, region: RegionId, size: Size) {
        self.push(Notification::ContentSizeChanged { region, size });
    }

    /// Queue a [`Notification::VisibilityChanged`].
    pub fn visibility_changed(&mut self, region: RegionId, hidden: bool) {
        self.push(Notification::VisibilityChanged { region, hidden });
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, Notification> {
        self.pending.drain(..)
    }
}

/// Host hook invoked after every effective frame or offset write.
///
/// Implementations run on the layout thread, synchronously, in the middle of
/// a pass. Anything pushed into `notifier` is applied right after the call
/// returns.
pub trait RegionObserver {
    /// Called after `update` was applied. Push follow-up changes into
    /// `notifier`.
    fn region_did_update(&mut self, update: &RegionUpdate, notifier: &mut Notifier);
}

impl<F> RegionObserver for F
where
    F: FnMut(&RegionUpdate, &mut Notifier),
{
    fn region_did_update(&mut self, update: &RegionUpdate, notifier: &mut Notifier) {
        self(update, notifier)
    }
}
