//! LayoutEngine: stacks regions into one continuous scroll surface.
//!
//! # Passes
//!
//! `layout_views()` drives a small state machine over the geometry cache:
//!
//! - **Full rebuild** (cache `Empty`): walk regions in stacking order, skip
//!   hidden ones, accumulate margins and heights into a running offset, record
//!   one [`GeometryEntry`] per region and write its initial frame.
//! - **Positioning** (cache `Finished`, every call): select the regions whose
//!   cached extent meets the valid rect, place each from its cached entry, and
//!   collapse regions that left the valid rect since the previous pass.
//!
//! A content-size change on a cached region does not rebuild. It reflows that
//! entry and the ones after it by following `next` links, then repositions.
//!
//! # Re-entrancy
//!
//! Everything runs on the caller's thread. The observer may push notifications
//! while a pass is writing frames; those are applied immediately. Layout
//! requests they cause while a rebuild is `Running` are dropped, writes within
//! [`FRAME_TOLERANCE`](crate::model::FRAME_TOLERANCE) are skipped, and nested
//! passes are capped at [`MAX_NESTED_PASSES`].

use super::cache::{advance, CacheState, GeometryCache, GeometryEntry};
use super::notification::{Notification, Notifier, RegionObserver, RegionUpdate};
use super::positioning::{self, Placement};
use super::region::{Background, Region, RegionKind};
use super::space::SpaceRegistry;
use super::stats::LayoutStats;
use super::surface::Surface;
use crate::config::EngineConfig;
use crate::model::{
    approx_eq, ConfigurationError, ContentView, Insets, LayoutError, Point, Rect, RegionId,
    RegionIdAllocator, Size,
};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, trace, warn};

/// Upper bound on layout passes nested inside one another through observer
/// notifications, and on rebuild restarts caused by mid-rebuild invalidation.
pub const MAX_NESTED_PASSES: usize = 8;

/// Optional parameters for [`LayoutEngine::add_region`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionOptions {
    /// Stacking position; `None` appends.
    pub index: Option<usize>,
    /// Margin override.
    pub margins: Option<Insets>,
    /// Padding override.
    pub padding: Option<Insets>,
    /// Fixed content height used instead of the intrinsic one.
    pub height_override: Option<f64>,
}

impl RegionOptions {
    /// Insert at `index` instead of appending.
    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Override the default margins.
    pub fn with_margins(mut self, margins: Insets) -> Self {
        self.margins = Some(margins);
        self
    }

    /// Override the default padding.
    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Stack with a fixed content height.
    pub fn with_height_override(mut self, height: f64) -> Self {
        self.height_override = Some(height);
        self
    }
}

/// Outcome handed to a batch completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// The batch body succeeded and the layout pass ran.
    Completed,
    /// The batch body returned an error. Mutations it applied before failing
    /// stay applied and were laid out.
    Cancelled,
}

/// The layout engine. See the module docs for the pass structure.
pub struct LayoutEngine {
    config: EngineConfig,
    surface: Surface,
    order: Vec<RegionId>,
    regions: HashMap<RegionId, Region>,
    ids: RegionIdAllocator,
    space: SpaceRegistry,
    cache: GeometryCache,
    /// Regions positioned by the previous pass.
    active: Vec<RegionId>,
    observer: Option<Box<dyn RegionObserver>>,
    batch_depth: usize,
    needs_layout: bool,
    pending_invalidation: bool,
    nesting: usize,
    /// Bumped by every rebuild, reflow and positioning pass.
    epoch: u64,
    stats: LayoutStats,
}

impl fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("surface", &self.surface)
            .field("order", &self.order)
            .field("cache_state", &self.cache.state())
            .field("content_size", &self.cache.content_size())
            .field("batch_depth", &self.batch_depth)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl LayoutEngine {
    /// Create an engine for a surface with the given viewport.
    ///
    /// Negative or non-finite default insets are zeroed.
    pub fn new(mut config: EngineConfig, viewport: Size) -> Self {
        for (what, insets) in [
            ("margins", &mut config.default_margins),
            ("padding", &mut config.default_padding),
        ] {
            if !insets.is_valid() {
                warn!(what, insets = ?*insets, "invalid default insets zeroed");
                *insets = insets.sanitized();
            }
        }
        Self {
            space: SpaceRegistry::new(config.default_margins, config.default_padding),
            config,
            surface: Surface::new(viewport),
            order: Vec::new(),
            regions: HashMap::new(),
            ids: RegionIdAllocator::new(),
            cache: GeometryCache::new(),
            active: Vec::new(),
            observer: None,
            batch_depth: 0,
            needs_layout: false,
            pending_invalidation: false,
            nesting: 0,
            epoch: 0,
            stats: LayoutStats::default(),
        }
    }

    // === Accessors ===

    /// Effective configuration, including default inset changes.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The scroll surface: viewport, insets and offset.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Cached stacking geometry.
    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    /// Margin and padding registry.
    pub fn space(&self) -> &SpaceRegistry {
        &self.space
    }

    /// Snapshot of the instrumentation counters.
    pub fn stats(&self) -> LayoutStats {
        self.stats
    }

    /// Region handles in stacking order, hidden ones included.
    pub fn region_ids(&self) -> &[RegionId] {
        &self.order
    }

    /// Number of registered regions.
    pub fn region_count(&self) -> usize {
        self.order.len()
    }

    /// Registered region state, hidden or not.
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    /// The original content behind a region, unwrapped.
    pub fn real_content(&self, id: RegionId) -> Option<&ContentView> {
        self.regions.get(&id).map(Region::real_content)
    }

    /// True if a pass was cut short by the nesting cap or deferred by a batch
    /// and the host should call `layout_views()` again.
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Install the observer notified after every effective write.
    pub fn set_observer(&mut self, observer: impl RegionObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Remove the observer.
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    // === Region registration ===

    /// Register content as a new region.
    ///
    /// # Errors
    /// - [`LayoutError::IndexOutOfBounds`] if `options.index` is past the end
    /// - [`ConfigurationError`] if plain content has no scroll ancestor, or the
    ///   height override, margins or padding are negative/non-finite. Nothing
    ///   is registered and the layout state is unchanged.
    pub fn add_region(
        &mut self,
        content: ContentView,
        options: RegionOptions,
    ) -> Result<RegionId, LayoutError> {
        let len = self.order.len();
        let index = options.index.unwrap_or(len);
        if index > len {
            return Err(LayoutError::IndexOutOfBounds { index, len });
        }
        if let Some(height) = options.height_override {
            validate_height_override(&content.label, height)?;
        }
        if let Some(margins) = options.margins {
            validate_insets("margins", &content.label, margins)?;
        }
        if let Some(padding) = options.padding {
            validate_insets("padding", &content.label, padding)?;
        }

        let label = content.label.clone();
        let kind = RegionKind::for_content(content).inspect_err(|err| {
            warn!(label = %label, error = %err, "region registration failed");
        })?;

        let id = self.ids.allocate();
        if let Some(margins) = options.margins {
            self.space.set_margins(margins, id);
        }
        if let Some(padding) = options.padding {
            self.space.set_padding(padding, id);
        }
        self.regions
            .insert(id, Region::new(id, kind, options.height_override));
        self.order.insert(index, id);
        debug!(region = %id, label = %label, index, "region added");

        self.structure_changed();
        Ok(id)
    }

    /// Unregister a region, returning its original content.
    ///
    /// # Errors
    /// [`LayoutError::UnknownRegion`] for a handle this engine doesn't know.
    pub fn remove_region(&mut self, id: RegionId) -> Result<ContentView, LayoutError> {
        let position = self.position_in_order(id)?;
        self.order.remove(position);
        let region = self
            .regions
            .remove(&id)
            .ok_or(LayoutError::UnknownRegion(id))?;
        self.space.remove(id);
        debug!(region = %id, position, "region removed");

        self.structure_changed();
        Ok(match region.into_kind() {
            RegionKind::NativeScrollable(content) => content,
            RegionKind::Wrapper(wrapper) => wrapper.into_real_content(),
        })
    }

    /// Move a region to a new stacking position.
    ///
    /// # Errors
    /// Unknown handle, or `to_index >= region_count()`.
    pub fn move_region(&mut self, id: RegionId, to_index: usize) -> Result<(), LayoutError> {
        let from = self.position_in_order(id)?;
        let len = self.order.len();
        if to_index >= len {
            return Err(LayoutError::IndexOutOfBounds {
                index: to_index,
                len,
            });
        }
        if from == to_index {
            return Ok(());
        }
        self.order.remove(from);
        self.order.insert(to_index, id);
        debug!(region = %id, from, to = to_index, "region moved");

        self.structure_changed();
        Ok(())
    }

    /// Hide or show the region itself, independent of its content.
    pub fn set_hidden(&mut self, id: RegionId, hidden: bool) -> Result<(), LayoutError> {
        let region = self
            .regions
            .get_mut(&id)
            .ok_or(LayoutError::UnknownRegion(id))?;
        let was_hidden = region.is_hidden();
        region.set_region_hidden(hidden);
        if region.is_hidden() != was_hidden {
            self.structure_changed();
        }
        Ok(())
    }

    /// Replace (or clear) the fixed content height of a region.
    pub fn set_height_override(
        &mut self,
        id: RegionId,
        height: Option<f64>,
    ) -> Result<(), LayoutError> {
        let region = self
            .regions
            .get_mut(&id)
            .ok_or(LayoutError::UnknownRegion(id))?;
        if let Some(height) = height {
            validate_height_override(&region.real_content().label, height)?;
        }
        if region.height_override() == height {
            return Ok(());
        }
        region.set_height_override(height);
        self.region_geometry_changed(id);
        Ok(())
    }

    // === Space configuration ===

    /// Effective margins of a region.
    pub fn margins_for(&self, id: RegionId) -> Insets {
        self.space.margins_for(id)
    }

    /// Effective padding of a region.
    pub fn padding_for(&self, id: RegionId) -> Insets {
        self.space.padding_for(id)
    }

    /// Override a region's margins. A cached region reflows from itself; any
    /// other region invalidates the cache.
    ///
    /// # Errors
    /// Unknown handle, or insets with a negative or non-finite edge.
    pub fn set_margins(&mut self, insets: Insets, id: RegionId) -> Result<(), LayoutError> {
        validate_insets("margins", &self.label_of(id)?, insets)?;
        if self.space.set_margins(insets, id) != insets {
            self.region_geometry_changed(id);
        }
        Ok(())
    }

    /// Override a region's padding. Same invalidation rules and errors as
    /// margins.
    pub fn set_padding(&mut self, insets: Insets, id: RegionId) -> Result<(), LayoutError> {
        validate_insets("padding", &self.label_of(id)?, insets)?;
        if self.space.set_padding(insets, id) != insets {
            self.region_geometry_changed(id);
        }
        Ok(())
    }

    /// Margins used by regions without an override.
    pub fn default_margins(&self) -> Insets {
        self.space.default_margins()
    }

    /// Padding used by regions without an override.
    pub fn default_padding(&self) -> Insets {
        self.space.default_padding()
    }

    /// Change the default margins. Always a full invalidation.
    ///
    /// # Errors
    /// Insets with a negative or non-finite edge; the defaults are unchanged.
    pub fn set_default_margins(&mut self, insets: Insets) -> Result<(), LayoutError> {
        validate_insets("margins", "defaults", insets)?;
        self.config.default_margins = insets;
        self.space.set_default_margins(insets);
        self.structure_changed();
        Ok(())
    }

    /// Change the default padding. Always a full invalidation.
    ///
    /// # Errors
    /// Same as [`set_default_margins`](Self::set_default_margins).
    pub fn set_default_padding(&mut self, insets: Insets) -> Result<(), LayoutError> {
        validate_insets("padding", "defaults", insets)?;
        self.config.default_padding = insets;
        self.space.set_default_padding(insets);
        self.structure_changed();
        Ok(())
    }

    /// Drop margin/padding overrides of regions without a scroll ancestor
    /// (and of regions no longer registered). Returns how many were purged.
    pub fn purge_detached(&mut self) -> usize {
        let attached: HashSet<RegionId> = self
            .regions
            .values()
            .filter(|r| r.is_attached())
            .map(Region::id)
            .collect();
        let purged = self.space.purge_detached(|id| attached.contains(&id));
        if purged > 0 {
            debug!(purged, "purged space overrides of detached regions");
        }
        purged
    }

    // === Background decoration ===

    /// Attach a background to a region, returning the previous one.
    pub fn set_background(
        &mut self,
        content: ContentView,
        id: RegionId,
    ) -> Result<Option<ContentView>, LayoutError> {
        let frame = self
            .cache
            .entry_for(id)
            .map(GeometryEntry::frame)
            .unwrap_or(Rect::ZERO);
        let region = self
            .regions
            .get_mut(&id)
            .ok_or(LayoutError::UnknownRegion(id))?;
        let previous = region.replace_background(Some(Background { content, frame }));
        Ok(previous.map(|bg| bg.content))
    }

    /// Detach a region's background.
    pub fn remove_background(&mut self, id: RegionId) -> Result<Option<ContentView>, LayoutError> {
        let region = self
            .regions
            .get_mut(&id)
            .ok_or(LayoutError::UnknownRegion(id))?;
        Ok(region.replace_background(None).map(|bg| bg.content))
    }

    /// Frame of a region's background, if it has one.
    pub fn background_frame_for(&self, id: RegionId) -> Option<Rect> {
        self.regions
            .get(&id)
            .and_then(Region::background)
            .map(|bg| bg.frame)
    }

    // === Surface input ===

    /// Resize the viewport. A width change invalidates the cache; a height
    /// change only repositions.
    pub fn set_viewport(&mut self, viewport: Size) {
        let current = self.surface.viewport();
        if current.approx_eq(&viewport) {
            return;
        }
        self.surface.set_viewport(viewport);
        if !approx_eq(current.width, viewport.width) {
            self.invalidate();
        } else {
            self.refresh_content_size();
        }
        self.layout_views();
    }

    /// Change the surface's content insets and reposition.
    pub fn set_content_insets(&mut self, insets: Insets) {
        self.surface.set_content_insets(insets);
        self.refresh_content_size();
        self.layout_views();
    }

    /// Scroll the surface and reposition.
    pub fn set_content_offset(&mut self, offset: f64) {
        self.surface.set_content_offset(offset);
        self.layout_views();
    }

    /// Aggregate content size for the surface's scrollable extent.
    pub fn current_content_size(&self) -> Size {
        self.cache.content_size()
    }

    // === Geometry queries ===

    /// Current frame of a region that takes part in the stack.
    ///
    /// `None` for unknown, hidden, or excluded regions.
    pub fn frame_for(&self, id: RegionId) -> Option<Rect> {
        self.stacked_region(id).map(Region::frame)
    }

    /// Current internal scroll offset of a region that takes part in the stack.
    pub fn internal_offset_for(&self, id: RegionId) -> Option<f64> {
        self.stacked_region(id).map(Region::internal_offset)
    }

    /// Full content extent of a region inside its padding.
    pub fn content_frame_for(&self, id: RegionId) -> Option<Rect> {
        let entry = self.cache.entry_for(id)?;
        Some(entry.frame().inset_by(&self.space.padding_for(id)))
    }

    /// True if any part of the region's extent overlaps the viewport.
    pub fn is_visible(&self, id: RegionId) -> bool {
        self.cached_extent(id)
            .is_some_and(|extent| extent.intersects_vertically(&self.surface.visible_rect()))
    }

    /// True if the region's whole extent lies inside the viewport.
    pub fn is_fully_visible(&self, id: RegionId) -> bool {
        self.cached_extent(id).is_some_and(|extent| {
            extent.height() > 0.0 && self.surface.visible_rect().contains_vertically(&extent)
        })
    }

    // === Notifications ===

    /// Apply a change reported by the content layer.
    ///
    /// Notifications for unknown regions are ignored; they can race with
    /// removal.
    pub fn notify(&mut self, notification: Notification) {
        match notification {
            Notification::ContentSizeChanged { region, size } => {
                self.content_size_changed(region, size)
            }
            Notification::VisibilityChanged { region, hidden } => {
                self.visibility_changed(region, hidden)
            }
            Notification::AttachmentChanged { region, attached } => {
                self.attachment_changed(region, attached)
            }
        }
    }

    fn content_size_changed(&mut self, id: RegionId, size: Size) {
        let Some(region) = self.regions.get_mut(&id) else {
            debug!(region = %id, "size change for unknown region ignored");
            return;
        };
        let changed = match region.kind_mut() {
            RegionKind::Wrapper(wrapper) => wrapper.content_size_changed(size),
            RegionKind::NativeScrollable(content) => {
                let changed = !approx_eq(content.size.height, size.height);
                content.size = size;
                changed
            }
        };
        if !changed
            || region.height_override().is_some()
            || region.is_hidden()
            || !region.is_attached()
        {
            return;
        }
        self.region_geometry_changed(id);
    }

    fn visibility_changed(&mut self, id: RegionId, hidden: bool) {
        let Some(region) = self.regions.get_mut(&id) else {
            debug!(region = %id, "visibility change for unknown region ignored");
            return;
        };
        let was_hidden = region.is_hidden();
        match region.kind_mut() {
            RegionKind::Wrapper(wrapper) => {
                wrapper.visibility_changed(hidden);
            }
            RegionKind::NativeScrollable(content) => content.hidden = hidden,
        }
        if region.is_hidden() != was_hidden {
            self.structure_changed();
        }
    }

    fn attachment_changed(&mut self, id: RegionId, attached: bool) {
        let Some(region) = self.regions.get_mut(&id) else {
            debug!(region = %id, "attachment change for unknown region ignored");
            return;
        };
        let changed = match region.kind_mut() {
            RegionKind::Wrapper(wrapper) => wrapper.attachment_changed(attached),
            RegionKind::NativeScrollable(content) => {
                let changed = content.attached != attached;
                content.attached = attached;
                changed
            }
        };
        if changed && !region.is_hidden() {
            self.structure_changed();
        }
    }

    // === Batch mode ===

    /// Run `body` with per-call layout suspended, then lay out once.
    ///
    /// Batches nest; only the outermost one runs the pass. `completion` runs
    /// after the pass with the batch status. Returns the body's result.
    pub fn perform_batch_updates<T, B, C>(&mut self, body: B, completion: C) -> Result<T, LayoutError>
    where
        B: FnOnce(&mut Self) -> Result<T, LayoutError>,
        C: FnOnce(BatchStatus),
    {
        self.batch_depth += 1;
        let result = body(self);
        self.batch_depth -= 1;

        if self.batch_depth == 0 && self.needs_layout {
            self.layout_views();
        }

        let status = if result.is_ok() {
            BatchStatus::Completed
        } else {
            BatchStatus::Cancelled
        };
        debug!(?status, depth = self.batch_depth, "batch finished");
        completion(status);
        result
    }

    // === Layout ===

    /// Drop all cached geometry. The next `layout_views()` rebuilds.
    ///
    /// While a rebuild is running the invalidation is deferred until it
    /// finishes, so nothing ever reads a half-built cache.
    pub fn invalidate(&mut self) {
        if self.cache.state() == CacheState::Running {
            self.pending_invalidation = true;
            return;
        }
        self.cache.invalidate();
        self.active.clear();
    }

    /// Bring every region's frame and offset up to date.
    ///
    /// Idempotent. A no-op while a rebuild is running; deferred while a
    /// batch is open.
    pub fn layout_views(&mut self) {
        if self.batch_depth > 0 {
            self.needs_layout = true;
            return;
        }
        match self.cache.state() {
            CacheState::Running => {
                self.stats.dropped_requests += 1;
                debug!("layout request dropped: rebuild already running");
                return;
            }
            CacheState::Empty | CacheState::Finished => {}
        }
        if self.nesting >= MAX_NESTED_PASSES {
            warn!(
                depth = self.nesting,
                "nested layout limit reached; deferring to next layout_views()"
            );
            self.needs_layout = true;
            return;
        }
        if self.nesting == 0 {
            self.needs_layout = false;
        }

        self.nesting += 1;
        if self.cache.state() == CacheState::Empty {
            self.rebuild();
        }
        if self.cache.state() == CacheState::Finished {
            self.position_regions();
        }
        self.nesting -= 1;
    }

    fn structure_changed(&mut self) {
        self.invalidate();
        self.layout_views();
    }

    /// A single region's stacked height or spacing changed.
    fn region_geometry_changed(&mut self, id: RegionId) {
        match self.cache.state() {
            CacheState::Running => {
                self.stats.dropped_requests += 1;
                // Regions not reached yet pick the change up in this rebuild.
                if self.cache.position_of(id).is_some() {
                    self.pending_invalidation = true;
                }
                debug!(region = %id, "relayout request dropped: rebuild already running");
            }
            CacheState::Empty => self.layout_views(),
            CacheState::Finished => match self.cache.position_of(id) {
                Some(position) if self.batch_depth == 0 => {
                    self.reflow_from(position);
                    self.layout_views();
                }
                _ => self.structure_changed(),
            },
        }
    }

    /// Full rebuild: `Empty -> Running -> Finished`.
    fn rebuild(&mut self) {
        for _ in 0..MAX_NESTED_PASSES {
            if !self.cache.begin_rebuild() {
                return;
            }
            debug!(regions = self.order.len(), "full rebuild started");

            let width = self.surface.width();
            let mut y_offset = 0.0;
            self.active.clear();

            let order = self.order.clone();
            for id in order {
                let Some(region) = self.regions.get(&id) else {
                    continue;
                };
                if region.is_hidden() {
                    continue;
                }

                let margins = self.space.margins_for(id);
                y_offset += margins.top;
                if !region.is_attached() {
                    // Consumes no space, not even its top margin.
                    y_offset -= margins.top;
                    self.stats.excluded_regions += 1;
                    warn!(
                        region = %id,
                        label = %region.real_content().label,
                        "region has no scroll ancestor; excluded from stack"
                    );
                    continue;
                }

                let padding = self.space.padding_for(id);
                let content_height = region.layout_height(&padding);
                let region_width = (width - margins.horizontal()).max(0.0);
                let height = positioning::rebuild_height(
                    region.kind(),
                    &self.surface,
                    y_offset,
                    content_height,
                    region.internal_offset(),
                );
                let frame = Rect::new(margins.left, y_offset.round(), region_width, height);

                self.cache.add(GeometryEntry::new(
                    id,
                    Point::new(margins.left, y_offset),
                    Size::new(region_width, content_height),
                ));
                self.active.push(id);
                y_offset = advance(y_offset, content_height, margins.bottom);

                self.position_background(id);
                self.write_region(id, frame, None);
            }

            let content_height = y_offset + self.config.trailing_inset;
            self.cache
                .finish_rebuild(Size::new(width, content_height.max(self.surface.min_content_height())));
            self.epoch += 1;
            self.stats.full_rebuilds += 1;
            debug!(
                entries = self.cache.len(),
                content_height,
                "full rebuild finished"
            );

            if !std::mem::take(&mut self.pending_invalidation) {
                return;
            }
            debug!("structure changed during rebuild; rebuilding again");
            self.cache.invalidate();
        }
        warn!("rebuild kept being invalidated; deferring to next layout_views()");
        self.needs_layout = true;
    }

    /// Positioning pass over the valid rect.
    fn position_regions(&mut self) {
        self.stats.positioning_passes += 1;
        self.epoch += 1;
        let epoch = self.epoch;

        let valid = self.surface.valid_rect(self.config.valid_rect_buffer);
        let discardable = self.surface.discardable_rect(self.config.discardable_factor);
        let range = self.cache.range_intersecting(&valid);
        let targets: Vec<RegionId> = self.cache.entries()[range]
            .iter()
            .map(GeometryEntry::region)
            .collect();
        let in_range: HashSet<RegionId> = targets.iter().copied().collect();
        let retired: Vec<RegionId> = std::mem::take(&mut self.active)
            .into_iter()
            .filter(|id| !in_range.contains(id))
            .collect();
        // Retired regions stay active until this pass completes, so a nested
        // pass that supersedes this one still collapses them.
        self.active = targets.iter().chain(&retired).copied().collect();
        trace!(
            positioned = targets.len(),
            retired = retired.len(),
            offset = self.surface.content_offset(),
            "positioning pass"
        );

        // A notification applied mid-pass may reflow or rebuild the cache and
        // run a nested pass over the new range; the rest of this one is stale.
        for &id in &retired {
            if self.epoch != epoch || self.cache.state() != CacheState::Finished {
                return;
            }
            let Some(entry) = self.cache.entry_for(id) else {
                continue;
            };
            let placement = Placement::collapsed(entry);
            self.write_region(id, placement.frame, Some(placement.internal_offset));
        }

        for &id in &targets {
            if self.epoch != epoch || self.cache.state() != CacheState::Finished {
                return;
            }
            let (Some(entry), Some(region)) = (self.cache.entry_for(id), self.regions.get(&id))
            else {
                continue;
            };
            let placement = positioning::place(region.kind(), entry, &self.surface)
                .discard_outside(entry, &discardable);
            self.write_region(id, placement.frame, Some(placement.internal_offset));
        }
        if self.epoch == epoch {
            self.active = targets;
        }
    }

    /// Incremental reflow: recompute the entry at `start` and every entry
    /// after it, following `next` links. Entries before `start` are not
    /// touched.
    ///
    /// Each origin is the previous entry's unrounded trailing edge plus this
    /// entry's top margin, the same [`advance`] rule the full rebuild uses, so
    /// both paths produce identical geometry.
    fn reflow_from(&mut self, start: usize) {
        self.epoch += 1;
        let width = self.surface.width();
        let mut cursor = match self.cache.entry_at(start).and_then(GeometryEntry::previous) {
            Some(previous) => self.cache.entry_at(previous).map_or(0.0, |entry| {
                entry.trailing_edge(self.space.margins_for(entry.region()).bottom)
            }),
            None => 0.0,
        };

        let mut position = Some(start);
        let mut span = 0;
        while let Some(pos) = position {
            let Some(entry) = self.cache.entry_at(pos) else {
                break;
            };
            let id = entry.region();
            let next = entry.next();
            let margins = self.space.margins_for(id);
            let padding = self.space.padding_for(id);
            let height = self
                .regions
                .get(&id)
                .map_or(entry.content_size().height, |region| region.layout_height(&padding));

            if let Some(entry) = self.cache.entry_at_mut(pos) {
                entry.set_origin(Point::new(margins.left, cursor + margins.top));
                entry.set_content_size(Size::new((width - margins.horizontal()).max(0.0), height));
                cursor = entry.trailing_edge(margins.bottom);
            }
            self.position_background(id);
            span += 1;
            position = next;
        }

        let content_height = cursor + self.config.trailing_inset;
        self.cache.set_content_size(Size::new(
            width,
            content_height.max(self.surface.min_content_height()),
        ));
        self.stats.incremental_reflows += 1;
        self.stats.last_reflow_span = span;
        debug!(start, span, content_height, "incremental reflow");
    }

    /// Recompute the reported content size after a surface change that does
    /// not move any entry.
    fn refresh_content_size(&mut self) {
        if self.cache.state() != CacheState::Finished {
            return;
        }
        let stacked = self.cache.entries().last().map_or(0.0, |entry| {
            entry.trailing_edge(self.space.margins_for(entry.region()).bottom)
        }) + self.config.trailing_inset;
        self.cache.set_content_size(Size::new(
            self.surface.width(),
            stacked.max(self.surface.min_content_height()),
        ));
    }

    fn position_background(&mut self, id: RegionId) {
        let Some(frame) = self.cache.entry_for(id).map(GeometryEntry::frame) else {
            return;
        };
        if let Some(background) = self.regions.get_mut(&id).and_then(Region::background_mut) {
            background.frame = frame;
        }
    }

    /// Write a frame (and optionally an internal offset). Skips writes within
    /// tolerance; otherwise notifies the observer and applies whatever it
    /// reports back.
    fn write_region(&mut self, id: RegionId, frame: Rect, internal_offset: Option<f64>) {
        let Some(region) = self.regions.get_mut(&id) else {
            return;
        };
        let mut changed = region.set_frame(frame);
        if let Some(offset) = internal_offset {
            changed |= region.set_internal_offset(offset);
        }
        if !changed {
            self.stats.skipped_writes += 1;
            return;
        }
        self.stats.frame_writes += 1;

        let update = RegionUpdate {
            region: id,
            frame: region.frame(),
            internal_offset: region.internal_offset(),
        };
        trace!(
            region = %id,
            y = update.frame.min_y(),
            height = update.frame.height(),
            offset = update.internal_offset,
            "region updated"
        );

        let Some(mut observer) = self.observer.take() else {
            return;
        };
        let mut notifier = Notifier::new();
        observer.region_did_update(&update, &mut notifier);
        self.observer = Some(observer);

        for notification in notifier.drain() {
            self.notify(notification);
        }
    }

    // === Helpers ===

    fn label_of(&self, id: RegionId) -> Result<String, LayoutError> {
        self.regions
            .get(&id)
            .map(|region| region.real_content().label.clone())
            .ok_or(LayoutError::UnknownRegion(id))
    }

    fn position_in_order(&self, id: RegionId) -> Result<usize, LayoutError> {
        self.order
            .iter()
            .position(|candidate| *candidate == id)
            .ok_or(LayoutError::UnknownRegion(id))
    }

    fn stacked_region(&self, id: RegionId) -> Option<&Region> {
        self.regions
            .get(&id)
            .filter(|region| !region.is_hidden() && region.is_attached())
    }

    fn cached_extent(&self, id: RegionId) -> Option<Rect> {
        if self.cache.state() != CacheState::Finished {
            return None;
        }
        self.cache.entry_for(id).map(GeometryEntry::frame)
    }
}

fn validate_insets(what: &'static str, target: &str, insets: Insets) -> Result<(), ConfigurationError> {
    if insets.is_valid() {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidInsets {
            what,
            target: target.to_string(),
            insets,
        })
    }
}

fn validate_height_override(label: &str, height: f64) -> Result<(), ConfigurationError> {
    if height.is_finite() && height >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidHeightOverride {
            label: label.to_string(),
            value: height,
        })
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
