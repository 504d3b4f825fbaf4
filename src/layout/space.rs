//! Per-region margin and padding overrides.
//!
//! Margins reserve space between regions (and at the ends of the stack);
//! padding reserves space inside a region, between its frame and its content.
//! Lookups are total: a region without an override gets the registry default.

use crate::model::{Insets, RegionId};
use std::collections::HashMap;

/// Margin/padding storage with per-instance defaults.
#[derive(Debug, Clone, Default)]
pub struct SpaceRegistry {
    default_margins: Insets,
    default_padding: Insets,
    margins: HashMap<RegionId, Insets>,
    padding: HashMap<RegionId, Insets>,
}

impl SpaceRegistry {
    /// Create a registry with the given defaults.
    pub fn new(default_margins: Insets, default_padding: Insets) -> Self {
        Self {
            default_margins,
            default_padding,
            margins: HashMap::new(),
            padding: HashMap::new(),
        }
    }

    /// Override if present, else the default margin.
    pub fn margins_for(&self, region: RegionId) -> Insets {
        self.margins
            .get(&region)
            .copied()
            .unwrap_or(self.default_margins)
    }

    /// Override if present, else the default padding.
    pub fn padding_for(&self, region: RegionId) -> Insets {
        self.padding
            .get(&region)
            .copied()
            .unwrap_or(self.default_padding)
    }

    /// Upsert a margin override. Returns the previously effective margins.
    pub fn set_margins(&mut self, insets: Insets, region: RegionId) -> Insets {
        let previous = self.margins_for(region);
        self.margins.insert(region, insets);
        previous
    }

    /// Upsert a padding override. Returns the previously effective padding.
    pub fn set_padding(&mut self, insets: Insets, region: RegionId) -> Insets {
        let previous = self.padding_for(region);
        self.padding.insert(region, insets);
        previous
    }

    #[cfg(test)]
    pub(crate) fn has_margin_override(&self, region: RegionId) -> bool {
        self.margins.contains_key(&region)
    }

    #[cfg(test)]
    pub(crate) fn has_padding_override(&self, region: RegionId) -> bool {
        self.padding.contains_key(&region)
    }

    /// Drop both overrides for a region.
    pub fn remove(&mut self, region: RegionId) {
        self.margins.remove(&region);
        self.padding.remove(&region);
    }

    /// Drop overrides for every region the predicate reports as detached.
    ///
    /// Returns the number of regions whose overrides were removed.
    pub fn purge_detached<F>(&mut self, is_attached: F) -> usize
    where
        F: Fn(RegionId) -> bool,
    {
        let mut doomed: Vec<RegionId> = self
            .margins
            .keys()
            .chain(self.padding.keys())
            .copied()
            .filter(|id| !is_attached(*id))
            .collect();
        doomed.sort_unstable();
        doomed.dedup();

        for id in &doomed {
            self.remove(*id);
        }
        doomed.len()
    }

    /// Margins for regions without an override.
    pub fn default_margins(&self) -> Insets {
        self.default_margins
    }

    /// Padding for regions without an override.
    pub fn default_padding(&self) -> Insets {
        self.default_padding
    }

    /// Replace the default margins.
    pub fn set_default_margins(&mut self, insets: Insets) {
        self.default_margins = insets;
    }

    /// Replace the default padding.
    pub fn set_default_padding(&mut self, insets: Insets) {
        self.default_padding = insets;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegionIdAllocator;

    fn ids(n: usize) -> Vec<RegionId> {
        let mut alloc = RegionIdAllocator::new();
        (0..n).map(|_| alloc.allocate()).collect()
    }

    #[test]
    fn lookups_fall_back_to_defaults() {
        let ids = ids(1);
        let registry = SpaceRegistry::new(Insets::uniform(4.0), Insets::uniform(2.0));
        assert_eq!(registry.margins_for(ids[0]), Insets::uniform(4.0));
        assert_eq!(registry.padding_for(ids[0]), Insets::uniform(2.0));
    }

    #[test]
    fn override_wins_over_default() {
        let ids = ids(2);
        let mut registry = SpaceRegistry::new(Insets::uniform(4.0), Insets::ZERO);
        let previous = registry.set_margins(Insets::bottom(10.0), ids[0]);

        assert_eq!(previous, Insets::uniform(4.0));
        assert_eq!(registry.margins_for(ids[0]), Insets::bottom(10.0));
        assert_eq!(registry.margins_for(ids[1]), Insets::uniform(4.0));
    }

    #[test]
    fn changing_default_does_not_touch_overrides() {
        let ids = ids(2);
        let mut registry = SpaceRegistry::default();
        registry.set_padding(Insets::uniform(3.0), ids[0]);
        registry.set_default_padding(Insets::uniform(9.0));

        assert_eq!(registry.padding_for(ids[0]), Insets::uniform(3.0));
        assert_eq!(registry.padding_for(ids[1]), Insets::uniform(9.0));
    }

    #[test]
    fn remove_drops_both_overrides() {
        let ids = ids(1);
        let mut registry = SpaceRegistry::default();
        registry.set_margins(Insets::uniform(1.0), ids[0]);
        registry.set_padding(Insets::uniform(1.0), ids[0]);

        registry.remove(ids[0]);

        assert!(!registry.has_margin_override(ids[0]));
        assert!(!registry.has_padding_override(ids[0]));
        assert_eq!(registry.margins_for(ids[0]), Insets::ZERO);
    }

    #[test]
    fn purge_detached_only_removes_detached() {
        let ids = ids(3);
        let mut registry = SpaceRegistry::default();
        registry.set_margins(Insets::uniform(1.0), ids[0]);
        registry.set_padding(Insets::uniform(1.0), ids[1]);
        registry.set_margins(Insets::uniform(1.0), ids[2]);
        registry.set_padding(Insets::uniform(1.0), ids[2]);

        let detached = ids[2];
        let removed = registry.purge_detached(|id| id != detached);

        assert_eq!(removed, 1);
        assert!(registry.has_margin_override(ids[0]));
        assert!(registry.has_padding_override(ids[1]));
        assert!(!registry.has_margin_override(ids[2]));
        assert!(!registry.has_padding_override(ids[2]));
    }
}
