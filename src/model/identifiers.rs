//! Identifier newtypes.
//!
//! Region handles are opaque: they are minted by the engine that registers the
//! region and are never reused within that engine.

use std::fmt;

/// Opaque handle for a region registered with a `LayoutEngine`.
/// NEVER export the constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(u64);

impl RegionId {
    /// Raw numeric value, for logging and reports.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

/// Monotonic source of fresh [`RegionId`]s.
#[derive(Debug, Clone, Default)]
pub struct RegionIdAllocator {
    next: u64,
}

impl RegionIdAllocator {
    /// Create an allocator starting at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next handle.
    pub fn allocate(&mut self) -> RegionId {
        let id = RegionId(self.next);
        self.next += 1;
        id
    }
}
