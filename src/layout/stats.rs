//! Counters describing what the engine did. Used by tests and the scenario
//! report; none of them affect layout.

use serde::Serialize;

/// Engine instrumentation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LayoutStats {
    /// Completed `Empty -> Running -> Finished` transitions.
    pub full_rebuilds: usize,
    /// Incremental single-region reflows.
    pub incremental_reflows: usize,
    /// Entries recomputed by the most recent incremental reflow.
    pub last_reflow_span: usize,
    /// Positioning passes over the valid rect.
    pub positioning_passes: usize,
    /// Frame or offset writes that changed a region.
    pub frame_writes: usize,
    /// Writes skipped because the value was within tolerance.
    pub skipped_writes: usize,
    /// Layout requests dropped because a rebuild was already running.
    pub dropped_requests: usize,
    /// Regions left out of a rebuild because they had no scroll ancestor.
    pub excluded_regions: usize,
}
