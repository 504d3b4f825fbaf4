//! Serializable results of a scenario run, plus a plain-text rendering.

use crate::layout::LayoutStats;
use crate::model::{ContentKind, Rect, Size};
use serde::Serialize;
use std::fmt;

/// How a region relates to the viewport at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionState {
    /// Whole extent inside the viewport.
    FullyVisible,
    /// Partly inside the viewport.
    Visible,
    /// Stacked but outside the viewport.
    Offscreen,
    /// Not part of the stack (hidden or excluded).
    Hidden,
}

impl RegionState {
    fn as_str(self) -> &'static str {
        match self {
            Self::FullyVisible => "fully-visible",
            Self::Visible => "visible",
            Self::Offscreen => "offscreen",
            Self::Hidden => "hidden",
        }
    }
}

/// One region's geometry in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionReport {
    /// Region label from the scenario.
    pub label: String,
    /// Plain (wrapped) or natively scrollable.
    pub kind: ContentKind,
    /// `None` when the region takes no part in the stack.
    pub frame: Option<Rect>,
    /// Internal scroll offset; `None` like `frame`.
    pub internal_offset: Option<f64>,
    /// Visibility relative to the viewport.
    pub state: RegionState,
}

/// Engine output after the initial layout or one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// `"initial"` or the step that produced this snapshot.
    pub step: String,
    /// Surface scroll offset.
    pub offset: f64,
    /// Aggregate content size.
    pub content_size: Size,
    /// Every region, in stacking order.
    pub regions: Vec<RegionReport>,
}

/// Everything a scenario run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutReport {
    /// Initial snapshot, then one per step and extra offset.
    pub snapshots: Vec<Snapshot>,
    /// Regions the engine refused to register, with the reason.
    pub rejected: Vec<(String, String)>,
    /// Engine counters at the end of the run.
    pub stats: LayoutStats,
}

impl LayoutReport {
    /// The snapshot taken last.
    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }
}

fn kind_name(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Plain => "plain",
        ContentKind::NativeScrollable => "native",
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[{}] offset={} content={}x{}",
            self.step, self.offset, self.content_size.width, self.content_size.height
        )?;
        for region in &self.regions {
            match (region.frame, region.internal_offset) {
                (Some(frame), Some(offset)) => writeln!(
                    f,
                    "  {:<10} {:<6} y={:<6} h={:<6} off={:<6} {}",
                    region.label,
                    kind_name(region.kind),
                    frame.min_y(),
                    frame.height(),
                    offset,
                    region.state.as_str()
                )?,
                _ => writeln!(
                    f,
                    "  {:<10} {:<6} {}",
                    region.label,
                    kind_name(region.kind),
                    region.state.as_str()
                )?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for LayoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for snapshot in &self.snapshots {
            write!(f, "{snapshot}")?;
        }
        for (label, reason) in &self.rejected {
            writeln!(f, "rejected: {label} ({reason})")?;
        }
        write!(
            f,
            "stats: rebuilds={} reflows={} dropped={} excluded={}",
            self.stats.full_rebuilds,
            self.stats.incremental_reflows,
            self.stats.dropped_requests,
            self.stats.excluded_regions
        )
    }
}
