//! Layout layer - geometry cache, placement rules and the engine
//!
//! # Module Structure
//!
//! - `cache`: GeometryCache / GeometryEntry - per-region attributes from the last rebuild
//! - `engine`: LayoutEngine - registration, rebuild, reflow, positioning, batching
//! - `notification`: Notification, Notifier, RegionObserver - change reporting in both directions
//! - `positioning`: Placement - wrapper vs native-scrollable placement rules
//! - `range_query`: binary-search range selection over sorted entries
//! - `region`: Region / RegionKind / Background - stack members
//! - `space`: SpaceRegistry - margin and padding overrides
//! - `stats`: LayoutStats - counters for tests and reports
//! - `surface`: Surface - viewport, insets and scroll offset
//! - `wrapper`: RegionWrapper - plain content adapted to the region interface

pub mod cache;
pub mod engine;
pub mod notification;
pub mod positioning;
pub mod range_query;
pub mod region;
pub mod space;
pub mod stats;
pub mod surface;
pub mod wrapper;

pub use cache::{CacheState, GeometryCache, GeometryEntry};
pub use engine::{BatchStatus, LayoutEngine, RegionOptions, MAX_NESTED_PASSES};
pub use notification::{Notification, Notifier, RegionObserver, RegionUpdate};
pub use positioning::Placement;
pub use region::{Background, Region, RegionKind};
pub use space::SpaceRegistry;
pub use stats::LayoutStats;
pub use surface::Surface;
pub use wrapper::RegionWrapper;
