//! Domain model types (pure).
//!
//! Geometry, identifiers, content descriptors and the error taxonomy. Nothing
//! in here knows about layout passes.

pub mod content;
pub mod error;
pub mod geometry;
pub mod identifiers;

// Re-export for convenience
pub use content::{ContentKind, ContentView};
pub use error::{AppError, ConfigurationError, LayoutError};
pub use geometry::{approx_eq, Insets, Point, Rect, Size, FRAME_TOLERANCE};
pub use identifiers::{RegionId, RegionIdAllocator};
