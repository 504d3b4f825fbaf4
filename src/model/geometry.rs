//! Geometry primitives shared by the layout engine and the scenario runner.
//!
//! Coordinates are `f64` in surface space: Y grows downward, the surface's
//! content starts at `y = 0`.

use serde::{Deserialize, Serialize};

/// Two values closer than this are treated as equal when deciding whether a
/// frame or offset write is needed.
pub const FRAME_TOLERANCE: f64 = 0.001;

/// Returns true if `a` and `b` differ by less than [`FRAME_TOLERANCE`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < FRAME_TOLERANCE
}

/// A point in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Origin `(0, 0)`.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// Empty size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Component-wise tolerance comparison.
    pub fn approx_eq(&self, other: &Size) -> bool {
        approx_eq(self.width, other.width) && approx_eq(self.height, other.height)
    }
}

/// An axis-aligned rectangle.
///
/// Intersection is half-open: rectangles that only share an edge do not
/// intersect, and a rectangle with zero height or width intersects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Point,
    /// Extent.
    pub size: Size,
}

impl Rect {
    /// The empty rectangle at the origin.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    /// Create a rectangle from its components.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Left edge.
    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    /// Top edge.
    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    /// Right edge.
    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    /// Bottom edge.
    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    /// Horizontal extent.
    pub fn width(&self) -> f64 {
        self.size.width
    }

    /// Vertical extent.
    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// True if the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.size.width <= 0.0 || self.size.height <= 0.0
    }

    /// True if the two rectangles share a region of positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min_x() < other.max_x()
            && other.min_x() < self.max_x()
            && self.min_y() < other.max_y()
            && other.min_y() < self.max_y()
    }

    /// True if the vertical spans overlap, ignoring X.
    pub fn intersects_vertically(&self, other: &Rect) -> bool {
        if self.size.height <= 0.0 || other.size.height <= 0.0 {
            return false;
        }
        self.min_y() < other.max_y() && other.min_y() < self.max_y()
    }

    /// True if `other`'s vertical span lies within this rectangle's.
    pub fn contains_vertically(&self, other: &Rect) -> bool {
        other.min_y() >= self.min_y() - FRAME_TOLERANCE
            && other.max_y() <= self.max_y() + FRAME_TOLERANCE
    }

    /// Grow (positive) or shrink (negative) the rectangle vertically by `dy`
    /// on each side.
    pub fn outset_vertically(&self, dy: f64) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y - dy,
            self.size.width,
            (self.size.height + 2.0 * dy).max(0.0),
        )
    }

    /// Shrink the rectangle by `insets` on each edge. Extents never go negative.
    pub fn inset_by(&self, insets: &Insets) -> Rect {
        Rect::new(
            self.origin.x + insets.left,
            self.origin.y + insets.top,
            (self.size.width - insets.horizontal()).max(0.0),
            (self.size.height - insets.vertical()).max(0.0),
        )
    }

    /// Component-wise tolerance comparison.
    pub fn approx_eq(&self, other: &Rect) -> bool {
        approx_eq(self.origin.x, other.origin.x)
            && approx_eq(self.origin.y, other.origin.y)
            && self.size.approx_eq(&other.size)
    }
}

/// Edge insets used for both margins and padding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Insets {
    /// Space above.
    pub top: f64,
    /// Space on the leading edge.
    pub left: f64,
    /// Space below.
    pub bottom: f64,
    /// Space on the trailing edge.
    pub right: f64,
}

impl Insets {
    /// All edges zero.
    pub const ZERO: Self = Self {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    /// Create insets in top/left/bottom/right order.
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Same value on every edge.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Only a bottom inset.
    pub fn bottom(value: f64) -> Self {
        Self::new(0.0, 0.0, value, 0.0)
    }

    /// `top + bottom`.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// `left + right`.
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// True if every edge is finite and not negative.
    pub fn is_valid(&self) -> bool {
        [self.top, self.left, self.bottom, self.right]
            .iter()
            .all(|edge| edge.is_finite() && *edge >= 0.0)
    }

    /// Copy with negative or non-finite edges replaced by zero.
    pub fn sanitized(&self) -> Self {
        let edge = |value: f64| if value.is_finite() { value.max(0.0) } else { 0.0 };
        Self::new(edge(self.top), edge(self.left), edge(self.bottom), edge(self.right))
    }
}
