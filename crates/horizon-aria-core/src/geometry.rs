//! Basic geometric types used by layout delegates and navigation.
//!
//! These are plain value types: an origin-plus-size rectangle, a point, and
//! a size, all in logical pixels. Navigation code compares item rectangles
//! to decide row/column membership and page boundaries; nothing here knows
//! about rendering.

/// A point in logical pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The origin point (0, 0).
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
}

/// A size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A zero size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Returns true if either dimension is zero or negative.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A rectangle defined by an origin and a size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle from origin and size.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    /// An empty rectangle at the origin.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    /// Left edge.
    #[inline]
    pub fn x(&self) -> f32 {
        self.origin.x
    }

    /// Top edge.
    #[inline]
    pub fn y(&self) -> f32 {
        self.origin.y
    }

    /// Width of the rectangle.
    #[inline]
    pub fn width(&self) -> f32 {
        self.size.width
    }

    /// Height of the rectangle.
    #[inline]
    pub fn height(&self) -> f32 {
        self.size.height
    }

    /// Right edge.
    #[inline]
    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.width
    }

    /// Bottom edge.
    #[inline]
    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.height
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Returns true if the rectangle has no area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Returns true if `point` lies inside the rectangle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x() && point.x < self.max_x() && point.y >= self.y() && point.y < self.max_y()
    }

    /// Returns true if the two rectangles overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x() < other.max_x()
            && other.x() < self.max_x()
            && self.y() < other.max_y()
            && other.y() < self.max_y()
    }

    /// Translate the rectangle by the given offsets.
    #[inline]
    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x() + dx, self.y() + dy, self.width(), self.height())
    }
}
