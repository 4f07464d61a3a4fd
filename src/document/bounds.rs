//! Axis-aligned bounding box representation with utility methods.
//!
//! This module provides the [`Bounds`] type used for every rectangle the
//! assembler handles: table extents, structure predictions and word boxes.

use geo::{Area, Coord, Rect};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An axis-aligned rectangle in table-local coordinates.
///
/// `Bounds` always satisfies `left <= right` and `top <= bottom`; the
/// constructor normalizes swapped corners. Degenerate rectangles (zero width
/// or height) are representable and have an area of `0`.
///
/// # Coordinate System
///
/// - **X-axis**: Increases from left to right
/// - **Y-axis**: Increases from top to bottom (image coordinates)
///
/// The origin `(0, 0)` is the top-left corner of the cropped table.
///
/// # Serialization
///
/// `Bounds` serializes as a flat `[xmin, ymin, xmax, ymax]` array:
///
/// ```json
/// [0.0, 0.0, 100.0, 50.0]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    rect: Rect<f64>,
}

impl Bounds {
    /// Creates a new `Bounds` from its four edges.
    ///
    /// # Arguments
    ///
    /// * `xmin` - Left edge
    /// * `ymin` - Top edge
    /// * `xmax` - Right edge
    /// * `ymax` - Bottom edge
    ///
    /// Swapped edges are normalized, so the result always satisfies the
    /// `xmin <= xmax`, `ymin <= ymax` invariant.
    #[inline]
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            rect: Rect::new(Coord { x: xmin, y: ymin }, Coord { x: xmax, y: ymax }),
        }
    }

    /// Creates the canonical empty rectangle, all edges at the origin.
    ///
    /// This is what [`Bounds::intersect`] returns for disjoint rectangles.
    #[inline]
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Creates a `Bounds` from a `[xmin, ymin, xmax, ymax]` array.
    #[inline]
    pub fn from_array(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }

    /// Returns the edges as a `[xmin, ymin, xmax, ymax]` array.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.left(), self.top(), self.right(), self.bottom()]
    }

    /// Returns the left edge (minimum x).
    #[inline]
    pub fn left(&self) -> f64 {
        self.rect.min().x
    }

    /// Returns the top edge (minimum y).
    #[inline]
    pub fn top(&self) -> f64 {
        self.rect.min().y
    }

    /// Returns the right edge (maximum x).
    #[inline]
    pub fn right(&self) -> f64 {
        self.rect.max().x
    }

    /// Returns the bottom edge (maximum y).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.rect.max().y
    }

    /// Returns the width of the rectangle (`right - left`).
    ///
    /// Unlike quadrilateral boxes elsewhere, no minimum width is enforced:
    /// degenerate rectangles report a width of `0`.
    #[inline]
    pub fn width(&self) -> f64 {
        self.rect.width()
    }

    /// Returns the height of the rectangle (`bottom - top`).
    #[inline]
    pub fn height(&self) -> f64 {
        self.rect.height()
    }

    /// Returns the area of the rectangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.rect.unsigned_area()
    }

    /// Returns `true` when the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area() <= 0.0
    }

    /// Returns the center x coordinate.
    #[inline]
    pub fn center_x(&self) -> f64 {
        (self.left() + self.right()) / 2.0
    }

    /// Returns the center y coordinate.
    #[inline]
    pub fn center_y(&self) -> f64 {
        (self.top() + self.bottom()) / 2.0
    }

    /// Returns the vertical extent as a `(top, bottom)` interval.
    #[inline]
    pub fn y_interval(&self) -> (f64, f64) {
        (self.top(), self.bottom())
    }

    /// Returns the horizontal extent as a `(left, right)` interval.
    #[inline]
    pub fn x_interval(&self) -> (f64, f64) {
        (self.left(), self.right())
    }

    /// Computes the overlapping region of two rectangles.
    ///
    /// # Returns
    ///
    /// The clamped intersection, or [`Bounds::zero`] when the rectangles are
    /// disjoint. Rectangles that only touch along an edge produce a
    /// zero-area intersection.
    pub fn intersect(&self, other: &Bounds) -> Bounds {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left > right || top > bottom {
            return Bounds::zero();
        }

        Bounds::new(left, top, right, bottom)
    }

    /// Returns a copy with the horizontal extent replaced.
    #[inline]
    pub fn with_x_span(&self, left: f64, right: f64) -> Bounds {
        Bounds::new(left, self.top(), right, self.bottom())
    }

    /// Returns a copy with the vertical extent replaced.
    #[inline]
    pub fn with_y_span(&self, top: f64, bottom: f64) -> Bounds {
        Bounds::new(self.left(), top, self.right(), bottom)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<[f64; 4]> for Bounds {
    #[inline]
    fn from(values: [f64; 4]) -> Self {
        Self::from_array(values)
    }
}

impl From<Bounds> for [f64; 4] {
    #[inline]
    fn from(bounds: Bounds) -> Self {
        bounds.to_array()
    }
}

impl Serialize for Bounds {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_array().serialize(serializer)
    }
}

/// Deserializes `Bounds` from a `[xmin, ymin, xmax, ymax]` array.
///
/// # Errors
///
/// Returns an error if the input does not contain exactly 4 numbers or if
/// any of them is not finite.
impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values: Vec<f64> = Vec::deserialize(deserializer)?;
        if values.len() != 4 {
            return Err(serde::de::Error::custom(format!(
                "Expected 4 coordinates, got {}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(serde::de::Error::custom("Coordinates must be finite"));
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }
}
