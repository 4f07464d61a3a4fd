//! Utility functions for bounding box operations.

use std::cmp::Ordering;

use crate::document::bounds::Bounds;
use crate::document::structure_box::StructureBox;
use crate::document::word::Word;

/// Types that carry a [`Bounds`].
pub trait HasBounds {
    fn get_bounds(&self) -> &Bounds;
}

impl HasBounds for Bounds {
    fn get_bounds(&self) -> &Bounds {
        self
    }
}

impl HasBounds for StructureBox {
    fn get_bounds(&self) -> &Bounds {
        &self.bounds
    }
}

impl HasBounds for Word {
    fn get_bounds(&self) -> &Bounds {
        &self.bounds
    }
}

/// Calculates the fraction of `a` covered by its intersection with `b`.
///
/// This is the "intersection over box" measure: unlike IoU it is
/// asymmetric, and answers how much of the first box lies inside the second.
///
/// # Arguments
///
/// * `a` - The reference box
/// * `b` - The box it is compared against
///
/// # Returns
///
/// A value between 0.0 and 1.0. Returns 0.0 if `a` has zero area.
#[inline]
#[must_use]
pub fn iob(a: &Bounds, b: &Bounds) -> f64 {
    let area = a.area();
    if area <= 0.0 {
        return 0.0;
    }
    a.intersect(b).area() / area
}

/// Calculates the intersection area over the smaller of the two box areas.
///
/// A box fully contained in another scores 1.0 regardless of which argument
/// it is passed as.
///
/// # Returns
///
/// A value between 0.0 and 1.0. Returns 0.0 if either box has zero area.
#[inline]
#[must_use]
pub fn symmetric_iob(a: &Bounds, b: &Bounds) -> f64 {
    let smaller = a.area().min(b.area());
    if smaller <= 0.0 {
        return 0.0;
    }
    a.intersect(b).area() / smaller
}

/// Row variant of [`iob`]: the x axis is treated as infinite, so only the
/// vertical extents are compared.
#[inline]
#[must_use]
pub fn iob_for_rows(a: &Bounds, b: &Bounds) -> f64 {
    interval_ioa(a.y_interval(), b.y_interval())
}

/// Column variant of [`iob`]: only the horizontal extents are compared.
#[inline]
#[must_use]
pub fn iob_for_columns(a: &Bounds, b: &Bounds) -> f64 {
    interval_ioa(a.x_interval(), b.x_interval())
}

/// Column variant of [`symmetric_iob`]: horizontal overlap over the
/// narrower of the two extents.
#[inline]
#[must_use]
pub fn symmetric_iob_for_columns(a: &Bounds, b: &Bounds) -> f64 {
    symmetric_interval_ioa(a.x_interval(), b.x_interval())
}

/// Calculates the fraction of the 1-D interval `a` covered by `b`.
///
/// # Arguments
///
/// * `a` - The reference interval as `(start, end)`
/// * `b` - The covering interval as `(start, end)`
///
/// # Returns
///
/// - `0.0` if the intervals are disjoint
/// - for a single-point `a`: `1.0` if the point lies strictly inside `b`,
///   `0.0` otherwise
/// - otherwise the overlap length divided by the length of `a`
#[must_use]
pub fn interval_ioa(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (a_start, a_end) = a;
    let (b_start, b_end) = b;

    if a_end < b_start || b_end < a_start {
        return 0.0;
    }

    let length = a_end - a_start;
    if length <= 0.0 {
        return if b_start < a_start && a_start < b_end {
            1.0
        } else {
            0.0
        };
    }

    let overlap = a_end.min(b_end) - a_start.max(b_start);
    (overlap / length).max(0.0)
}

/// Interval overlap over the shorter of the two interval lengths.
#[must_use]
pub fn symmetric_interval_ioa(a: (f64, f64), b: (f64, f64)) -> f64 {
    if (a.1 - a.0) <= (b.1 - b.0) {
        interval_ioa(a, b)
    } else {
        interval_ioa(b, a)
    }
}

/// Applies Non-Maximum Suppression to boxes of one kind, in place.
///
/// The boxes must already be sorted by their spatial key (rows by center y,
/// columns by center x). Only adjacent pairs in that order are compared:
///
/// # Algorithm
///
/// 1. Compare `boxes[i - 1]` with `boxes[i]` using [`iob`] of the earlier box
/// 2. If the overlap exceeds `threshold`, drop whichever has the lower
///    confidence (ties drop the earlier box) and compare the newly adjacent
///    pair without advancing
/// 3. Otherwise advance to the next pair
///
/// Dropping the earlier box does not simply retry at the same index: the
/// cursor steps back one pair, so the box before the dropped one is
/// compared with the survivor. No adjacent pair is left above `threshold`,
/// and a second pass removes nothing.
///
/// Two non-adjacent boxes may therefore still overlap after suppression.
///
/// # Returns
///
/// The number of boxes removed.
pub fn non_maxima_suppression(boxes: &mut Vec<StructureBox>, threshold: f64) -> usize {
    let mut removed = 0;
    let mut i = 1;

    while i < boxes.len() {
        let prev = &boxes[i - 1];
        let cur = &boxes[i];

        if iob(&prev.bounds, &cur.bounds) > threshold {
            if prev.confidence > cur.confidence {
                boxes.remove(i);
            } else {
                boxes.remove(i - 1);
                // The box before the removed one has a new neighbour.
                i = (i - 1).max(1);
            }
            removed += 1;
        } else {
            i += 1;
        }
    }

    removed
}

/// Finds the first index whose key is strictly greater than `value`.
///
/// `items` must be sorted by `key` for the result to be exact; with a merely
/// approximately sorted slice the returned index is a starting point for a
/// forward scan.
#[must_use]
pub fn find_leftmost_gt<T, F>(items: &[T], value: f64, key: F) -> usize
where
    F: Fn(&T) -> f64,
{
    items.partition_point(|item| key(item) <= value)
}

/// Returns the index of the first divider not less than `value`, like
/// Python's `bisect_left`.
#[must_use]
pub fn bisect_left(dividers: &[f64], value: f64) -> usize {
    dividers.partition_point(|&divider| divider < value)
}

/// Sorts boxes by their vertical center, top to bottom.
pub fn sort_by_center_y<T: HasBounds>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.get_bounds()
            .center_y()
            .total_cmp(&b.get_bounds().center_y())
    });
}

/// Sorts boxes by their horizontal center, left to right.
pub fn sort_by_center_x<T: HasBounds>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.get_bounds()
            .center_x()
            .total_cmp(&b.get_bounds().center_x())
    });
}

/// Calculates the median of a list of values.
///
/// Even-length inputs return the mean of the two middle values.
///
/// # Returns
///
/// `None` if `values` is empty.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
