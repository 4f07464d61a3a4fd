//! Stepwise interval-coverage histogram.
//!
//! [`IntervalHistogram`] counts how many appended intervals cover each point
//! of an axis. It is used to derive row and column dividers from word boxes
//! alone, by looking for low-density gaps between them.

/// A sorted list of `(position, frequency)` change-points.
///
/// The frequency between two consecutive change-points is constant and
/// equal to the left point's value. Before the first point the frequency is
/// `0`. Intervals are half-open: `[start, end)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalHistogram {
    points: Vec<(f64, i64)>,
}

impl IntervalHistogram {
    /// Creates an empty histogram.
    #[must_use]
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Builds a histogram from a sequence of intervals.
    pub fn from_intervals<I>(intervals: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut histogram = Self::new();
        for (start, end) in intervals {
            histogram.append(start, end);
        }
        histogram
    }

    /// Returns the change-points in ascending position order.
    #[must_use]
    pub fn points(&self) -> &[(f64, i64)] {
        &self.points
    }

    /// Returns `true` if no interval has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Adds one to the frequency over `[start, end)`.
    ///
    /// Empty or inverted intervals are ignored.
    pub fn append(&mut self, start: f64, end: f64) {
        if !(start < end) {
            return;
        }

        let first = self.ensure_point(start);
        let last = self.ensure_point(end);
        for point in &mut self.points[first..last] {
            point.1 += 1;
        }
    }

    /// Returns the number of intervals covering `position`.
    #[must_use]
    pub fn frequency(&self, position: f64) -> i64 {
        let index = self.points.partition_point(|(p, _)| *p <= position);
        if index == 0 {
            0
        } else {
            self.points[index - 1].1
        }
    }

    /// Finds divider positions in low-density regions.
    ///
    /// Scans the change-points once from left to right and collects every
    /// maximal run of steps whose frequency is at most `threshold` and that
    /// is bordered on both sides by a step above the threshold. Each run
    /// contributes its midpoint. The open regions before the first and after
    /// the last change-point are never reported; they lie outside all
    /// intervals.
    #[must_use]
    pub fn low_frequency_midpoints(&self, threshold: i64) -> Vec<f64> {
        let mut midpoints = Vec::new();
        let mut run_start: Option<f64> = None;
        let mut seen_dense = false;

        let steps = self.points.len().saturating_sub(1);
        for &(position, frequency) in &self.points[..steps] {
            if frequency <= threshold {
                if seen_dense && run_start.is_none() {
                    run_start = Some(position);
                }
            } else {
                if let Some(start) = run_start.take() {
                    midpoints.push((start + position) / 2.0);
                }
                seen_dense = true;
            }
        }

        midpoints
    }

    /// Inserts a change-point at `position` if missing, carrying over the
    /// frequency that was in effect there, and returns its index.
    fn ensure_point(&mut self, position: f64) -> usize {
        let index = self.points.partition_point(|(p, _)| *p < position);
        if index < self.points.len() && self.points[index].0 == position {
            return index;
        }

        let carried = if index == 0 {
            0
        } else {
            self.points[index - 1].1
        };
        self.points.insert(index, (position, carried));
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_of_overlapping_intervals() {
        let histogram = IntervalHistogram::from_intervals([(1.0, 5.0), (3.0, 7.0)]);
        assert_eq!(histogram.frequency(0.0), 0);
        assert_eq!(histogram.frequency(2.0), 1);
        assert_eq!(histogram.frequency(4.0), 2);
        assert_eq!(histogram.frequency(6.0), 1);
        assert_eq!(histogram.frequency(8.0), 0);
    }

    #[test]
    fn test_half_open_boundaries() {
        let histogram = IntervalHistogram::from_intervals([(1.0, 5.0)]);
        assert_eq!(histogram.frequency(1.0), 1);
        assert_eq!(histogram.frequency(5.0), 0);
    }

    #[test]
    fn test_change_points() {
        let histogram = IntervalHistogram::from_intervals([(1.0, 5.0), (3.0, 7.0)]);
        assert_eq!(
            histogram.points(),
            &[(1.0, 1), (3.0, 2), (5.0, 1), (7.0, 0)]
        );
    }

    #[test]
    fn test_ignores_empty_interval() {
        let mut histogram = IntervalHistogram::new();
        histogram.append(3.0, 3.0);
        histogram.append(5.0, 2.0);
        assert!(histogram.is_empty());
    }

    #[test]
    fn test_low_frequency_midpoints_between_clusters() {
        let histogram =
            IntervalHistogram::from_intervals([(0.0, 10.0), (2.0, 8.0), (20.0, 30.0), (40.0, 50.0)]);
        assert_eq!(histogram.low_frequency_midpoints(0), vec![15.0, 35.0]);
    }

    #[test]
    fn test_low_frequency_midpoints_with_threshold() {
        // Density drops to 1 between 10 and 20, bordered by density 2.
        let histogram = IntervalHistogram::from_intervals([
            (0.0, 10.0),
            (0.0, 30.0),
            (20.0, 30.0),
        ]);
        assert_eq!(histogram.low_frequency_midpoints(0), Vec::<f64>::new());
        assert_eq!(histogram.low_frequency_midpoints(1), vec![15.0]);
    }
}
