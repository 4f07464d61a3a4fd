//! Word-to-cell assignment.
//!
//! Two modes are supported. Box mode matches each word against the actual,
//! possibly overlapping, row and column boxes. Divider mode bisects the
//! word's centre into literal divider lists.

use std::ops::Range;

use tracing::debug;

use super::headers::RowRole;
use crate::document::bounds::Bounds;
use crate::document::grid::Grid;
use crate::document::outliers::{Outliers, CORNER_CLIP, LOWEST_IOB, LOW_IOB_TEXT, SKIPPED_TEXT};
use crate::document::partitions::Partitions;
use crate::document::word::Word;
use crate::utils::box_utils::{bisect_left, find_leftmost_gt, iob};
use crate::utils::config::AssemblyConfig;

/// Best candidate index and its overlap score.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Match {
    index: usize,
    score: f64,
}

fn keep_best(best: &mut Option<Match>, index: usize, score: f64) {
    if score > 0.0 && best.map_or(true, |m| score > m.score) {
        *best = Some(Match { index, score });
    }
}

/// Search keys over boxes sorted by centre along one axis.
///
/// Centre order does not keep edges sorted once one box encloses another,
/// so both keys are made monotone: `reach` is the running maximum of the
/// far edge and `floor` the running minimum of the near edge taken from
/// the end.
struct AxisIndex {
    reach: Vec<f64>,
    floor: Vec<f64>,
}

impl AxisIndex {
    fn new(boxes: &[Bounds], near: fn(&Bounds) -> f64, far: fn(&Bounds) -> f64) -> Self {
        let reach = boxes
            .iter()
            .scan(f64::NEG_INFINITY, |max, b| {
                *max = f64::max(*max, far(b));
                Some(*max)
            })
            .collect();
        let mut floor: Vec<f64> = boxes
            .iter()
            .rev()
            .scan(f64::INFINITY, |min, b| {
                *min = f64::min(*min, near(b));
                Some(*min)
            })
            .collect();
        floor.reverse();
        Self { reach, floor }
    }

    /// Indices of every box that may overlap `[start, end]`.
    fn candidates(&self, start: f64, end: f64) -> Range<usize> {
        let first = find_leftmost_gt(&self.reach, start, |&edge| edge);
        let last = first + self.floor[first..].partition_point(|&edge| edge < end);
        first..last
    }
}

/// Best-scoring row, split into the best header row and the best other row.
fn best_rows(
    word: &Bounds,
    rows: &[Bounds],
    index: &AxisIndex,
    roles: &[RowRole],
) -> (Option<Match>, Option<Match>) {
    let mut header = None;
    let mut body = None;

    for i in index.candidates(word.top(), word.bottom()) {
        let score = iob(word, &rows[i]);
        if roles.get(i) == Some(&RowRole::Header) {
            keep_best(&mut header, i, score);
        } else {
            keep_best(&mut body, i, score);
        }
    }
    (header, body)
}

fn best_column(word: &Bounds, columns: &[Bounds], index: &AxisIndex) -> Option<Match> {
    let mut best = None;
    for i in index.candidates(word.left(), word.right()) {
        keep_best(&mut best, i, iob(word, &columns[i]));
    }
    best
}

/// Fills a `rows x columns` grid by matching words against row and column
/// boxes.
///
/// `rows` must be sorted by centre y and `columns` by centre x. A word goes
/// to its best header row whenever that scores at least as high as its best
/// other row. Words whose overlap with the chosen cell falls below
/// `iob_reject_threshold` are skipped and their text recorded.
pub fn fill_by_boxes(
    rows: &[Bounds],
    columns: &[Bounds],
    roles: &[RowRole],
    words: &[Word],
    config: &AssemblyConfig,
    outliers: &mut Outliers,
) -> Grid {
    let mut grid = Grid::new(rows.len(), columns.len());
    let row_index = AxisIndex::new(rows, Bounds::top, Bounds::bottom);
    let column_index = AxisIndex::new(columns, Bounds::left, Bounds::right);

    for word in words {
        let bounds = &word.bounds;
        let (header, body) = best_rows(bounds, rows, &row_index, roles);
        let row = match (header, body) {
            (Some(h), Some(b)) if h.score >= b.score => Some(h),
            (_, Some(b)) => Some(b),
            (h, None) => h,
        };

        let (Some(row), Some(column)) = (row, best_column(bounds, columns, &column_index)) else {
            debug!("Skipping '{}': no overlapping row or column", word.text);
            outliers.push_text(SKIPPED_TEXT, word.text.clone());
            continue;
        };

        let cell = rows[row.index].intersect(&columns[column.index]);
        let score = iob(bounds, &cell);

        if score < config.iob_reject_threshold {
            debug!("Skipping '{}': cell overlap {:.3}", word.text, score);
            outliers.push_text(SKIPPED_TEXT, word.text.clone());
            continue;
        }
        if score < config.iob_warn_threshold {
            outliers.increment(LOW_IOB_TEXT);
            outliers.record_min(LOWEST_IOB, score);
        }
        if score < config.corner_clip_ratio * row.score * column.score {
            outliers.increment(CORNER_CLIP);
        }

        grid.append(row.index, column.index, &word.text);
    }

    grid
}

/// Fills a grid by bisecting word centres into the partition dividers.
///
/// Words whose centre lies outside the outer dividers are skipped and
/// their text recorded.
pub fn fill_by_dividers(partitions: &Partitions, words: &[Word], outliers: &mut Outliers) -> Grid {
    let row_dividers = partitions.row_dividers();
    let col_dividers = partitions.col_dividers();
    let mut grid = Grid::new(partitions.num_rows(), partitions.num_cols());

    for word in words {
        let (x, y) = (word.bounds.center_x(), word.bounds.center_y());
        let (Some(row), Some(col)) = (cell_index(row_dividers, y), cell_index(col_dividers, x))
        else {
            debug!("Skipping '{}': centre outside the table", word.text);
            outliers.push_text(SKIPPED_TEXT, word.text.clone());
            continue;
        };
        grid.append(row, col, &word.text);
    }

    grid
}

/// Interval index of `value` within `dividers`, `None` outside the outer
/// dividers. A value on a divider belongs to the interval above it.
fn cell_index(dividers: &[f64], value: f64) -> Option<usize> {
    let (first, last) = (dividers.first()?, dividers.last()?);
    if value < *first || value > *last || dividers.len() < 2 {
        return None;
    }
    let index = bisect_left(dividers, value).saturating_sub(1);
    Some(index.min(dividers.len() - 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Bounds> {
        vec![
            Bounds::new(0.0, 0.0, 100.0, 10.0),
            Bounds::new(0.0, 10.0, 100.0, 20.0),
        ]
    }

    fn columns() -> Vec<Bounds> {
        vec![
            Bounds::new(0.0, 0.0, 50.0, 20.0),
            Bounds::new(50.0, 0.0, 100.0, 20.0),
        ]
    }

    #[test]
    fn test_cell_index() {
        let dividers = [0.0, 10.0, 20.0, 30.0];
        assert_eq!(cell_index(&dividers, 0.0), Some(0));
        assert_eq!(cell_index(&dividers, 5.0), Some(0));
        assert_eq!(cell_index(&dividers, 10.0), Some(0));
        assert_eq!(cell_index(&dividers, 25.0), Some(2));
        assert_eq!(cell_index(&dividers, 30.0), Some(2));
        assert_eq!(cell_index(&dividers, 31.0), None);
    }

    #[test]
    fn test_fill_by_boxes_joins_in_stream_order() {
        let words = vec![
            Word::from_tuple(5.0, 12.0, 20.0, 18.0, "second"),
            Word::from_tuple(22.0, 12.0, 40.0, 18.0, "line"),
            Word::from_tuple(60.0, 1.0, 90.0, 9.0, "top"),
        ];
        let roles = vec![RowRole::Body, RowRole::Body];
        let mut outliers = Outliers::new();
        let grid = fill_by_boxes(
            &rows(),
            &columns(),
            &roles,
            &words,
            &AssemblyConfig::default(),
            &mut outliers,
        );

        assert_eq!(grid.shape(), (2, 2));
        assert_eq!(grid.get(1, 0), Some("second line"));
        assert_eq!(grid.get(0, 1), Some("top"));
        assert!(outliers.is_empty());
    }

    #[test]
    fn test_fill_by_boxes_header_wins_ties() {
        // Straddles both rows evenly.
        let words = vec![Word::from_tuple(5.0, 5.0, 20.0, 15.0, "Name")];
        let roles = vec![RowRole::Body, RowRole::Header];
        let mut outliers = Outliers::new();
        let grid = fill_by_boxes(
            &rows(),
            &columns(),
            &roles,
            &words,
            &AssemblyConfig::default(),
            &mut outliers,
        );
        assert_eq!(grid.get(1, 0), Some("Name"));
        assert_eq!(outliers.count(LOW_IOB_TEXT), 0);
    }

    #[test]
    fn test_fill_by_boxes_finds_enclosing_boxes() {
        // The short boxes sort after the tall ones but end before the word.
        let rows = vec![
            Bounds::new(0.0, 0.0, 100.0, 100.0),
            Bounds::new(0.0, 55.0, 100.0, 60.0),
        ];
        let columns = vec![
            Bounds::new(0.0, 0.0, 100.0, 100.0),
            Bounds::new(55.0, 0.0, 60.0, 100.0),
        ];
        let words = vec![Word::from_tuple(70.0, 70.0, 80.0, 80.0, "inside")];
        let roles = vec![RowRole::Body, RowRole::Body];
        let mut outliers = Outliers::new();
        let grid = fill_by_boxes(
            &rows,
            &columns,
            &roles,
            &words,
            &AssemblyConfig::default(),
            &mut outliers,
        );

        assert_eq!(grid.get(0, 0), Some("inside"));
        assert!(outliers.texts(SKIPPED_TEXT).is_empty());
    }

    #[test]
    fn test_axis_index_candidates() {
        let rows = vec![
            Bounds::new(0.0, 0.0, 100.0, 100.0),
            Bounds::new(0.0, 55.0, 100.0, 60.0),
            Bounds::new(0.0, 100.0, 100.0, 110.0),
        ];
        let index = AxisIndex::new(&rows, Bounds::top, Bounds::bottom);
        assert_eq!(index.candidates(70.0, 80.0), 0..2);
        assert_eq!(index.candidates(102.0, 108.0), 2..3);
        assert_eq!(index.candidates(120.0, 130.0), 3..3);
    }

    #[test]
    fn test_fill_by_boxes_skips_outside_words() {
        let words = vec![Word::from_tuple(5.0, 50.0, 20.0, 60.0, "stray")];
        let roles = vec![RowRole::Body, RowRole::Body];
        let mut outliers = Outliers::new();
        let grid = fill_by_boxes(
            &rows(),
            &columns(),
            &roles,
            &words,
            &AssemblyConfig::default(),
            &mut outliers,
        );
        assert_eq!(grid.filled_cells(), 0);
        assert_eq!(outliers.texts(SKIPPED_TEXT), ["stray"]);
    }

    #[test]
    fn test_fill_by_boxes_records_low_overlap() {
        // Only a third of the word lies inside the table.
        let words = vec![Word::from_tuple(10.0, 15.0, 20.0, 30.0, "cut")];
        let roles = vec![RowRole::Body, RowRole::Body];
        let mut outliers = Outliers::new();
        let grid = fill_by_boxes(
            &rows(),
            &columns(),
            &roles,
            &words,
            &AssemblyConfig::default(),
            &mut outliers,
        );
        assert_eq!(grid.get(1, 0), Some("cut"));
        assert_eq!(outliers.count(LOW_IOB_TEXT), 1);
    }

    #[test]
    fn test_fill_by_dividers() {
        let partitions = Partitions::new(vec![0.0, 10.0, 20.0, 30.0], vec![0.0, 50.0, 100.0]).unwrap();
        let words = vec![
            Word::from_tuple(0.0, 0.0, 10.0, 10.0, "A"),
            Word::from_tuple(60.0, 5.0, 90.0, 9.0, "B"),
            Word::from_tuple(200.0, 5.0, 210.0, 9.0, "C"),
        ];
        let mut outliers = Outliers::new();
        let grid = fill_by_dividers(&partitions, &words, &mut outliers);
        assert_eq!(grid.get(0, 0), Some("A"));
        assert_eq!(grid.get(0, 1), Some("B"));
        assert_eq!(grid.filled_cells(), 2);
        assert_eq!(outliers.texts(SKIPPED_TEXT), ["C"]);
    }
}
