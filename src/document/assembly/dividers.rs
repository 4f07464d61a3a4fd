//! Row gap filling and histogram-derived partitions.

use tracing::debug;

use crate::document::bounds::Bounds;
use crate::document::error::AssemblyError;
use crate::document::partitions::Partitions;
use crate::document::structure_box::{StructureBox, StructureKind};
use crate::document::word::Word;
use crate::utils::box_utils::median;
use crate::utils::histogram::IntervalHistogram;

/// Median height of the words at least `smallest` tall.
pub fn estimate_text_height(words: &[Word], smallest: f64) -> Option<f64> {
    let heights: Vec<f64> = words
        .iter()
        .map(|word| word.bounds.height())
        .filter(|height| *height >= smallest && *height > 0.0)
        .collect();
    median(&heights)
}

/// Inserts a synthetic row into every vertical gap taller than
/// `text_height`.
///
/// `rows` must be sorted top to bottom and already span the table width.
/// Each inserted row keeps a margin of `leave_gap` times the gap height
/// from both neighbors. The gap between the table top and the first row
/// is only filled when `fill_top` is set.
///
/// Returns the number of rows inserted.
pub fn fill_gaps(
    rows: &mut Vec<StructureBox>,
    table: &Bounds,
    text_height: f64,
    leave_gap: f64,
    fill_top: bool,
) -> usize {
    if rows.is_empty() || text_height <= 0.0 {
        return 0;
    }

    let mut filled = Vec::with_capacity(rows.len());
    let mut inserted = 0;
    let mut previous_bottom = if fill_top { Some(table.top()) } else { None };

    for row in rows.drain(..) {
        if let Some(bottom) = previous_bottom {
            let gap = row.bounds.top() - bottom;
            if gap > text_height {
                let margin = gap * leave_gap;
                filled.push(StructureBox::synthetic(
                    StructureKind::Row,
                    Bounds::new(
                        table.left(),
                        bottom + margin,
                        table.right(),
                        row.bounds.top() - margin,
                    ),
                ));
                inserted += 1;
            }
        }
        previous_bottom = Some(
            previous_bottom.map_or(row.bounds.bottom(), |b| b.max(row.bounds.bottom())),
        );
        filled.push(row);
    }

    if inserted > 0 {
        debug!("Filled {} row gaps taller than {:.2}", inserted, text_height);
    }
    *rows = filled;
    inserted
}

/// Derives row and column dividers from word boxes alone.
///
/// Dividers sit at the midpoints of low-density stretches of the vertical
/// and horizontal word-coverage histograms.
pub fn histogram_partitions(
    table: &Bounds,
    words: &[Word],
    frequency_threshold: i64,
) -> Result<Partitions, AssemblyError> {
    let rows = IntervalHistogram::from_intervals(words.iter().map(|w| w.bounds.y_interval()));
    let cols = IntervalHistogram::from_intervals(words.iter().map(|w| w.bounds.x_interval()));

    let row_dividers = rows.low_frequency_midpoints(frequency_threshold);
    let col_dividers = cols.low_frequency_midpoints(frequency_threshold);
    debug!(
        "Histogram found {} row and {} column dividers",
        row_dividers.len(),
        col_dividers.len()
    );

    Partitions::with_table_edges(table, row_dividers, col_dividers)
}
