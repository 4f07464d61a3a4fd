//! Row recovery for tables whose predicted rows cannot be trusted.
//!
//! When the detector clearly over- or under-segments a long table, rows are
//! re-derived from the words themselves: tiles of one text-line height are
//! laid over the body, words are bucketed into them, bucket centres are
//! consolidated and the final rows are drawn around those centres.

use tracing::{debug, warn};

use super::dividers::estimate_text_height;
use crate::document::bounds::Bounds;
use crate::document::outliers::{Outliers, OutlierValue, EXCESSIVE_ROWS};
use crate::document::structure_box::{StructureBox, StructureKind};
use crate::document::word::Word;
use crate::utils::box_utils::median;
use crate::utils::config::AssemblyConfig;

/// Rebuilds body rows from word positions between `start_y` and the table
/// bottom.
///
/// Returns `None` when no usable text height can be estimated, in which
/// case the caller keeps the predicted rows. A row estimate above
/// `large_table_maximum_rows` is clamped and recorded under
/// `excessive rows`.
pub fn recover_rows(
    table: &Bounds,
    start_y: f64,
    words: &[Word],
    config: &AssemblyConfig,
    outliers: &mut Outliers,
) -> Option<Vec<StructureBox>> {
    let mut text_height = estimate_text_height(words, config.smallest_supported_text_height)?;
    let span = table.bottom() - start_y;
    if span <= 0.0 {
        return None;
    }

    let mut tiles = (span / text_height).ceil().max(1.0) as usize;
    if tiles > config.large_table_maximum_rows {
        warn!(
            "Estimated {} rows exceeds the maximum of {}, clamping row height",
            tiles, config.large_table_maximum_rows
        );
        outliers.record(EXCESSIVE_ROWS, OutlierValue::Count(tiles));
        tiles = config.large_table_maximum_rows.max(1);
        text_height = span / tiles as f64;
    }

    let centers = bucket_centers(words, start_y, table.bottom(), text_height, tiles);
    let centers = merge_centers(centers, config.large_table_merge_fraction * text_height);
    debug!(
        "Recovered {} row centres from {} tiles of height {:.2}",
        centers.len(),
        tiles,
        text_height
    );

    let rows = if centers.is_empty() {
        tile_rows(table, start_y, text_height, tiles)
    } else {
        let spacing = center_spacing(&centers).unwrap_or(text_height);
        rows_around_centers(table, start_y, &centers, spacing)
    };
    Some(rows)
}

/// Mean word centre of every non-empty tile, with its word count.
fn bucket_centers(
    words: &[Word],
    start_y: f64,
    end_y: f64,
    height: f64,
    tiles: usize,
) -> Vec<(f64, usize)> {
    let mut sums = vec![0.0; tiles];
    let mut counts = vec![0usize; tiles];

    for word in words {
        let y = word.bounds.center_y();
        if y < start_y || y > end_y {
            continue;
        }
        let index = (((y - start_y) / height).floor() as usize).min(tiles - 1);
        sums[index] += y;
        counts[index] += 1;
    }

    sums.into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(sum, count)| (sum / count as f64, count))
        .collect()
}

/// Merges neighbouring centres closer than `min_distance`, repeating the
/// left-to-right pass until nothing changes.
fn merge_centers(mut centers: Vec<(f64, usize)>, min_distance: f64) -> Vec<f64> {
    loop {
        let mut merged: Vec<(f64, usize)> = Vec::with_capacity(centers.len());
        for (center, count) in centers.iter().copied() {
            match merged.last_mut() {
                Some((last, last_count)) if center - *last < min_distance => {
                    let total = *last_count + count;
                    *last = (*last * *last_count as f64 + center * count as f64) / total as f64;
                    *last_count = total;
                }
                _ => merged.push((center, count)),
            }
        }

        let changed = merged.len() != centers.len();
        centers = merged;
        if !changed {
            break;
        }
    }
    centers.into_iter().map(|(center, _)| center).collect()
}

fn center_spacing(centers: &[f64]) -> Option<f64> {
    let gaps: Vec<f64> = centers.windows(2).map(|pair| pair[1] - pair[0]).collect();
    median(&gaps)
}

/// Rows bounded by the midpoints between consecutive centres. The outer
/// edges sit half a row height from the first and last centres.
fn rows_around_centers(
    table: &Bounds,
    start_y: f64,
    centers: &[f64],
    height: f64,
) -> Vec<StructureBox> {
    let last = centers.len() - 1;
    centers
        .iter()
        .enumerate()
        .map(|(i, center)| {
            let top = if i == 0 {
                (center - height / 2.0).max(start_y)
            } else {
                (centers[i - 1] + center) / 2.0
            };
            let bottom = if i == last {
                (center + height / 2.0).min(table.bottom())
            } else {
                (center + centers[i + 1]) / 2.0
            };
            StructureBox::synthetic(
                StructureKind::Row,
                Bounds::new(table.left(), top, table.right(), bottom),
            )
        })
        .collect()
}

fn tile_rows(table: &Bounds, start_y: f64, height: f64, tiles: usize) -> Vec<StructureBox> {
    (0..tiles)
        .map(|i| {
            let top = start_y + i as f64 * height;
            let bottom = (top + height).min(table.bottom());
            StructureBox::synthetic(
                StructureKind::Row,
                Bounds::new(table.left(), top, table.right(), bottom),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_centers_iterates() {
        let centers = vec![(0.0, 1), (1.0, 1), (1.5, 2), (10.0, 1)];
        let merged = merge_centers(centers, 2.0);
        assert_eq!(merged.len(), 2);
        assert!((merged[0] - 1.0).abs() < 1e-6);
        assert!((merged[1] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_recover_rows_from_lines() {
        let table = Bounds::new(0.0, 0.0, 100.0, 50.0);
        let words: Vec<Word> = (0..5)
            .map(|i| {
                let top = i as f64 * 10.0 + 2.0;
                Word::from_tuple(5.0, top, 40.0, top + 6.0, format!("w{i}"))
            })
            .collect();
        let mut outliers = Outliers::new();
        let rows =
            recover_rows(&table, 0.0, &words, &AssemblyConfig::default(), &mut outliers).unwrap();

        assert_eq!(rows.len(), 5);
        assert!((rows[0].bounds.top() - 0.0).abs() < 1e-6);
        assert!((rows[1].bounds.top() - 10.0).abs() < 1e-6);
        assert!((rows[4].bounds.bottom() - 50.0).abs() < 1e-6);
        assert!(!outliers.contains(EXCESSIVE_ROWS));
    }

    #[test]
    fn test_recover_rows_clamps_row_count() {
        let table = Bounds::new(0.0, 0.0, 10.0, 100.0);
        let words: Vec<Word> = (0..100)
            .map(|i| Word::from_tuple(0.0, i as f64, 5.0, i as f64 + 1.0, "x"))
            .collect();
        let config = AssemblyConfig {
            large_table_maximum_rows: 20,
            ..AssemblyConfig::default()
        };
        let mut outliers = Outliers::new();
        let rows = recover_rows(&table, 0.0, &words, &config, &mut outliers).unwrap();

        assert!(rows.len() <= 20);
        assert_eq!(outliers.get(EXCESSIVE_ROWS), Some(&OutlierValue::Count(100)));
    }

    #[test]
    fn test_recover_rows_with_zero_maximum_keeps_one_row() {
        let table = Bounds::new(0.0, 0.0, 10.0, 100.0);
        let words = vec![Word::from_tuple(0.0, 5.0, 5.0, 8.0, "x")];
        let config = AssemblyConfig {
            large_table_maximum_rows: 0,
            ..AssemblyConfig::default()
        };
        let mut outliers = Outliers::new();
        let rows = recover_rows(&table, 0.0, &words, &config, &mut outliers).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(outliers.get(EXCESSIVE_ROWS), Some(&OutlierValue::Count(34)));
    }

    #[test]
    fn test_recover_rows_without_words() {
        let table = Bounds::new(0.0, 0.0, 10.0, 100.0);
        let mut outliers = Outliers::new();
        let rows = recover_rows(&table, 0.0, &[], &AssemblyConfig::default(), &mut outliers);
        assert!(rows.is_none());
    }
}
