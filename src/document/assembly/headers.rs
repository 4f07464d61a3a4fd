//! Header and projected-row classification, spanning-cell resolution and
//! column label extraction.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::bounds::Bounds;
use crate::document::grid::Grid;
use crate::document::merger::{CellMerger, MergeKind, SpanCategory};
use crate::document::outliers::{Outliers, UNCLASSIFIED_SPANNING_CELLS};
use crate::document::structure_box::{StructureBox, StructureKind};
use crate::document::table::ColumnLabels;
use crate::utils::box_utils::{interval_ioa, symmetric_interval_ioa};
use crate::utils::config::AssemblyConfig;

/// Separator placed between header rows collapsed into one label.
pub const HEADER_JOIN: &str = " \n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowRole {
    Header,
    Projected,
    Body,
}

/// Whether `row` lies in the header band `[table_top, top_header_y]`.
pub fn is_header_row(row: &Bounds, table_top: f64, top_header_y: f64, threshold: f64) -> bool {
    top_header_y > table_top && interval_ioa(row.y_interval(), (table_top, top_header_y)) > threshold
}

/// Classifies every row. Header wins over projected.
pub fn classify_rows(
    rows: &[Bounds],
    table_top: f64,
    top_header_y: f64,
    projected: &[Bounds],
    threshold: f64,
) -> Vec<RowRole> {
    rows.iter()
        .map(|row| {
            if is_header_row(row, table_top, top_header_y, threshold) {
                RowRole::Header
            } else if projected
                .iter()
                .any(|p| interval_ioa(row.y_interval(), p.y_interval()) > threshold)
            {
                RowRole::Projected
            } else {
                RowRole::Body
            }
        })
        .collect()
}

/// Inserts a full-width row for every header box no row covers.
///
/// Keeps `rows` sorted by centre y. Returns the number of rows added.
pub fn ensure_header_rows(
    rows: &mut Vec<StructureBox>,
    headers: &[StructureBox],
    table: &Bounds,
    threshold: f64,
) -> usize {
    let mut added = 0;
    for header in headers {
        let span = header.bounds.y_interval();
        let covered = rows
            .iter()
            .any(|row| interval_ioa(row.bounds.y_interval(), span) > threshold);
        if covered {
            continue;
        }

        let bounds = header.bounds.with_x_span(table.left(), table.right());
        let at = rows.partition_point(|row| row.bounds.center_y() <= bounds.center_y());
        rows.insert(at, StructureBox::synthetic(StructureKind::Row, bounds));
        added += 1;
    }
    if added > 0 {
        debug!("Inserted {} synthetic header rows", added);
    }
    added
}

/// Merge instructions derived from spanning cells, in application order.
#[derive(Debug, Clone, Default)]
pub struct SpanningResolution {
    pub mergers: Vec<CellMerger>,
    /// Right edge of the row-header band, when any left header was found.
    pub left_header_x: Option<f64>,
}

/// Turns spanning-cell predictions into cell merges.
///
/// Left-hierarchical merges come first, ordered by their top row, then
/// top-hierarchical merges, then monosemantic ones. Later merges may read
/// cells written by earlier ones.
pub fn resolve_spanning(
    spans: &[StructureBox],
    rows: &[Bounds],
    columns: &[Bounds],
    roles: &[RowRole],
    config: &AssemblyConfig,
    outliers: &mut Outliers,
) -> SpanningResolution {
    let threshold = config.spanning_overlap_threshold;
    let mut left = Vec::new();
    let mut top = Vec::new();
    let mut mono = Vec::new();
    let mut left_header_x: Option<f64> = None;

    for span in spans {
        let covered_rows: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| interval_ioa(row.y_interval(), span.bounds.y_interval()) > threshold)
            .map(|(i, _)| i)
            .collect();
        let covered_cols: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, col)| {
                symmetric_interval_ioa(col.x_interval(), span.bounds.x_interval()) > threshold
            })
            .map(|(i, _)| i)
            .collect();

        let (Some(&row_min), Some(&row_max)) = (covered_rows.first(), covered_rows.last()) else {
            outliers.increment(UNCLASSIFIED_SPANNING_CELLS);
            continue;
        };
        let (Some(&col_min), Some(&col_max)) = (covered_cols.first(), covered_cols.last()) else {
            outliers.increment(UNCLASSIFIED_SPANNING_CELLS);
            continue;
        };

        let header_rows = covered_rows
            .iter()
            .filter(|&&r| roles.get(r) == Some(&RowRole::Header))
            .count();

        let category = if header_rows == covered_rows.len() {
            if covered_rows.len() == 1 && covered_cols.len() >= 2 {
                Some(SpanCategory::TopHierarchical)
            } else if covered_cols.len() == 1 {
                Some(SpanCategory::TopMonosemantic)
            } else {
                None
            }
        } else if header_rows == 0 && covered_cols.len() == 1 && covered_rows.len() >= 2 {
            Some(SpanCategory::LeftHierarchical)
        } else {
            None
        };

        match category {
            Some(SpanCategory::TopHierarchical) => top.push(CellMerger::new(
                (row_min, row_max),
                (col_min, Some(col_max)),
                MergeKind::top_hierarchical(),
            )),
            Some(SpanCategory::TopMonosemantic) => mono.push(CellMerger::new(
                (row_min, row_max),
                (col_min, None),
                MergeKind::top_monosemantic(),
            )),
            Some(SpanCategory::LeftHierarchical) => {
                left_header_x = Some(
                    left_header_x.map_or(span.bounds.right(), |x| x.max(span.bounds.right())),
                );
                left.push(CellMerger::new(
                    (row_min, row_max),
                    (col_min, None),
                    MergeKind::left_hierarchical(config.left_fill),
                ));
            }
            None => {
                debug!(
                    "Spanning cell over rows {}..={} and columns {}..={} left unclassified",
                    row_min, row_max, col_min, col_max
                );
                outliers.increment(UNCLASSIFIED_SPANNING_CELLS);
            }
        }
    }

    left.sort_by_key(CellMerger::top);
    let mut mergers = left;
    mergers.extend(top);
    mergers.extend(mono);

    SpanningResolution {
        mergers,
        left_header_x,
    }
}

/// Builds column labels from the given header rows of `grid`.
///
/// With `multi_header` every column gets one entry per header row, empty
/// cells included. Otherwise the non-empty header cells of each column are
/// joined with [`HEADER_JOIN`].
pub fn extract_column_labels(grid: &Grid, header_rows: &[usize], multi_header: bool) -> ColumnLabels {
    if header_rows.is_empty() {
        return ColumnLabels::default();
    }

    let cell = |row: usize, col: usize| grid.get(row, col).unwrap_or_default().to_string();

    if multi_header {
        let labels = (0..grid.cols())
            .map(|col| header_rows.iter().map(|&row| cell(row, col)).collect())
            .collect();
        ColumnLabels::Hierarchical(labels)
    } else {
        let labels = (0..grid.cols())
            .map(|col| {
                header_rows
                    .iter()
                    .filter_map(|&row| grid.get(row, col))
                    .collect::<Vec<_>>()
                    .join(HEADER_JOIN)
            })
            .collect();
        ColumnLabels::Flat(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row(top: f64, bottom: f64) -> Bounds {
        Bounds::new(0.0, top, 100.0, bottom)
    }

    fn full_col(left: f64, right: f64) -> Bounds {
        Bounds::new(left, 0.0, right, 40.0)
    }

    fn span(bounds: Bounds) -> StructureBox {
        StructureBox::new(0.9, StructureKind::SpanningCell, bounds)
    }

    #[test]
    fn test_classify_rows_header_first() {
        let rows = vec![full_row(0.0, 10.0), full_row(10.0, 20.0), full_row(20.0, 30.0)];
        let projected = vec![full_row(0.0, 10.0), full_row(20.0, 30.0)];
        let roles = classify_rows(&rows, 0.0, 10.0, &projected, 0.7);
        assert_eq!(roles, vec![RowRole::Header, RowRole::Body, RowRole::Projected]);
    }

    #[test]
    fn test_no_header_band_means_no_headers() {
        let rows = vec![full_row(0.0, 10.0)];
        let roles = classify_rows(&rows, 0.0, 0.0, &[], 0.7);
        assert_eq!(roles, vec![RowRole::Body]);
    }

    #[test]
    fn test_ensure_header_rows_inserts_missing() {
        let table = Bounds::new(0.0, 0.0, 100.0, 40.0);
        let mut rows = vec![
            StructureBox::new(0.9, StructureKind::Row, full_row(12.0, 20.0)),
        ];
        let headers = vec![StructureBox::new(
            0.9,
            StructureKind::ColumnHeader,
            Bounds::new(10.0, 0.0, 90.0, 10.0),
        )];
        assert_eq!(ensure_header_rows(&mut rows, &headers, &table, 0.7), 1);
        assert_eq!(rows[0].bounds, full_row(0.0, 10.0));
        assert_eq!(ensure_header_rows(&mut rows, &headers, &table, 0.7), 0);
    }

    #[test]
    fn test_resolve_spanning_categories_and_order() {
        let rows = vec![
            full_row(0.0, 10.0),
            full_row(10.0, 20.0),
            full_row(20.0, 30.0),
            full_row(30.0, 40.0),
        ];
        let cols = vec![full_col(0.0, 30.0), full_col(30.0, 60.0), full_col(60.0, 100.0)];
        let roles = vec![RowRole::Header, RowRole::Body, RowRole::Body, RowRole::Body];
        let spans = vec![
            span(Bounds::new(30.0, 0.0, 100.0, 10.0)),
            span(Bounds::new(0.0, 10.0, 30.0, 40.0)),
            span(Bounds::new(0.0, 5.0, 100.0, 35.0)),
        ];
        let mut outliers = Outliers::new();
        let resolution = resolve_spanning(
            &spans,
            &rows,
            &cols,
            &roles,
            &AssemblyConfig::default(),
            &mut outliers,
        );

        assert_eq!(resolution.mergers.len(), 2);
        assert_eq!(
            resolution.mergers[0].kind.category(),
            SpanCategory::LeftHierarchical
        );
        assert_eq!(
            resolution.mergers[1].kind.category(),
            SpanCategory::TopHierarchical
        );
        assert_eq!(resolution.left_header_x, Some(30.0));
        assert_eq!(outliers.count(UNCLASSIFIED_SPANNING_CELLS), 1);
    }

    #[test]
    fn test_resolve_spanning_monosemantic_header() {
        let rows = vec![full_row(0.0, 10.0), full_row(10.0, 20.0), full_row(20.0, 30.0)];
        let cols = vec![full_col(0.0, 50.0), full_col(50.0, 100.0)];
        let roles = vec![RowRole::Header, RowRole::Header, RowRole::Body];
        let spans = vec![span(Bounds::new(0.0, 0.0, 50.0, 20.0))];
        let mut outliers = Outliers::new();
        let resolution = resolve_spanning(
            &spans,
            &rows,
            &cols,
            &roles,
            &AssemblyConfig::default(),
            &mut outliers,
        );

        assert_eq!(resolution.mergers.len(), 1);
        let merger = &resolution.mergers[0];
        assert_eq!(merger.kind.category(), SpanCategory::TopMonosemantic);
        assert_eq!((merger.row_min, merger.row_max), (0, 1));
        assert_eq!((merger.col_min, merger.col_max), (0, None));
        assert_eq!(resolution.left_header_x, None);
        assert!(outliers.is_empty());
    }

    #[test]
    fn test_extract_column_labels_joins_header_rows() {
        let grid = Grid::from_rows(vec![
            vec![Some("Revenue".to_string()), None],
            vec![Some("USD".to_string()), Some("Year".to_string())],
            vec![Some("10".to_string()), Some("2020".to_string())],
        ]);
        let labels = extract_column_labels(&grid, &[0, 1], false);
        assert_eq!(
            labels,
            ColumnLabels::Flat(vec!["Revenue \nUSD".to_string(), "Year".to_string()])
        );

        let labels = extract_column_labels(&grid, &[0, 1], true);
        assert_eq!(
            labels,
            ColumnLabels::Hierarchical(vec![
                vec!["Revenue".to_string(), "USD".to_string()],
                vec![String::new(), "Year".to_string()],
            ])
        );
    }
}
