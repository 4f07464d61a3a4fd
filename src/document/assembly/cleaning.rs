//! Prediction decoding, suppression and the overlap gate.

use tracing::{debug, warn};

use crate::document::bounds::Bounds;
use crate::document::error::AssemblyError;
use crate::document::outliers::{
    Outliers, OutlierValue, HIGH_OVERLAP, NMS_REMOVED_COLUMNS, NMS_REMOVED_ROWS, UNKNOWN_LABELS,
};
use crate::document::structure_box::{Prediction, StructureBox, StructureKind};
use crate::utils::box_utils::{self, sort_by_center_x, sort_by_center_y};
use crate::utils::config::{AssemblyConfig, ConfidenceThresholds};

/// Structure boxes grouped by kind, sorted and deduplicated.
#[derive(Debug, Clone, Default)]
pub struct CleanedStructure {
    pub rows: Vec<StructureBox>,
    pub columns: Vec<StructureBox>,
    pub headers: Vec<StructureBox>,
    pub projected: Vec<StructureBox>,
    pub spanning: Vec<StructureBox>,
    pub rows_removed: usize,
    pub columns_removed: usize,
}

/// Decodes raw predictions and drops those under their kind's threshold.
///
/// Unknown label ids are counted under `unknown labels`.
pub fn decode_predictions(
    predictions: &[Prediction],
    thresholds: &ConfidenceThresholds,
    outliers: &mut Outliers,
) -> Vec<StructureBox> {
    let mut boxes = Vec::with_capacity(predictions.len());
    for prediction in predictions {
        let Some(structure) = StructureBox::from_prediction(prediction) else {
            debug!("Dropping prediction with unknown label {}", prediction.label);
            outliers.increment(UNKNOWN_LABELS);
            continue;
        };
        if structure.confidence >= thresholds.for_kind(structure.kind) {
            boxes.push(structure);
        }
    }
    boxes
}

impl CleanedStructure {
    /// Groups boxes by kind and sorts each group along its spatial key.
    pub fn split(boxes: Vec<StructureBox>) -> Self {
        let mut structure = Self::default();
        for structure_box in boxes {
            match structure_box.kind {
                StructureKind::Row => structure.rows.push(structure_box),
                StructureKind::Column => structure.columns.push(structure_box),
                StructureKind::ColumnHeader => structure.headers.push(structure_box),
                StructureKind::ProjectedRow => structure.projected.push(structure_box),
                StructureKind::SpanningCell => structure.spanning.push(structure_box),
                StructureKind::Table | StructureKind::NoObject => {}
            }
        }

        sort_by_center_y(&mut structure.rows);
        sort_by_center_x(&mut structure.columns);
        sort_by_center_y(&mut structure.headers);
        sort_by_center_y(&mut structure.projected);
        sort_by_center_y(&mut structure.spanning);
        structure
    }

    /// Runs adjacent-pair suppression on rows, columns and spanning cells.
    pub fn suppress(&mut self, config: &AssemblyConfig, outliers: &mut Outliers) {
        let threshold = config.nms_overlap_threshold;
        self.rows_removed = box_utils::non_maxima_suppression(&mut self.rows, threshold);
        self.columns_removed = box_utils::non_maxima_suppression(&mut self.columns, threshold);
        let spans_removed = box_utils::non_maxima_suppression(&mut self.spanning, threshold);

        debug!(
            "Suppression removed {} rows, {} columns, {} spanning cells",
            self.rows_removed, self.columns_removed, spans_removed
        );

        if self.rows_removed >= config.nms_warn_threshold {
            warn!("Suppression removed {} rows", self.rows_removed);
            outliers.record(NMS_REMOVED_ROWS, OutlierValue::Count(self.rows_removed));
        }
        if self.columns_removed >= config.nms_warn_threshold {
            warn!("Suppression removed {} columns", self.columns_removed);
            outliers.record(NMS_REMOVED_COLUMNS, OutlierValue::Count(self.columns_removed));
        }
    }

    /// Stretches rows to the table width and columns to the table height.
    pub fn widen(&mut self, table: &Bounds) {
        for row in &mut self.rows {
            row.bounds = row.bounds.with_x_span(table.left(), table.right());
        }
        for column in &mut self.columns {
            column.bounds = column.bounds.with_y_span(table.top(), table.bottom());
        }
    }

    /// Lowest bottom edge of the column-header boxes, if any.
    pub fn header_bottom(&self) -> Option<f64> {
        self.headers
            .iter()
            .map(|header| header.bounds.bottom())
            .reduce(f64::max)
    }
}

/// Fraction of the table area by which `boxes` cover the table more than
/// once. Only the parts of each box inside the table count.
pub fn overlap_ratio(boxes: &[StructureBox], table: &Bounds) -> f64 {
    let table_area = table.area();
    if table_area <= 0.0 {
        return 0.0;
    }
    let covered: f64 = boxes
        .iter()
        .map(|structure_box| structure_box.bounds.intersect(table).area())
        .sum();
    (covered - table_area).max(0.0) / table_area
}

/// Overlap statistics used by the gate and the large-table trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapStats {
    pub row: f64,
    pub column: f64,
}

impl OverlapStats {
    pub fn total(&self) -> f64 {
        self.row + self.column
    }
}

/// Rejects structures whose rows and columns overlap far beyond the table
/// area, and flags milder excess as `high overlap`.
pub fn check_overlap(
    structure: &CleanedStructure,
    table: &Bounds,
    config: &AssemblyConfig,
    outliers: &mut Outliers,
) -> Result<OverlapStats, AssemblyError> {
    let stats = OverlapStats {
        row: overlap_ratio(&structure.rows, table),
        column: overlap_ratio(&structure.columns, table),
    };
    let total = stats.total();

    if total > config.total_overlap_reject_threshold {
        warn!(
            "Rejecting table: total overlap {:.3} exceeds {:.3}",
            total, config.total_overlap_reject_threshold
        );
        return Err(AssemblyError::ExcessiveOverlap {
            ratio: total,
            threshold: config.total_overlap_reject_threshold,
        });
    }

    if total > config.total_overlap_warn_threshold {
        warn!("High structure overlap: {:.3}", total);
        outliers.record(HIGH_OVERLAP, OutlierValue::Ratio(total));
    }

    Ok(stats)
}
