//! Assembly configuration module.
//!
//! This module provides the tunable thresholds for table assembly.
//! Configuration is an explicit value passed into every assembly call and can
//! optionally be loaded from a JSON file.

use super::error::ConfigError;
use crate::document::structure_box::StructureKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Minimum confidence a prediction needs, per structure kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    pub table: f64,
    pub column: f64,
    pub row: f64,
    pub column_header: f64,
    pub projected_row: f64,
    pub spanning_cell: f64,
    pub no_object: f64,
}

impl ConfidenceThresholds {
    /// Returns the threshold that applies to `kind`.
    #[must_use]
    pub fn for_kind(&self, kind: StructureKind) -> f64 {
        match kind {
            StructureKind::Table => self.table,
            StructureKind::Column => self.column,
            StructureKind::Row => self.row,
            StructureKind::ColumnHeader => self.column_header,
            StructureKind::ProjectedRow => self.projected_row,
            StructureKind::SpanningCell => self.spanning_cell,
            StructureKind::NoObject => self.no_object,
        }
    }
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            table: 0.3,
            column: 0.3,
            row: 0.3,
            column_header: 0.3,
            projected_row: 0.5,
            spanning_cell: 0.5,
            no_object: 99.0,
        }
    }
}

/// How hierarchical left-header spans fill their covered rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeftFillStrategy {
    /// Push each value down into the empty rows below it, stopping at the
    /// next distinct value.
    #[default]
    Algorithm,
    /// Repeat the span's single value into every empty covered row, above
    /// and below it. Spans holding more than one distinct value are left
    /// untouched.
    Deep,
}

/// Table assembly configuration.
///
/// Every field has a default, so a JSON file only needs to list the values
/// it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Per-kind confidence filter applied before anything else.
    pub confidence_thresholds: ConfidenceThresholds,

    /// Overlap above which adjacent same-kind boxes are suppressed.
    pub nms_overlap_threshold: f64,

    /// Number of rows removed by suppression that raises a warning.
    pub nms_warn_threshold: usize,

    /// Rows removed by suppression that trigger large-table recovery.
    pub large_table_if_n_rows_removed: usize,

    /// Row count above which row overlap may trigger large-table recovery.
    pub large_table_threshold: usize,

    /// Row overlap fraction that, with enough rows, triggers recovery.
    pub large_table_row_overlap_threshold: f64,

    /// Upper bound on the number of rows recovery may produce.
    pub large_table_maximum_rows: usize,

    /// Forces large-table recovery on (`Some(true)`) or off (`Some(false)`).
    pub force_large_table_assumption: Option<bool>,

    /// Fraction of the text height below which recovered row centers merge.
    pub large_table_merge_fraction: f64,

    /// Total overlap fraction that aborts assembly.
    pub total_overlap_reject_threshold: f64,

    /// Total overlap fraction that raises the `high overlap` warning.
    pub total_overlap_warn_threshold: f64,

    /// Interval overlap needed to classify a row as header or projected.
    pub header_ioa_threshold: f64,

    /// Interval overlap needed for a spanning cell to cover a row/column.
    pub spanning_overlap_threshold: f64,

    /// Cell overlap below which a word is skipped.
    pub iob_reject_threshold: f64,

    /// Cell overlap below which a kept word is reported.
    pub iob_warn_threshold: f64,

    /// Cell score below this fraction of `row score * column score` is
    /// reported as a corner clip.
    pub corner_clip_ratio: f64,

    /// Fractional margin left on each side of gap-filling rows.
    pub leave_gap: f64,

    /// Words shorter than this are ignored when estimating text height.
    pub smallest_supported_text_height: f64,

    /// Word-density threshold for histogram dividers.
    pub histogram_frequency_threshold: i64,

    /// Drop rows without any text.
    pub remove_null_rows: bool,

    /// Report one label component per header row instead of joining them.
    pub enable_multi_header: bool,

    /// Resolve spanning cells into header merges.
    pub semantic_spanning_cells: bool,

    /// Fill strategy for hierarchical left-header spans.
    pub left_fill: LeftFillStrategy,
}

impl AssemblyConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration JSON file
    ///
    /// # Returns
    ///
    /// Returns the parsed and validated `AssemblyConfig`, or a `ConfigError`
    /// if reading, parsing or validation fails.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AssemblyConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every ratio lies in its supported range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_ratios = [
            ("nms_overlap_threshold", self.nms_overlap_threshold),
            ("header_ioa_threshold", self.header_ioa_threshold),
            ("spanning_overlap_threshold", self.spanning_overlap_threshold),
            ("iob_reject_threshold", self.iob_reject_threshold),
            ("iob_warn_threshold", self.iob_warn_threshold),
            ("corner_clip_ratio", self.corner_clip_ratio),
            ("large_table_merge_fraction", self.large_table_merge_fraction),
        ];
        for (field, value) in unit_ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: format!("expected a value in [0, 1], got {value}"),
                });
            }
        }

        if !(0.0..0.5).contains(&self.leave_gap) {
            return Err(ConfigError::InvalidValue {
                field: "leave_gap",
                message: format!("expected a value in [0, 0.5), got {}", self.leave_gap),
            });
        }

        if self.iob_reject_threshold > self.iob_warn_threshold {
            return Err(ConfigError::InvalidValue {
                field: "iob_reject_threshold",
                message: "must not exceed iob_warn_threshold".to_string(),
            });
        }

        if self.total_overlap_warn_threshold > self.total_overlap_reject_threshold {
            return Err(ConfigError::InvalidValue {
                field: "total_overlap_warn_threshold",
                message: "must not exceed total_overlap_reject_threshold".to_string(),
            });
        }

        if self.large_table_maximum_rows == 0 {
            return Err(ConfigError::InvalidValue {
                field: "large_table_maximum_rows",
                message: "must be at least 1".to_string(),
            });
        }

        if self.smallest_supported_text_height < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "smallest_supported_text_height",
                message: "must not be negative".to_string(),
            });
        }

        Ok(())
    }

    /// Create a new configuration with default values.
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            confidence_thresholds: ConfidenceThresholds::default(),
            nms_overlap_threshold: 0.1,
            nms_warn_threshold: 5,
            large_table_if_n_rows_removed: 8,
            large_table_threshold: 10,
            large_table_row_overlap_threshold: 0.2,
            large_table_maximum_rows: 1000,
            force_large_table_assumption: None,
            large_table_merge_fraction: 0.6,
            total_overlap_reject_threshold: 0.9,
            total_overlap_warn_threshold: 0.1,
            header_ioa_threshold: 0.7,
            spanning_overlap_threshold: 0.2,
            iob_reject_threshold: 0.05,
            iob_warn_threshold: 0.5,
            corner_clip_ratio: 0.9,
            leave_gap: 0.1,
            smallest_supported_text_height: 0.1,
            histogram_frequency_threshold: 0,
            remove_null_rows: true,
            enable_multi_header: false,
            semantic_spanning_cells: false,
            left_fill: LeftFillStrategy::Algorithm,
        }
    }
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
