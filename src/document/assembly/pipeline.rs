use tracing::{debug, info, instrument, warn};

use super::cleaning::{self, CleanedStructure};
use super::dividers;
use super::grid_filler;
use super::headers::{self, RowRole};
use super::large_table;
use crate::document::bounds::Bounds;
use crate::document::error::AssemblyError;
use crate::document::grid::Grid;
use crate::document::merger::CellMerger;
use crate::document::outliers::{Outliers, OutlierValue, LARGE_TABLE_ASSUMPTION};
use crate::document::partitions::Partitions;
use crate::document::structure_box::{Prediction, StructureBox};
use crate::document::table::{AssembledTable, TableInput};
use crate::document::word::Word;
use crate::utils::box_utils::{sort_by_center_x, sort_by_center_y};
use crate::utils::config::AssemblyConfig;

/// Assembles structure predictions and words into a table grid.
///
/// An assembler holds only its configuration. Every call works on its own
/// inputs, so one assembler can serve any number of tables, from any number
/// of threads.
#[derive(Debug, Clone, Default)]
pub struct TableAssembler {
    config: AssemblyConfig,
}

/// Row and column geometry the grid was filled against.
struct Layout {
    rows: Vec<Bounds>,
    columns: Vec<Bounds>,
    roles: Vec<RowRole>,
    spanning: Vec<StructureBox>,
}

impl TableAssembler {
    pub fn new(config: AssemblyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Assembles a deserialized [`TableInput`].
    pub fn assemble_input(&self, input: &TableInput) -> Result<AssembledTable, AssemblyError> {
        self.assemble(
            input.table_bounds(),
            &input.predictions,
            input.words.iter().cloned(),
        )
    }

    /// Assembles one table from raw predictions and words.
    ///
    /// When neither rows nor columns survive confidence filtering, dividers
    /// are derived from the words alone.
    ///
    /// # Errors
    ///
    /// - [`AssemblyError::InvalidConfig`] when the configuration fails
    ///   [`AssemblyConfig::validate`]
    /// - [`AssemblyError::MalformedInput`] when the table has no area, or
    ///   when rows or columns are missing and no fallback applies
    /// - [`AssemblyError::ExcessiveOverlap`] when rows and columns overlap
    ///   beyond `total_overlap_reject_threshold`
    #[instrument(skip_all, fields(predictions = predictions.len()))]
    pub fn assemble<I>(
        &self,
        table: Bounds,
        predictions: &[Prediction],
        words: I,
    ) -> Result<AssembledTable, AssemblyError>
    where
        I: IntoIterator<Item = Word>,
    {
        self.check_config()?;
        if table.is_empty() {
            return Err(AssemblyError::malformed("table has zero area"));
        }
        let words: Vec<Word> = words.into_iter().collect();
        let mut outliers = Outliers::new();

        let boxes = cleaning::decode_predictions(
            predictions,
            &self.config.confidence_thresholds,
            &mut outliers,
        );
        let mut structure = CleanedStructure::split(boxes);
        debug!(
            "Decoded {} rows, {} columns, {} headers, {} projected, {} spanning",
            structure.rows.len(),
            structure.columns.len(),
            structure.headers.len(),
            structure.projected.len(),
            structure.spanning.len()
        );

        match (structure.rows.is_empty(), structure.columns.is_empty()) {
            (true, true) if !words.is_empty() => {
                info!("No rows or columns predicted, deriving dividers from words");
                let partitions = self.histogram_partitions(&table, &structure, &words)?;
                return self.assemble_partitions_with(&partitions, &words, outliers);
            }
            (true, true) => {
                return Err(AssemblyError::malformed("no rows, columns or words"));
            }
            (true, false) => return Err(AssemblyError::malformed("no rows detected")),
            (false, true) => return Err(AssemblyError::malformed("no columns detected")),
            (false, false) => {}
        }

        structure.suppress(&self.config, &mut outliers);
        let overlap = cleaning::check_overlap(&structure, &table, &self.config, &mut outliers)?;
        structure.widen(&table);

        let top_header_y = structure.header_bottom().unwrap_or(table.top());
        let has_header = structure.header_bottom().is_some();

        if self.is_large_table(&structure, overlap.row) {
            info!("Applying large table assumption");
            outliers.record(LARGE_TABLE_ASSUMPTION, OutlierValue::Flag(true));
            let start_y = if has_header { top_header_y } else { table.top() };
            if let Some(recovered) =
                large_table::recover_rows(&table, start_y, &words, &self.config, &mut outliers)
            {
                let threshold = self.config.header_ioa_threshold;
                structure.rows.retain(|row| {
                    headers::is_header_row(&row.bounds, table.top(), top_header_y, threshold)
                });
                structure.rows.extend(recovered);
                sort_by_center_y(&mut structure.rows);
            } else {
                warn!("Could not estimate text height, keeping predicted rows");
            }
        } else if let Some(height) =
            dividers::estimate_text_height(&words, self.config.smallest_supported_text_height)
        {
            dividers::fill_gaps(
                &mut structure.rows,
                &table,
                height,
                self.config.leave_gap,
                has_header,
            );
        }

        headers::ensure_header_rows(
            &mut structure.rows,
            &structure.headers,
            &table,
            self.config.header_ioa_threshold,
        );
        sort_by_center_x(&mut structure.columns);

        let rows: Vec<Bounds> = structure.rows.iter().map(|r| r.bounds).collect();
        let columns: Vec<Bounds> = structure.columns.iter().map(|c| c.bounds).collect();
        let projected: Vec<Bounds> = structure.projected.iter().map(|p| p.bounds).collect();
        let roles = headers::classify_rows(
            &rows,
            table.top(),
            top_header_y,
            &projected,
            self.config.header_ioa_threshold,
        );

        let grid = grid_filler::fill_by_boxes(
            &rows,
            &columns,
            &roles,
            &words,
            &self.config,
            &mut outliers,
        );

        let layout = Layout {
            rows,
            columns,
            roles,
            spanning: structure.spanning,
        };
        Ok(self.finish(grid, layout, outliers))
    }

    /// Assembles one table from literal dividers, as produced by
    /// divider-style detectors.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidConfig`] when the configuration fails
    /// [`AssemblyConfig::validate`].
    pub fn assemble_partitions<I>(
        &self,
        partitions: &Partitions,
        words: I,
    ) -> Result<AssembledTable, AssemblyError>
    where
        I: IntoIterator<Item = Word>,
    {
        self.check_config()?;
        let words: Vec<Word> = words.into_iter().collect();
        self.assemble_partitions_with(partitions, &words, Outliers::new())
    }

    #[instrument(skip_all, fields(rows = partitions.num_rows(), cols = partitions.num_cols()))]
    fn assemble_partitions_with(
        &self,
        partitions: &Partitions,
        words: &[Word],
        mut outliers: Outliers,
    ) -> Result<AssembledTable, AssemblyError> {
        let grid = grid_filler::fill_by_dividers(partitions, words, &mut outliers);

        let rows = partitions.row_boxes();
        let roles = headers::classify_rows(
            &rows,
            partitions.table_bounds().top(),
            partitions.top_header_y,
            &partitions.projected,
            self.config.header_ioa_threshold,
        );

        let layout = Layout {
            rows,
            columns: partitions.col_boxes(),
            roles,
            spanning: partitions.spanning.clone(),
        };
        Ok(self.finish(grid, layout, outliers))
    }

    /// Validates the configuration, including configs built in code.
    fn check_config(&self) -> Result<(), AssemblyError> {
        self.config.validate().map_err(|e| {
            warn!("Rejecting configuration: {}", e);
            AssemblyError::InvalidConfig {
                message: e.to_string(),
            }
        })
    }

    fn histogram_partitions(
        &self,
        table: &Bounds,
        structure: &CleanedStructure,
        words: &[Word],
    ) -> Result<Partitions, AssemblyError> {
        let partitions = dividers::histogram_partitions(
            table,
            words,
            self.config.histogram_frequency_threshold,
        )?;
        let projected = structure.projected.iter().map(|p| p.bounds).collect();
        Ok(partitions
            .with_top_header_y(structure.header_bottom().unwrap_or(table.top()))
            .with_projected(projected)
            .with_spanning(structure.spanning.clone()))
    }

    fn is_large_table(&self, structure: &CleanedStructure, row_overlap: f64) -> bool {
        if let Some(forced) = self.config.force_large_table_assumption {
            return forced;
        }
        structure.rows_removed > self.config.large_table_if_n_rows_removed
            || (row_overlap > self.config.large_table_row_overlap_threshold
                && structure.rows.len() > self.config.large_table_threshold)
    }

    /// Resolves spanning cells, drops empty rows and extracts header labels.
    fn finish(&self, mut grid: Grid, layout: Layout, mut outliers: Outliers) -> AssembledTable {
        let mut mergers: Vec<CellMerger> = Vec::new();
        if self.config.semantic_spanning_cells && !layout.spanning.is_empty() {
            let resolution = headers::resolve_spanning(
                &layout.spanning,
                &layout.rows,
                &layout.columns,
                &layout.roles,
                &self.config,
                &mut outliers,
            );
            if let Some(x) = resolution.left_header_x {
                debug!("Row header band ends at x={:.2}", x);
            }
            mergers = resolution.mergers;
        }

        let mut roles = layout.roles;
        if self.config.remove_null_rows {
            let empty = grid.empty_rows();
            if !empty.is_empty() {
                debug!("Removing {} empty rows", empty.len());
                let remap = remap_after_removal(grid.rows(), &empty);
                grid.remove_rows(&empty);
                roles = keep_unremoved(&roles, &remap);
                mergers = mergers
                    .iter()
                    .filter_map(|merger| merger.remap_rows(&remap))
                    .collect();
            }
        }

        for merger in &mergers {
            merger.apply(&mut grid);
        }

        let header_row_indices = indices_with_role(&roles, RowRole::Header);
        let column_labels = headers::extract_column_labels(
            &grid,
            &header_row_indices,
            self.config.enable_multi_header,
        );

        let remap = remap_after_removal(grid.rows(), &header_row_indices);
        grid.remove_rows(&header_row_indices);
        let roles = keep_unremoved(&roles, &remap);
        let projected_row_indices = indices_with_role(&roles, RowRole::Projected);

        info!(
            "Assembled {}x{} grid with {} header rows",
            grid.rows(),
            grid.cols(),
            header_row_indices.len()
        );

        AssembledTable {
            grid,
            column_labels,
            header_row_indices,
            projected_row_indices,
            outliers,
        }
    }
}

/// New index of every old row once `removed` rows are gone.
fn remap_after_removal(rows: usize, removed: &[usize]) -> Vec<Option<usize>> {
    let mut next = 0;
    (0..rows)
        .map(|row| {
            if removed.contains(&row) {
                None
            } else {
                next += 1;
                Some(next - 1)
            }
        })
        .collect()
}

fn keep_unremoved<T: Copy>(values: &[T], remap: &[Option<usize>]) -> Vec<T> {
    values
        .iter()
        .zip(remap)
        .filter_map(|(value, new)| new.map(|_| *value))
        .collect()
}

fn indices_with_role(roles: &[RowRole], role: RowRole) -> Vec<usize> {
    roles
        .iter()
        .enumerate()
        .filter(|(_, r)| **r == role)
        .map(|(i, _)| i)
        .collect()
}
