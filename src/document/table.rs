use serde::{Deserialize, Serialize};

use crate::document::bounds::Bounds;
use crate::document::grid::Grid;
use crate::document::outliers::Outliers;
use crate::document::structure_box::Prediction;
use crate::document::word::Word;

/// Everything needed to assemble one table, in table-local coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableInput {
    /// Width of the cropped table.
    pub width: f64,
    /// Height of the cropped table.
    pub height: f64,
    /// Raw structure predictions.
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    /// Words in reading order.
    #[serde(default)]
    pub words: Vec<Word>,
}

impl TableInput {
    /// The table rectangle, anchored at the origin.
    pub fn table_bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }
}

/// Column labels taken from header rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnLabels {
    /// One label per column, header rows joined by `" \n"`.
    Flat(Vec<String>),
    /// One tuple per column, one entry per header row.
    Hierarchical(Vec<Vec<String>>),
}

impl ColumnLabels {
    pub fn len(&self) -> usize {
        match self {
            ColumnLabels::Flat(labels) => labels.len(),
            ColumnLabels::Hierarchical(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ColumnLabels {
    fn default() -> Self {
        ColumnLabels::Flat(Vec::new())
    }
}

/// The result of assembling one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssembledTable {
    /// Body cells, header rows already removed.
    pub grid: Grid,
    pub column_labels: ColumnLabels,
    /// Header rows, indexed before they were extracted from the grid.
    pub header_row_indices: Vec<usize>,
    /// Projected row headers, indexed into `grid`.
    pub projected_row_indices: Vec<usize>,
    pub outliers: Outliers,
}
