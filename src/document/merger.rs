use serde::{Deserialize, Serialize};

use super::error::AssemblyError;
use super::grid::Grid;
use crate::utils::config::LeftFillStrategy;

/// Semantic role of a spanning cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanCategory {
    /// Spans several columns of a single header row.
    TopHierarchical,
    /// Spans several header rows of a single column.
    TopMonosemantic,
    /// Spans several body rows of a single column.
    LeftHierarchical,
}

/// Operations a merge performs on its covered cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeFlags {
    pub repeat: bool,
    pub aggregate: bool,
    pub push_forward: bool,
    pub push_backward: bool,
}

impl MergeFlags {
    fn any(self) -> bool {
        self.repeat || self.aggregate || self.push_forward || self.push_backward
    }

    fn any_push(self) -> bool {
        self.push_forward || self.push_backward
    }
}

/// A validated combination of span category and merge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeKind {
    category: SpanCategory,
    flags: MergeFlags,
}

impl MergeKind {
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidMerge`] when no operation is set, or
    /// when pushing is combined with another operation or with pushing in
    /// the opposite direction.
    pub fn new(category: SpanCategory, flags: MergeFlags) -> Result<Self, AssemblyError> {
        let problem = if !flags.any() {
            Some("no merge operation set")
        } else if flags.push_forward && flags.push_backward {
            Some("cannot push forward and backward at once")
        } else if flags.aggregate && flags.any_push() {
            Some("cannot aggregate and push at once")
        } else if flags.repeat && flags.any_push() {
            Some("cannot repeat and push at once")
        } else {
            None
        };

        match problem {
            Some(message) => Err(AssemblyError::InvalidMerge {
                message: message.to_string(),
            }),
            None => Ok(Self { category, flags }),
        }
    }

    pub fn top_hierarchical() -> Self {
        Self {
            category: SpanCategory::TopHierarchical,
            flags: MergeFlags {
                aggregate: true,
                repeat: true,
                ..MergeFlags::default()
            },
        }
    }

    pub fn top_monosemantic() -> Self {
        Self {
            category: SpanCategory::TopMonosemantic,
            flags: MergeFlags {
                aggregate: true,
                ..MergeFlags::default()
            },
        }
    }

    pub fn left_hierarchical(strategy: LeftFillStrategy) -> Self {
        let flags = match strategy {
            LeftFillStrategy::Algorithm => MergeFlags {
                push_forward: true,
                ..MergeFlags::default()
            },
            LeftFillStrategy::Deep => MergeFlags {
                repeat: true,
                ..MergeFlags::default()
            },
        };
        Self {
            category: SpanCategory::LeftHierarchical,
            flags,
        }
    }

    pub fn category(&self) -> SpanCategory {
        self.category
    }

    pub fn flags(&self) -> MergeFlags {
        self.flags
    }
}

/// Rewrites one rectangular region of a [`Grid`].
///
/// Row and column bounds are inclusive. `col_max` of `None` means the
/// merge covers the single column `col_min`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellMerger {
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: Option<usize>,
    pub kind: MergeKind,
}

impl CellMerger {
    pub fn new(
        rows: (usize, usize),
        cols: (usize, Option<usize>),
        kind: MergeKind,
    ) -> Self {
        Self {
            row_min: rows.0,
            row_max: rows.1,
            col_min: cols.0,
            col_max: cols.1,
            kind,
        }
    }

    pub fn top(&self) -> usize {
        self.row_min
    }

    /// Shifts row bounds after rows were removed from the grid.
    ///
    /// `remap[i]` is the new index of old row `i`, or `None` if it was
    /// removed. Returns `None` when every covered row is gone.
    pub fn remap_rows(&self, remap: &[Option<usize>]) -> Option<Self> {
        let kept: Vec<usize> = (self.row_min..=self.row_max)
            .filter_map(|r| remap.get(r).copied().flatten())
            .collect();
        let (first, last) = (*kept.first()?, *kept.last()?);
        Some(Self {
            row_min: first,
            row_max: last,
            ..self.clone()
        })
    }

    /// Applies the merge to `grid`. Positions beyond the grid are clipped.
    pub fn apply(&self, grid: &mut Grid) {
        if grid.rows() == 0 || grid.cols() == 0 {
            return;
        }
        let row_max = self.row_max.min(grid.rows() - 1);
        let col_max = self.col_max.unwrap_or(self.col_min).min(grid.cols() - 1);
        if self.row_min > row_max || self.col_min > col_max {
            return;
        }
        let rows = self.row_min..=row_max;
        let cols = self.col_min..=col_max;
        let flags = self.kind.flags;

        if flags.aggregate && flags.repeat {
            aggregate_and_repeat(grid, rows, cols);
        } else if flags.aggregate {
            for col in cols {
                aggregate_into_bottom(grid, rows.clone(), col);
            }
        } else if flags.push_forward {
            for col in cols {
                push(grid, rows.clone().collect(), col);
            }
        } else if flags.push_backward {
            for col in cols {
                push(grid, rows.clone().rev().collect(), col);
            }
        } else if flags.repeat {
            repeat_unique(grid, rows, cols);
        }
    }
}

fn aggregate_and_repeat(
    grid: &mut Grid,
    rows: std::ops::RangeInclusive<usize>,
    cols: std::ops::RangeInclusive<usize>,
) {
    let mut parts = Vec::new();
    for row in rows.clone() {
        for col in cols.clone() {
            if let Some(text) = grid.get(row, col) {
                parts.push(text.to_string());
            }
        }
    }
    if parts.is_empty() {
        return;
    }

    let joined = parts.join(" ");
    for row in rows {
        for col in cols.clone() {
            grid.set(row, col, Some(joined.clone()));
        }
    }
}

fn aggregate_into_bottom(grid: &mut Grid, rows: std::ops::RangeInclusive<usize>, col: usize) {
    let bottom = *rows.end();
    let parts: Vec<String> = rows
        .clone()
        .filter_map(|row| grid.get(row, col).map(str::to_string))
        .collect();
    if parts.is_empty() {
        return;
    }

    for row in rows {
        grid.set(row, col, None);
    }
    grid.set(bottom, col, Some(parts.join(" ")));
}

/// Carries the first value along `order` into empty cells, stopping at the
/// first cell holding a different value.
fn push(grid: &mut Grid, order: Vec<usize>, col: usize) {
    let mut current: Option<String> = None;
    for row in order {
        match grid.get(row, col).map(str::to_string) {
            Some(text) => {
                if current.is_none() {
                    current = Some(text);
                } else if current.as_deref() != Some(text.as_str()) {
                    break;
                }
            }
            None => {
                if let Some(value) = current.clone() {
                    grid.set(row, col, Some(value));
                }
            }
        }
    }
}

fn repeat_unique(
    grid: &mut Grid,
    rows: std::ops::RangeInclusive<usize>,
    cols: std::ops::RangeInclusive<usize>,
) {
    let mut unique: Option<String> = None;
    for row in rows.clone() {
        for col in cols.clone() {
            if let Some(text) = grid.get(row, col) {
                if unique.is_none() {
                    unique = Some(text.to_string());
                } else if unique.as_deref() != Some(text) {
                    return;
                }
            }
        }
    }

    let Some(value) = unique else {
        return;
    };
    for row in rows {
        for col in cols.clone() {
            if grid.get(row, col).is_none() {
                grid.set(row, col, Some(value.clone()));
            }
        }
    }
}
