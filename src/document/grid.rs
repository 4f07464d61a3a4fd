use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Row-major buffer of optional cell text.
///
/// Serialized as a nested array of rows, with `null` for empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<String>>,
}

impl Grid {
    /// Creates a grid of `rows` x `cols` empty cells.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Builds a grid from nested rows. Short rows are padded with `None`.
    pub fn from_rows(rows: Vec<Vec<Option<String>>>) -> Self {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut grid = Self::new(rows.len(), cols);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                grid.cells[r * cols + c] = cell;
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Returns the cell text, or `None` for empty or out-of-range cells.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.index(row, col)
            .and_then(|i| self.cells[i].as_deref())
    }

    /// Overwrites a cell. Out-of-range positions are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: Option<String>) {
        if let Some(i) = self.index(row, col) {
            self.cells[i] = value;
        }
    }

    /// Appends `text` to a cell, space-joined with any text already there.
    pub fn append(&mut self, row: usize, col: usize, text: &str) {
        let Some(i) = self.index(row, col) else {
            return;
        };
        match &mut self.cells[i] {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(text);
            }
            slot @ None => *slot = Some(text.to_string()),
        }
    }

    pub fn row(&self, row: usize) -> &[Option<String>] {
        if row >= self.rows {
            return &[];
        }
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn is_row_empty(&self, row: usize) -> bool {
        self.row(row).iter().all(Option::is_none)
    }

    /// Indices of rows holding no text at all.
    pub fn empty_rows(&self) -> Vec<usize> {
        (0..self.rows).filter(|&r| self.is_row_empty(r)).collect()
    }

    /// Removes the given rows, keeping the order of the remaining ones.
    pub fn remove_rows(&mut self, remove: &[usize]) {
        if remove.is_empty() {
            return;
        }
        let cols = self.cols;
        let mut kept = Vec::with_capacity(self.cells.len());
        for (r, chunk) in self.cells.chunks(cols.max(1)).enumerate() {
            if !remove.contains(&r) {
                kept.extend_from_slice(chunk);
            }
        }
        self.rows = if cols == 0 {
            (0..self.rows).filter(|r| !remove.contains(r)).count()
        } else {
            kept.len() / cols
        };
        self.cells = kept;
    }

    pub fn to_rows(&self) -> Vec<Vec<Option<String>>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }

    /// Counts non-empty cells.
    pub fn filled_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows))?;
        for r in 0..self.rows {
            seq.serialize_element(self.row(r))?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Vec::<Vec<Option<String>>>::deserialize(deserializer)?;
        Ok(Grid::from_rows(rows))
    }
}
