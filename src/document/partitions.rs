use serde::Serialize;

use super::bounds::Bounds;
use super::error::AssemblyError;
use super::structure_box::StructureBox;

/// Literal row and column divider coordinates for one table.
///
/// Both divider lists include the table's outer edges as their first and
/// last elements, so `row_dividers.len() - 1` is the number of rows and
/// `col_dividers.len() - 1` the number of columns. Dividers are
/// non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partitions {
    row_dividers: Vec<f64>,
    col_dividers: Vec<f64>,
    /// Lower edge of the column-header band.
    pub top_header_y: f64,
    /// Right edge of the row-header band.
    pub left_header_x: f64,
    /// Projected-row-header regions.
    pub projected: Vec<Bounds>,
    /// Spanning-cell predictions to resolve after filling.
    pub spanning: Vec<StructureBox>,
}

impl Partitions {
    /// Creates partitions from explicit dividers.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::MalformedInput`] if either list has fewer
    /// than two entries, decreases, or holds a non-finite value.
    pub fn new(row_dividers: Vec<f64>, col_dividers: Vec<f64>) -> Result<Self, AssemblyError> {
        check_dividers("row", &row_dividers)?;
        check_dividers("column", &col_dividers)?;

        let top_header_y = row_dividers[0];
        let left_header_x = col_dividers[0];
        Ok(Self {
            row_dividers,
            col_dividers,
            top_header_y,
            left_header_x,
            projected: Vec::new(),
            spanning: Vec::new(),
        })
    }

    /// Builds dividers from interior positions plus the table's outer edges.
    ///
    /// Interior positions are sorted and those outside the table are
    /// dropped.
    pub fn with_table_edges(
        table: &Bounds,
        mut row_interior: Vec<f64>,
        mut col_interior: Vec<f64>,
    ) -> Result<Self, AssemblyError> {
        row_interior.retain(|y| *y > table.top() && *y < table.bottom());
        col_interior.retain(|x| *x > table.left() && *x < table.right());
        row_interior.sort_by(f64::total_cmp);
        col_interior.sort_by(f64::total_cmp);

        let mut rows = Vec::with_capacity(row_interior.len() + 2);
        rows.push(table.top());
        rows.extend(row_interior);
        rows.push(table.bottom());

        let mut cols = Vec::with_capacity(col_interior.len() + 2);
        cols.push(table.left());
        cols.extend(col_interior);
        cols.push(table.right());

        Self::new(rows, cols)
    }

    pub fn with_top_header_y(mut self, y: f64) -> Self {
        self.top_header_y = y;
        self
    }

    pub fn with_left_header_x(mut self, x: f64) -> Self {
        self.left_header_x = x;
        self
    }

    pub fn with_projected(mut self, projected: Vec<Bounds>) -> Self {
        self.projected = projected;
        self
    }

    pub fn with_spanning(mut self, spanning: Vec<StructureBox>) -> Self {
        self.spanning = spanning;
        self
    }

    pub fn row_dividers(&self) -> &[f64] {
        &self.row_dividers
    }

    pub fn col_dividers(&self) -> &[f64] {
        &self.col_dividers
    }

    pub fn num_rows(&self) -> usize {
        self.row_dividers.len() - 1
    }

    pub fn num_cols(&self) -> usize {
        self.col_dividers.len() - 1
    }

    /// The outer table rectangle spanned by the first and last dividers.
    pub fn table_bounds(&self) -> Bounds {
        Bounds::new(
            self.col_dividers[0],
            self.row_dividers[0],
            self.col_dividers[self.num_cols()],
            self.row_dividers[self.num_rows()],
        )
    }

    /// Row `i` as a full-width rectangle.
    pub fn row_bounds(&self, i: usize) -> Bounds {
        Bounds::new(
            self.col_dividers[0],
            self.row_dividers[i],
            self.col_dividers[self.num_cols()],
            self.row_dividers[i + 1],
        )
    }

    /// Column `i` as a full-height rectangle.
    pub fn col_bounds(&self, i: usize) -> Bounds {
        Bounds::new(
            self.col_dividers[i],
            self.row_dividers[0],
            self.col_dividers[i + 1],
            self.row_dividers[self.num_rows()],
        )
    }

    pub fn row_boxes(&self) -> Vec<Bounds> {
        (0..self.num_rows()).map(|i| self.row_bounds(i)).collect()
    }

    pub fn col_boxes(&self) -> Vec<Bounds> {
        (0..self.num_cols()).map(|i| self.col_bounds(i)).collect()
    }
}

fn check_dividers(axis: &str, dividers: &[f64]) -> Result<(), AssemblyError> {
    if dividers.len() < 2 {
        return Err(AssemblyError::malformed(format!(
            "{axis} dividers need at least 2 entries, got {}",
            dividers.len()
        )));
    }
    if dividers.iter().any(|d| !d.is_finite()) {
        return Err(AssemblyError::malformed(format!(
            "{axis} dividers must be finite"
        )));
    }
    if dividers.windows(2).any(|pair| pair[1] < pair[0]) {
        return Err(AssemblyError::malformed(format!(
            "{axis} dividers must be non-decreasing"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_dividers() {
        let result = Partitions::new(vec![0.0], vec![0.0, 10.0]);
        assert!(matches!(result, Err(AssemblyError::MalformedInput { .. })));
    }

    #[test]
    fn test_rejects_decreasing_dividers() {
        let result = Partitions::new(vec![0.0, 10.0], vec![0.0, 20.0, 10.0]);
        assert!(matches!(result, Err(AssemblyError::MalformedInput { .. })));
    }

    #[test]
    fn test_with_table_edges_injects_bounds() {
        let table = Bounds::new(0.0, 0.0, 100.0, 30.0);
        let partitions =
            Partitions::with_table_edges(&table, vec![20.0, 10.0, 45.0], vec![50.0]).unwrap();
        assert_eq!(partitions.row_dividers(), &[0.0, 10.0, 20.0, 30.0]);
        assert_eq!(partitions.col_dividers(), &[0.0, 50.0, 100.0]);
        assert_eq!(partitions.num_rows(), 3);
        assert_eq!(partitions.num_cols(), 2);
    }

    #[test]
    fn test_header_bands_default_to_table_edges() {
        let partitions = Partitions::new(vec![5.0, 10.0, 20.0], vec![2.0, 40.0]).unwrap();
        assert_eq!(partitions.top_header_y, 5.0);
        assert_eq!(partitions.left_header_x, 2.0);

        let partitions = partitions.with_top_header_y(10.0).with_left_header_x(15.0);
        assert_eq!(partitions.top_header_y, 10.0);
        assert_eq!(partitions.left_header_x, 15.0);
    }

    #[test]
    fn test_row_bounds() {
        let partitions = Partitions::new(vec![0.0, 10.0, 20.0], vec![0.0, 40.0]).unwrap();
        assert_eq!(partitions.row_bounds(1), Bounds::new(0.0, 10.0, 40.0, 20.0));
        assert_eq!(partitions.table_bounds(), Bounds::new(0.0, 0.0, 40.0, 20.0));
    }
}
