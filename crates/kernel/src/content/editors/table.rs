//! Table grid editor.
//!
//! Every operation keeps the grid rectangular: each row has exactly one cell
//! per header.

use lectern_sdk::types::TableData;

use super::SubEditor;

#[derive(Debug, Clone)]
pub struct TableEditor {
    data: TableData,
}

impl SubEditor for TableEditor {
    type Data = TableData;

    /// Opening a ragged grid squares it up: short rows are padded with empty
    /// cells and missing headers are added for rows wider than the header.
    fn open(initial: TableData) -> Self {
        let mut data = initial;
        let width = data
            .rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(data.headers.len());
        while data.headers.len() < width {
            data.headers.push(column_label(data.headers.len()));
        }
        for row in &mut data.rows {
            row.resize(width, String::new());
        }
        Self { data }
    }

    fn data(&self) -> &TableData {
        &self.data
    }
}

fn column_label(index: usize) -> String {
    format!("Column {}", index + 1)
}

impl TableEditor {
    pub fn columns(&self) -> usize {
        self.data.headers.len()
    }

    pub fn rows(&self) -> usize {
        self.data.rows.len()
    }

    /// Append a row of empty cells, one per header.
    pub fn add_row(&mut self) {
        let width = self.columns();
        self.data.rows.push(vec![String::new(); width]);
    }

    pub fn remove_row(&mut self, index: usize) -> bool {
        if index >= self.data.rows.len() {
            return false;
        }
        self.data.rows.remove(index);
        true
    }

    /// Append a column; every row gains an empty cell.
    pub fn add_column(&mut self) {
        let label = column_label(self.columns());
        self.data.headers.push(label);
        for row in &mut self.data.rows {
            row.push(String::new());
        }
    }

    /// Remove column `index` from the header and from every row.
    pub fn remove_column(&mut self, index: usize) -> bool {
        if index >= self.columns() {
            return false;
        }
        self.data.headers.remove(index);
        for row in &mut self.data.rows {
            row.remove(index);
        }
        true
    }

    pub fn set_header(&mut self, col: usize, text: impl Into<String>) {
        if let Some(header) = self.data.headers.get_mut(col) {
            *header = text.into();
        }
    }

    pub fn set_cell(&mut self, row: usize, col: usize, text: impl Into<String>) {
        if let Some(cell) = self.data.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = text.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TableEditor {
        TableEditor::open(TableData {
            headers: vec!["A".into(), "B".into()],
            rows: vec![vec!["1".into(), "2".into()], vec!["3".into(), "4".into()]],
        })
    }

    #[test]
    fn add_row_matches_header_width() {
        let mut table = grid();
        table.add_row();
        assert_eq!(table.data().rows[2], vec![String::new(), String::new()]);
    }

    #[test]
    fn add_and_remove_column_keep_rows_rectangular() {
        let mut table = grid();
        table.add_column();
        assert_eq!(table.data().headers[2], "Column 3");
        assert!(table.data().is_rectangular());

        assert!(table.remove_column(0));
        assert_eq!(table.data().headers, vec!["B".to_string(), "Column 3".to_string()]);
        assert_eq!(table.data().rows[0], vec!["2".to_string(), String::new()]);
        assert!(table.data().is_rectangular());
    }

    #[test]
    fn removing_every_column_leaves_empty_rows() {
        let mut table = grid();
        assert!(table.remove_column(1));
        assert!(table.remove_column(0));
        assert!(!table.remove_column(0));
        assert_eq!(table.columns(), 0);
        assert!(table.data().rows.iter().all(Vec::is_empty));
        table.add_row();
        assert!(table.data().is_rectangular());
    }

    #[test]
    fn cell_edit_touches_only_that_cell() {
        let mut table = grid();
        let before = table.data().clone();
        table.set_cell(1, 0, "x");
        table.set_cell(5, 5, "ignored");
        let after = table.data();
        assert_eq!(after.rows[1][0], "x");
        assert_eq!(after.rows[0], before.rows[0]);
        assert_eq!(after.rows[1][1], before.rows[1][1]);
        assert_eq!(after.headers, before.headers);
    }

    #[test]
    fn header_edit_touches_only_that_header() {
        let mut table = grid();
        table.set_header(1, "Beta");
        assert_eq!(table.data().headers, vec!["A".to_string(), "Beta".to_string()]);
    }

    #[test]
    fn opening_ragged_grid_squares_it() {
        let table = TableEditor::open(TableData {
            headers: vec!["A".into()],
            rows: vec![vec![], vec!["1".into(), "2".into()]],
        });
        assert_eq!(table.columns(), 2);
        assert!(table.data().is_rectangular());
        assert_eq!(table.data().rows[1], vec!["1".to_string(), "2".to_string()]);
    }
}
