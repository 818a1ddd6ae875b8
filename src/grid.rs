use crate::model::Entry;

/// First free `(row, col)` in a grid `max_cols` wide, walking row-major
/// from `(1, 1)`. Returns the cell after the last occupied one if there is
/// no gap. Entries without a position do not occupy a cell.
pub fn next_free_cell(entries: &[Entry], max_cols: i32) -> (i32, i32) {
    let max_cols = max_cols.max(1);
    let mut occupied: Vec<(i32, i32)> = entries
        .iter()
        .filter(|e| e.row > 0 && e.col > 0)
        .map(|e| (e.row, e.col))
        .collect();
    occupied.sort_unstable();
    occupied.dedup();

    let mut expected = (1, 1);
    for cell in occupied {
        if cell != expected {
            break;
        }
        expected = if expected.1 >= max_cols {
            (expected.0 + 1, 1)
        } else {
            (expected.0, expected.1 + 1)
        };
    }
    expected
}
