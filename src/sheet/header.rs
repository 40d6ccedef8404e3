use super::grid::Grid;

/// Index of the first row containing every required label, compared
/// case-insensitively against whole cells.
///
/// Sheets often carry a title block or totals above the trade table, so the
/// header is not assumed to be row 0. `None` is a normal outcome while the
/// sheet is being edited.
pub fn locate_header(grid: &Grid, required: &[String]) -> Option<usize> {
    let required: Vec<String> = required
        .iter()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect();
    if required.is_empty() {
        return None;
    }

    grid.iter().position(|row| {
        let cells: Vec<String> = row.iter().map(|c| c.to_lowercase()).collect();
        required.iter().all(|label| cells.contains(label))
    })
}
