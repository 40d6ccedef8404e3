use csv::ReaderBuilder;

/// Rows of trimmed cells, in sheet order. Rows keep their own length.
pub type Grid = Vec<Vec<String>>;

/// Parse CSV export text into a grid.
///
/// Quoted fields, doubled quotes and embedded newlines are handled by the
/// `csv` reader. Every cell is trimmed, so whitespace-only cells come back
/// empty. Short rows are not padded.
pub fn parse_grid(raw: &str) -> Result<Grid, csv::Error> {
    // Strip BOM if present
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut grid = Vec::new();
    for result in rdr.records() {
        let record = result?;
        grid.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }
    Ok(grid)
}

pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.is_empty())
}
