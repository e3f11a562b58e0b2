use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rust_xlsxwriter::Workbook;

/// Serializes the cell matrix to a single-worksheet workbook. No header row
/// is emitted; rows shorter than the matrix width (the separator row) are
/// left as empty cells.
pub fn write_matrix(path: &Path, matrix: &[Vec<String>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (row_idx, row) in matrix.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            worksheet
                .write_string(row_idx as u32, col_idx as u16, cell)
                .with_context(|| format!("Writing cell ({row_idx}, {col_idx})"))?;
        }
    }
    workbook
        .save(path)
        .with_context(|| format!("Saving workbook {path:?}"))?;
    info!("Wrote {} row(s) to {path:?}", matrix.len());
    Ok(())
}
