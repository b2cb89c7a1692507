//! Export tabulated observables to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per redshift, one column per observable, units in the
//! header, empty cells where a value is undefined.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::io::table::Table;

/// Header label of a column, with its unit when it has one.
fn header_label(name: &str, unit: &str) -> String {
    if unit.is_empty() {
        name.to_string()
    } else {
        format!("{name} [{unit}]")
    }
}

/// Write a table as CSV.
pub fn write_table_csv<W: Write>(mut writer: W, table: &Table) -> Result<(), AppError> {
    let mut header = vec!["z".to_string()];
    header.extend(
        table
            .columns
            .iter()
            .map(|c| header_label(c.observable.name(), &c.unit)),
    );
    writeln!(writer, "{}", header.join(","))
        .map_err(|e| AppError::new(4, format!("Failed to write CSV header: {e}")))?;

    for (row, z) in table.z.iter().enumerate() {
        let mut fields = vec![format!("{z}")];
        for col in 0..table.columns.len() {
            fields.push(
                table
                    .cell(row, col)
                    .map(|v| format!("{v:.10e}"))
                    .unwrap_or_default(),
            );
        }
        writeln!(writer, "{}", fields.join(","))
            .map_err(|e| AppError::new(4, format!("Failed to write CSV row: {e}")))?;
    }

    Ok(())
}

/// Write a table to a CSV file.
pub fn write_table_csv_file(path: &Path, table: &Table) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_table_csv(file, table)
}
