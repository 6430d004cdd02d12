use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{CellValue, QueryResult};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCsvOptions {
    pub file_path: String,
    pub include_headers: bool,
    pub null_as_empty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCsvResult {
    pub success: bool,
    pub rows_exported: u64,
}

/// Export the displayed result to a CSV file
pub fn export_result_csv(state: &AppState, options: &ExportCsvOptions) -> ConsoleResult<ExportCsvResult> {
    let result = state
        .console()
        .displayed_result()
        .cloned()
        .ok_or(ConsoleError::NothingToExport)?;

    let file = File::create(&options.file_path)?;
    let rows_exported = write_result_csv(&result, BufWriter::new(file), options)?;

    log::info!("Exported {} rows to {}", rows_exported, options.file_path);
    Ok(ExportCsvResult {
        success: true,
        rows_exported,
    })
}

/// Write rows in the column order of the first row. Cells missing from later rows are
/// written as empty fields.
pub fn write_result_csv<W: Write>(
    result: &QueryResult,
    writer: W,
    options: &ExportCsvOptions,
) -> ConsoleResult<u64> {
    let mut writer = csv::Writer::from_writer(writer);
    let columns = result.columns();

    if options.include_headers && !columns.is_empty() {
        writer.write_record(&columns)?;
    }

    let mut rows_exported: u64 = 0;
    for row in &result.rows {
        let record: Vec<String> = columns
            .iter()
            .map(|column| match row.get(*column) {
                Some(value) => csv_value(value, options.null_as_empty),
                None => String::new(),
            })
            .collect();

        writer.write_record(&record)?;
        rows_exported += 1;
    }

    writer.flush()?;
    Ok(rows_exported)
}

fn csv_value(value: &CellValue, null_as_empty: bool) -> String {
    match value {
        CellValue::Null if null_as_empty => String::new(),
        CellValue::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}
