//! Rendering sheets for the terminal preview.

use anyhow::Result;
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use csvtidy_sheet::{CellValue, Sheet};
use indexmap::IndexMap;
use std::sync::Arc;

/// Output format for the preview.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON records
    Json,
    /// CSV text, as it will be exported
    Csv,
    /// Pretty table output (default)
    #[default]
    Table,
}

/// Render a sheet in the requested format.
pub fn render(sheet: &Sheet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            if sheet.col_count() == 0 {
                return Ok("(empty table)".to_string());
            }
            let batch = sheet_to_batch(sheet)?;
            Ok(pretty_format_batches(&[batch])?.to_string())
        }
        OutputFormat::Csv => Ok(sheet.to_csv_string()),
        OutputFormat::Json => {
            let records: Vec<IndexMap<&str, &CellValue>> = sheet
                .rows()
                .map(|row| {
                    sheet
                        .column_names()
                        .iter()
                        .map(String::as_str)
                        .zip(row.iter())
                        .collect()
                })
                .collect();
            Ok(serde_json::to_string_pretty(&records)?)
        }
    }
}

/// Convert a sheet to a single Arrow batch of nullable UTF-8 columns.
fn sheet_to_batch(sheet: &Sheet) -> Result<RecordBatch> {
    let fields: Vec<Field> = sheet
        .column_names()
        .iter()
        .map(|name| Field::new(name, DataType::Utf8, true))
        .collect();

    let columns: Vec<ArrayRef> = (0..sheet.col_count())
        .map(|col| {
            let values: Vec<Option<String>> = sheet
                .rows()
                .map(|row| match &row[col] {
                    CellValue::Null => None,
                    cell => Some(cell.as_str()),
                })
                .collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
