// src/services/export_service.rs
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::{Map, Value};
use tracing;

use crate::{
    errors::{AdmissionsError as AppError, AdmissionsResult},
    models::admission::AdmissionRecord,
};

pub type Row = Map<String, Value>;

pub const DEFAULT_EXPORT_FILENAME: &str = "export.xlsx";
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub filename: PathBuf,
    pub sheet_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: PathBuf::from(DEFAULT_EXPORT_FILENAME),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl ExportOptions {
    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub columns: Vec<String>,
    pub rows: usize,
}

/// Writes flat rows to a single-sheet workbook.
#[derive(Debug, Default, Clone)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Columns come from the keys of the first row, in order.
    pub fn columns(rows: &[Row]) -> Vec<String> {
        rows.first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn export_rows(&self, rows: &[Row], options: &ExportOptions) -> AdmissionsResult<ExportSummary> {
        let columns = Self::columns(rows);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&options.sheet_name)?;

        for (col, name) in columns.iter().enumerate() {
            worksheet.write_string(0, column_index(col)?, name)?;
        }

        for (idx, row) in rows.iter().enumerate() {
            let row_num = u32::try_from(idx + 1)
                .map_err(|_| AppError::SpreadsheetExport("too many rows".to_string()))?;
            for (col, name) in columns.iter().enumerate() {
                if let Some(value) = row.get(name) {
                    write_cell(worksheet, row_num, column_index(col)?, value)?;
                }
            }
        }

        ensure_parent(&options.filename)?;
        workbook.save(&options.filename)?;

        tracing::info!(
            "Exported {} rows to {} (sheet {})",
            rows.len(),
            options.filename.display(),
            options.sheet_name
        );

        Ok(ExportSummary {
            path: options.filename.clone(),
            columns,
            rows: rows.len(),
        })
    }

    pub fn export_records(&self, records: &[AdmissionRecord], options: &ExportOptions) -> AdmissionsResult<ExportSummary> {
        let rows: Vec<Row> = records.iter().map(AdmissionRecord::to_row).collect();
        self.export_rows(&rows, options)
    }
}

fn column_index(col: usize) -> AdmissionsResult<u16> {
    u16::try_from(col).map_err(|_| AppError::SpreadsheetExport("too many columns".to_string()))
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> AdmissionsResult<()> {
    match value {
        Value::Null => {}
        Value::Bool(flag) => {
            worksheet.write_boolean(row, col, *flag)?;
        }
        Value::Number(number) => match number.as_f64() {
            Some(n) => {
                worksheet.write_number(row, col, n)?;
            }
            None => {
                worksheet.write_string(row, col, number.to_string())?;
            }
        },
        Value::String(text) => {
            worksheet.write_string(row, col, text)?;
        }
        nested => {
            worksheet.write_string(row, col, nested.to_string())?;
        }
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> AdmissionsResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
