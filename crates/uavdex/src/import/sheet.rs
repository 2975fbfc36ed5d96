//! CSV to sheet glue.
//!
//! The reconciler works on in-memory sheets; this module builds them from
//! headed CSV files. Cells that parse as finite numbers become numeric
//! values, empty cells are omitted, everything else stays a string.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

use super::{Row, Sheet, Workbook, AIRCRAFT_SHEET, SUBSYSTEMS_SHEET};

/// Read a headed CSV file as a sheet with the given name.
///
/// # Errors
///
/// Returns a sheet-read error when the file cannot be opened or a record is
/// malformed.
pub fn sheet_from_csv(name: &str, path: &Path) -> Result<Sheet> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| Error::SheetRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let headers = reader
        .headers()
        .map_err(|e| Error::SheetRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .clone();

    let mut sheet = Sheet::new(name);
    for record in reader.records() {
        let record = record.map_err(|e| Error::SheetRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut row = Row::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            row.insert(header.to_string(), parse_cell(cell));
        }
        sheet.rows.push(row);
    }

    debug!("Read {} rows from {}", sheet.rows.len(), path.display());
    Ok(sheet)
}

/// Build a workbook from optional per-table CSV files.
///
/// # Errors
///
/// Returns a sheet-read error when either file cannot be read.
pub fn workbook_from_csvs(
    aircraft: Option<&Path>,
    subsystems: Option<&Path>,
) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    if let Some(path) = aircraft {
        workbook.push(sheet_from_csv(AIRCRAFT_SHEET, path)?);
    }
    if let Some(path) = subsystems {
        workbook.push(sheet_from_csv(SUBSYSTEMS_SHEET, path)?);
    }
    Ok(workbook)
}

/// Interpret one non-empty CSV cell.
fn parse_cell(cell: &str) -> Value {
    if let Ok(v) = cell.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(v) {
            return Value::Number(n);
        }
    }
    Value::String(cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_csv(tag: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("uavdex_sheet_{tag}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sheet.csv");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_csv_cells_typed() {
        let path = write_csv(
            "typed",
            "name,mtow_kg,description\nHeron,1150,MALE UAV\nAnka,,\n",
        );

        let sheet = sheet_from_csv(AIRCRAFT_SHEET, &path).unwrap();
        assert_eq!(sheet.rows.len(), 2);

        assert_eq!(sheet.rows[0]["name"], Value::String("Heron".to_string()));
        assert_eq!(sheet.rows[0]["mtow_kg"].as_f64(), Some(1150.0));
        assert_eq!(
            sheet.rows[0]["description"],
            Value::String("MALE UAV".to_string())
        );

        // Empty cells are absent, not null
        assert!(!sheet.rows[1].contains_key("mtow_kg"));
        assert!(!sheet.rows[1].contains_key("description"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_is_sheet_read_error() {
        let err = sheet_from_csv(AIRCRAFT_SHEET, Path::new("/nonexistent/sheet.csv")).unwrap_err();
        assert!(matches!(err, Error::SheetRead { .. }));
    }

    #[test]
    fn test_workbook_from_csvs() {
        let uavs = write_csv("wb_uavs", "name\nHeron\n");
        let subs = write_csv("wb_subs", "name\nPixhawk 6C\n");

        let workbook = workbook_from_csvs(Some(&uavs), Some(&subs)).unwrap();
        assert_eq!(workbook.sheet(AIRCRAFT_SHEET).unwrap().rows.len(), 1);
        assert_eq!(workbook.sheet(SUBSYSTEMS_SHEET).unwrap().rows.len(), 1);

        let empty = workbook_from_csvs(None, None).unwrap();
        assert!(empty.sheet(AIRCRAFT_SHEET).is_none());

        let _ = std::fs::remove_dir_all(uavs.parent().unwrap());
        let _ = std::fs::remove_dir_all(subs.parent().unwrap());
    }

    #[test]
    fn test_non_finite_token_stays_string() {
        // "inf" parses as f64 infinity; keep it as text instead
        assert_eq!(parse_cell("inf"), Value::String("inf".to_string()));
        assert_eq!(parse_cell("3.5").as_f64(), Some(3.5));
    }
}
