//! Import reconciler.
//!
//! Merges tabular workbook data into the aircraft and subsystem collections.
//! The sheets named `"UAVs"` and `"Subsystems"` are recognized; any other
//! sheet is ignored. Rows are matched to stored records by name and applied
//! as a field-level overlay: a present cell overwrites the stored field, an
//! absent cell leaves it untouched. Unmatched rows become new records.
//!
//! The run is all-or-nothing: both sheets are merged in memory first and the
//! backing files are written only after every merge succeeds.

pub mod sheet;

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::Result;
use crate::model::{split_purpose, AircraftModel, CustomValue, ParamDef, Subsystem, NUMERIC_ATTRIBUTES};
use crate::store::params::ParamRegistry;
use crate::store::Catalog;

/// Sheet name carrying aircraft rows.
pub const AIRCRAFT_SHEET: &str = "UAVs";
/// Sheet name carrying subsystem rows.
pub const SUBSYSTEMS_SHEET: &str = "Subsystems";

/// One row of a sheet: column header to cell value.
///
/// A header absent from the map, a `null` cell, and a blank string all count
/// as a missing cell.
pub type Row = BTreeMap<String, Value>;

/// A named, ordered list of rows.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    /// The sheet name, matched exactly against the recognized names.
    pub name: String,
    /// The rows, in file order.
    pub rows: Vec<Row>,
}

impl Sheet {
    /// Create an empty sheet with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }
}

/// A collection of sheets, as read from a workbook file or directory.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet.
    pub fn push(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Look up a sheet by exact name.
    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Per-table outcome counts of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSummary {
    /// Rows that created a new record.
    pub added: usize,
    /// Rows overlaid onto an existing record.
    pub updated: usize,
    /// Rows skipped for a missing name.
    pub skipped: usize,
}

/// Outcome counts of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Counts for the aircraft sheet.
    pub aircraft: TableSummary,
    /// Counts for the subsystems sheet.
    pub subsystems: TableSummary,
}

/// Merges workbook rows into the stored collections.
#[derive(Debug)]
pub struct Reconciler<'a> {
    catalog: &'a Catalog,
    registry: &'a ParamRegistry,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over the given catalog and parameter registry.
    #[must_use]
    pub fn new(catalog: &'a Catalog, registry: &'a ParamRegistry) -> Self {
        Self { catalog, registry }
    }

    /// Merge the recognized sheets of `workbook` into the stored collections.
    ///
    /// Both sheets are merged in memory before any file is written; a merge
    /// failure in either sheet leaves both collections untouched.
    ///
    /// # Errors
    ///
    /// Returns an error when a collection cannot be read, a cell cannot be
    /// interpreted, or a collection cannot be written back.
    pub fn apply(&self, workbook: &Workbook) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        let aircraft_sheet = workbook.sheet(AIRCRAFT_SHEET);
        let subsystems_sheet = workbook.sheet(SUBSYSTEMS_SHEET);

        let mut aircraft = None;
        if let Some(sheet) = aircraft_sheet {
            let params = self.registry.list()?;
            let mut records = self.catalog.aircraft()?;
            summary.aircraft = merge_aircraft(&mut records, sheet, &params)?;
            aircraft = Some(records);
        }

        let mut subsystems = None;
        if let Some(sheet) = subsystems_sheet {
            let mut records = self.catalog.subsystems()?;
            summary.subsystems = merge_subsystems(&mut records, sheet);
            subsystems = Some(records);
        }

        // Both merges succeeded; commit. A sheet whose rows were all skipped
        // leaves its backing file untouched.
        if let Some(records) = aircraft {
            if summary.aircraft.added + summary.aircraft.updated > 0 {
                self.catalog.save_aircraft(&records)?;
            }
        }
        if let Some(records) = subsystems {
            if summary.subsystems.added + summary.subsystems.updated > 0 {
                self.catalog.save_subsystems(&records)?;
            }
        }

        info!(
            "Import done: aircraft +{}/~{} (skipped {}), subsystems +{}/~{} (skipped {})",
            summary.aircraft.added,
            summary.aircraft.updated,
            summary.aircraft.skipped,
            summary.subsystems.added,
            summary.subsystems.updated,
            summary.subsystems.skipped,
        );
        Ok(summary)
    }
}

/// Merge an aircraft sheet into `records`, preserving stored order.
fn merge_aircraft(
    records: &mut Vec<AircraftModel>,
    sheet: &Sheet,
    params: &[ParamDef],
) -> Result<TableSummary> {
    let mut summary = TableSummary::default();

    for row in &sheet.rows {
        let Some(name) = row.get("name").and_then(cell_str) else {
            summary.skipped += 1;
            continue;
        };

        if let Some(existing) = records.iter_mut().find(|m| m.name == name) {
            overlay_aircraft(existing, row, params)?;
            summary.updated += 1;
        } else {
            let mut model = AircraftModel {
                id: AircraftModel::new_id(),
                name,
                ..AircraftModel::default()
            };
            overlay_aircraft(&mut model, row, params)?;
            records.push(model);
            summary.added += 1;
        }
    }

    Ok(summary)
}

/// Apply one row's present cells onto an aircraft record.
fn overlay_aircraft(model: &mut AircraftModel, row: &Row, params: &[ParamDef]) -> Result<()> {
    for (header, cell) in row {
        match header.as_str() {
            "name" => {} // already consumed as the match key
            "id" => {
                if let Some(id) = cell_str(cell) {
                    model.id = id;
                }
            }
            "manufacturer" => {
                if let Some(v) = cell_str(cell) {
                    model.manufacturer = v;
                }
            }
            "type" => {
                if let Some(v) = cell_str(cell) {
                    model.category = v.parse()?;
                }
            }
            "description" => {
                if let Some(v) = cell_str(cell) {
                    model.description = v;
                }
            }
            "image_url" => {
                if let Some(v) = cell_str(cell) {
                    model.image_url = Some(v);
                }
            }
            "purpose" => match cell {
                Value::String(raw) => {
                    let tags = split_purpose(raw);
                    if !tags.is_empty() {
                        model.purpose = tags;
                    }
                }
                Value::Array(items) => {
                    model.purpose = items.iter().filter_map(cell_str).collect();
                }
                _ => {}
            },
            key if NUMERIC_ATTRIBUTES.iter().any(|(k, _)| *k == key) => {
                if let Some(v) = cell_f64(cell) {
                    model.set_attribute(key, v);
                }
            }
            key => {
                if let Some(def) = params.iter().find(|p| p.name == key) {
                    if let Some(v) = cell_f64(cell) {
                        model.custom_params.insert(
                            def.name.clone(),
                            CustomValue {
                                value: Some(v),
                                unit: def.unit.clone(),
                            },
                        );
                    }
                } else if !cell.is_null() {
                    warn!("Ignoring unknown aircraft column '{key}'");
                }
            }
        }
    }
    Ok(())
}

/// Merge a subsystems sheet into `records`, preserving stored order.
///
/// Two rows sharing a name overlay the same record in turn, so the last
/// row's cells win.
fn merge_subsystems(records: &mut Vec<Subsystem>, sheet: &Sheet) -> TableSummary {
    let mut summary = TableSummary::default();

    for row in &sheet.rows {
        let Some(name) = row.get("name").and_then(cell_str) else {
            summary.skipped += 1;
            continue;
        };

        if let Some(existing) = records.iter_mut().find(|s| s.name == name) {
            overlay_subsystem(existing, row);
            summary.updated += 1;
        } else {
            let mut subsystem = Subsystem {
                name,
                ..Subsystem::default()
            };
            overlay_subsystem(&mut subsystem, row);
            records.push(subsystem);
            summary.added += 1;
        }
    }

    summary
}

/// Apply one row's present cells onto a subsystem record.
///
/// Headers outside the fixed fields land in `key_specs`.
fn overlay_subsystem(subsystem: &mut Subsystem, row: &Row) {
    for (header, cell) in row {
        match header.as_str() {
            "name" => {}
            "manufacturer" => {
                if let Some(v) = cell_str(cell) {
                    subsystem.manufacturer = v;
                }
            }
            "category" => {
                if let Some(v) = cell_str(cell) {
                    subsystem.category = v;
                }
            }
            "description" => {
                if let Some(v) = cell_str(cell) {
                    subsystem.description = v;
                }
            }
            "image_url" => {
                if let Some(v) = cell_str(cell) {
                    subsystem.image_url = Some(v);
                }
            }
            key => {
                if let Some(v) = cell_str(cell) {
                    subsystem.key_specs.insert(key.to_string(), v);
                }
            }
        }
    }
}

/// Interpret a cell as a non-blank string.
fn cell_str(cell: &Value) -> Option<String> {
    match cell {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Interpret a cell as a finite number.
fn cell_f64(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
