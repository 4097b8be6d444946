// ## 📂 File: `src/source/reader.rs`

//! source/reader.rs
//! Workbook bytes -> `TabularSource`.
//!
//! Design notes:
//! - Format is sniffed from content (xlsx, xlsm, xlsb, xls, ods), never from the file name.
//! - The first row of the selected worksheet is the header row.
//! - The whole sheet is materialized; there is no row streaming.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use super::coerce::coerce;
use super::types::{CellValue, TabularSource};
use crate::types::ConvertError;

/// Where the workbook comes from.
#[derive(Debug, Clone, Copy)]
pub enum SourceInput<'a> {
    File(&'a Path),
    Memory(&'a [u8]),
}

/// Read one worksheet (the first when `sheet_name` is `None`).
pub fn read_workbook(input: SourceInput<'_>, sheet_name: Option<&str>) -> Result<TabularSource, ConvertError> {
    let bytes = match input {
        SourceInput::File(path) => std::fs::read(path)?,
        SourceInput::Memory(b) => b.to_vec(),
    };
    read_workbook_bytes(bytes, sheet_name)
}

fn read_workbook_bytes(bytes: Vec<u8>, sheet_name: Option<&str>) -> Result<TabularSource, ConvertError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let names = workbook.sheet_names();
    let sheet = match sheet_name {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| ConvertError::InvalidFormat(format!("worksheet '{}' not found", wanted)))?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| ConvertError::InvalidFormat("workbook has no worksheets".into()))?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    let mut rows = range.rows();

    let columns: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(idx, cell)| column_name(idx, cell))
            .collect(),
        None => Vec::new(),
    };

    // Worksheet row numbers are 1-based; the range may start below row 1.
    let header_row = range.start().map(|(r, _)| r as usize + 1).unwrap_or(1);
    let (source_rows, body): (Vec<usize>, Vec<Vec<CellValue>>) = rows
        .enumerate()
        .filter(|(_, row)| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|(idx, row)| (header_row + idx + 1, row.iter().map(cell_value).collect()))
        .unzip();

    debug!(sheet = %sheet, columns = columns.len(), rows = body.len(), "worksheet read");
    Ok(TabularSource::new(columns, body).with_source_rows(source_rows))
}

/// Header cell text; blank header cells are named by position.
fn column_name(idx: usize, cell: &Data) -> String {
    let name = coerce(&cell_value(cell));
    if name.trim().is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        name
    }
}

/// Map a calamine cell onto the closed cell model.
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Missing,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::from(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                match dt.as_duration() {
                    Some(d) => CellValue::Text(d.to_string()),
                    None => CellValue::Missing,
                }
            } else {
                dt.as_datetime().map(CellValue::Timestamp).unwrap_or(CellValue::Missing)
            }
        }
        Data::DateTimeIso(s) => parse_iso(s).map(CellValue::Timestamp).unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
}
