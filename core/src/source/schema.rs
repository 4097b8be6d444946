// ## 📂 File: `src/source/schema.rs`

//! source/schema.rs
//! Optional column contract applied between reading and tree building.
//!
//! A profile lists required columns with a declared type. Undeclared columns
//! pass through untouched; declared ones are converted in place.

use serde::{Deserialize, Serialize};

use super::coerce::coerce_to;
use super::types::{CellValue, ColumnType, TabularSource};
use crate::types::ConvertError;

fn default_nullable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: ColumnType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnType) -> Self {
        Self { name: name.into(), kind, nullable: true }
    }

    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaProfile {
    pub columns: Vec<ColumnSpec>,
}

impl SchemaProfile {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// Every declared column absent from `source`, in declaration order.
    pub fn missing_columns(&self, source: &TabularSource) -> Vec<String> {
        self.columns
            .iter()
            .filter(|spec| source.column_index(&spec.name).is_none())
            .map(|spec| spec.name.clone())
            .collect()
    }

    /// Check presence of all declared columns, then convert their cells.
    ///
    /// Row numbers in errors are worksheet rows (header is row 1).
    pub fn apply(&self, mut source: TabularSource) -> Result<TabularSource, ConvertError> {
        let missing = self.missing_columns(&source);
        if !missing.is_empty() {
            return Err(ConvertError::SchemaMismatch { missing });
        }

        for spec in &self.columns {
            let Some(col) = source.column_index(&spec.name) else { continue };
            for i in 0..source.rows.len() {
                let row_number = source.source_row(i);
                let cell = &mut source.rows[i][col];
                if cell.is_missing() && !spec.nullable {
                    return Err(ConvertError::TypeCoercion {
                        column: spec.name.clone(),
                        row: row_number,
                        expected: spec.kind,
                        found: String::new(),
                    });
                }
                let converted = coerce_to(cell, spec.kind).map_err(|m| ConvertError::TypeCoercion {
                    column: spec.name.clone(),
                    row: row_number,
                    expected: m.expected,
                    found: m.found,
                })?;
                *cell = converted;
            }
        }
        Ok(source)
    }
}
