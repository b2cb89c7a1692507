//! Tabulated observables on a redshift grid, and their JSON form.
//!
//! A `Table` is the portable representation of a `cosmo table` run:
//! - the cosmology that produced it (summary string + parameter set)
//! - the redshift grid
//! - one column per observable, with `null` where the value is undefined
//!
//! Callers wanting fast repeated evaluation interpolate on such a grid
//! instead of re-integrating.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cosmology::Cosmology;
use crate::domain::{Observable, ParameterSet};
use crate::error::AppError;

/// One observable sampled on the table's grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub observable: Observable,
    pub unit: String,
    /// `None` where the observable is undefined or failed at that redshift.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub tool: String,
    pub cosmology: String,
    pub parameters: ParameterSet,
    pub z: Vec<f64>,
    pub columns: Vec<Column>,
}

impl Table {
    /// Evaluate every observable on `z`.
    ///
    /// Per-cell failures become `None` and are logged at debug level; the
    /// count of failed cells is returned alongside the table.
    pub fn evaluate(cosmo: &Cosmology, z: Vec<f64>, observables: &[Observable]) -> (Self, usize) {
        let mut failed = 0;
        let columns = observables
            .iter()
            .map(|&observable| {
                let values = cosmo
                    .evaluate_each(observable, &z)
                    .into_iter()
                    .zip(&z)
                    .map(|(result, &zi)| match result {
                        Ok(v) => Some(v),
                        Err(err) => {
                            failed += 1;
                            tracing::debug!(observable = observable.name(), z = zi, %err, "undefined cell");
                            None
                        }
                    })
                    .collect();
                Column {
                    observable,
                    unit: observable.unit().to_string(),
                    values,
                }
            })
            .collect();

        let table = Self {
            tool: "cosmo".to_string(),
            cosmology: cosmo.to_string(),
            parameters: cosmo.params().clone(),
            z,
            columns,
        };
        (table, failed)
    }

    pub fn rows(&self) -> usize {
        self.z.len()
    }

    /// Cell `(row, column)`; `None` when undefined or out of range.
    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        self.columns.get(column)?.values.get(row).copied().flatten()
    }
}

/// Write a table as pretty-printed JSON.
pub fn write_table_json<W: Write>(writer: W, table: &Table) -> Result<(), AppError> {
    serde_json::to_writer_pretty(writer, table)
        .map_err(|e| AppError::new(4, format!("Failed to write table JSON: {e}")))
}

/// Write a table JSON file.
pub fn write_table_json_file(path: &Path, table: &Table) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create table JSON '{}': {e}", path.display())))?;
    write_table_json(file, table)
}
