// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Result CSV writers (§6 "External interfaces"): a per-timestep results
//! table, a static (non-timeseries) summary table and a totals summary,
//! written with the same column set and row order every run so that
//! downstream tooling can diff output files directly.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{HemError, HemResult};
use crate::units::fround6;

fn format_value(v: f64) -> String {
    let rounded = fround6(v);
    if rounded == rounded.trunc() && rounded.abs() < 1e15 {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{rounded}");
        s
    }
}

fn io_err(context: &str, e: std::io::Error) -> HemError {
    HemError::config(format!("{context}: {e}"))
}

/// A results table built up one timestep at a time, with a fixed column
/// order taken from the first row written (§6: every row carries the same
/// columns, in the same order, no matter which end-users are active).
pub struct ResultsTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl ResultsTable {
    pub fn new(columns: Vec<String>) -> Self {
        ResultsTable {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, values: &IndexMap<String, f64>) -> HemResult<()> {
        let mut row = Vec::with_capacity(self.columns.len());
        for col in &self.columns {
            let value = values.get(col).copied().ok_or_else(|| {
                HemError::config(format!("results table: missing column '{col}' in row"))
            })?;
            row.push(value);
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> HemResult<()> {
        let file = File::create(path.as_ref()).map_err(|e| io_err("creating results CSV", e))?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{}", self.columns.join(","))
            .map_err(|e| io_err("writing CSV header", e))?;
        for row in &self.rows {
            let line = row
                .iter()
                .map(|v| format_value(*v))
                .collect::<Vec<_>>()
                .join(",");
            writeln!(writer, "{line}").map_err(|e| io_err("writing CSV row", e))?;
        }
        Ok(())
    }
}

/// Writes the three output files described in §6: the per-timestep table,
/// a copy restricted to non-timeseries (static/summary) rows, and an
/// aggregate-totals table.
pub struct OutputWriter {
    pub output_stem: String,
}

impl OutputWriter {
    pub fn new(output_stem: impl Into<String>) -> Self {
        OutputWriter {
            output_stem: output_stem.into(),
        }
    }

    pub fn results_path(&self) -> String {
        format!("{}__results.csv", self.output_stem)
    }

    pub fn static_results_path(&self) -> String {
        format!("{}__results_static.csv", self.output_stem)
    }

    pub fn summary_path(&self) -> String {
        format!("{}__results_summary.csv", self.output_stem)
    }

    pub fn heat_balance_path(&self, zone_name: &str) -> String {
        format!("{}__heat_balance__{}.csv", self.output_stem, zone_name)
    }

    pub fn write_results(&self, table: &ResultsTable) -> HemResult<()> {
        table.write_csv(self.results_path())
    }

    pub fn write_static_results(&self, table: &ResultsTable) -> HemResult<()> {
        table.write_csv(self.static_results_path())
    }

    /// Writes a two-column (`name,value`) totals summary: per-fuel import,
    /// export and generation totals, end-use demand totals.
    pub fn write_summary(&self, totals: &IndexMap<String, f64>) -> HemResult<()> {
        let file =
            File::create(self.summary_path()).map_err(|e| io_err("creating summary CSV", e))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "name,value").map_err(|e| io_err("writing summary header", e))?;
        for (name, value) in totals {
            writeln!(writer, "{name},{}", format_value(*value))
                .map_err(|e| io_err("writing summary row", e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_value_drops_trailing_zero_for_whole_numbers() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(0.0), "0");
    }

    #[test]
    fn format_value_keeps_fractional_digits() {
        assert_eq!(format_value(3.5), "3.5");
    }

    #[test]
    fn push_row_errors_on_missing_column() {
        let mut table = ResultsTable::new(vec!["a".into(), "b".into()]);
        let mut row = IndexMap::new();
        row.insert("a".to_string(), 1.0);
        assert!(table.push_row(&row).is_err());
    }

    #[test]
    fn push_row_succeeds_with_all_columns_present() {
        let mut table = ResultsTable::new(vec!["a".into(), "b".into()]);
        let mut row = IndexMap::new();
        row.insert("a".to_string(), 1.0);
        row.insert("b".to_string(), 2.0);
        assert!(table.push_row(&row).is_ok());
    }
}
