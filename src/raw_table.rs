use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Deserialize;

use crate::error::SchemaError;

/// Untyped table as delivered by the scraper: one header row, string cells.
///
/// Cells are kept verbatim; blank cells read back as missing through
/// [`RawTable::cell`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.trim() == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, SchemaError> {
        self.column_index(name)
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
    }

    /// Appends a row; short rows are padded with blanks, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// Appends a row given as `(column, value)` pairs. Unknown columns are ignored.
    pub fn push_record(&mut self, record: &[(&str, &str)]) {
        let mut row = vec![String::new(); self.columns.len()];
        for (name, value) in record {
            if let Some(idx) = self.column_index(name) {
                row[idx] = (*value).to_string();
            }
        }
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        let raw = self.rows.get(row)?.get(col)?.trim();
        if raw.is_empty() { None } else { Some(raw) }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> + '_ {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Rewrites every non-blank cell of `column` found in `mapping`.
    pub fn map_column(&mut self, column: &str, mapping: &HashMap<String, String>) -> usize {
        let Some(idx) = self.column_index(column) else {
            return 0;
        };
        let mut changed = 0usize;
        for row in &mut self.rows {
            let Some(cell) = row.get_mut(idx) else {
                continue;
            };
            if let Some(canonical) = mapping.get(cell.trim()) {
                *cell = canonical.clone();
                changed += 1;
            }
        }
        changed
    }

    /// Renames headers found in `mapping`. A rename onto a header that is
    /// already present is skipped. Returns the number of renamed columns.
    pub fn rename_columns(&mut self, mapping: &HashMap<String, String>) -> usize {
        let mut renamed = 0usize;
        for idx in 0..self.columns.len() {
            let Some(target) = mapping.get(self.columns[idx].trim()) else {
                continue;
            };
            if self.column_index(target).is_some() {
                continue;
            }
            self.columns[idx] = target.clone();
            renamed += 1;
        }
        renamed
    }

    /// Distinct non-blank values of a column, sorted.
    pub fn distinct(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        let mut out = (0..self.rows.len())
            .filter_map(|row| self.cell(row, idx))
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        out.sort();
        out.dedup();
        out
    }
}

#[derive(Debug, Default, Deserialize)]
struct ColumnMappingFile {
    #[serde(rename = "Columns", default)]
    columns: HashMap<String, String>,
}

/// Reads `{"Columns": {scraped header: canonical header}}`.
pub fn load_column_mapping(path: &Path) -> Result<HashMap<String, String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read column mapping {}", path.display()))?;
    let parsed: ColumnMappingFile =
        serde_json::from_str(&raw).context("invalid column mapping json")?;
    Ok(parsed.columns)
}

pub fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open raw table {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("read headers of {}", path.display()))?
        .clone();

    let mut table = RawTable::new(headers.iter());
    for (idx, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("decode row {idx} of {}", path.display()))?;
        table.push_row(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(table)
}

pub fn write_csv(path: &Path, columns: &[String], rows: &[Vec<String>]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = WriterBuilder::new()
            .from_path(&tmp)
            .with_context(|| format!("create {}", tmp.display()))?;
        writer.write_record(columns).context("write csv header")?;
        for (idx, row) in rows.iter().enumerate() {
            writer
                .write_record(row)
                .with_context(|| format!("write csv row {idx}"))?;
        }
        writer.flush().context("flush csv writer")?;
    }
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}
