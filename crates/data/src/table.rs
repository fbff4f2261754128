use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};

use crate::error::DataError;

/// A CSV file held as trimmed strings, with line numbers kept for error reports.
#[derive(Clone, Debug)]
pub struct RawTable {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

#[derive(Clone, Debug)]
pub struct RawRow {
    pub line: u64,
    pub cells: Vec<String>,
}

impl RawTable {
    pub fn read(path: &Path) -> Result<Self, DataError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_path(path)
            .map_err(|error| DataError::csv(path, error))?;
        let headers = reader
            .headers()
            .map_err(|error| DataError::csv(path, error))?
            .iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|error| DataError::csv(path, error))?;
            let line = record.position().map(|position| position.line()).unwrap_or_default();
            rows.push(RawRow { line, cells: record.iter().map(str::to_owned).collect() });
        }

        Ok(Self { path: path.to_path_buf(), headers, rows })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn column(&self, name: &str) -> Result<usize, DataError> {
        self.headers.iter().position(|header| header == name).ok_or_else(|| {
            DataError::MissingColumn { path: self.path.clone(), column: name.to_owned() }
        })
    }

    /// True when every cell of the column parses as a finite number.
    pub fn is_numeric(&self, index: usize) -> bool {
        self.rows.iter().all(|row| parse_finite(&row.cells[index]).is_some())
    }

    pub fn number(&self, row: &RawRow, index: usize) -> Result<f64, DataError> {
        parse_finite(&row.cells[index]).ok_or_else(|| self.invalid(row, index, "a number"))
    }

    /// Whole month number in `1..=12`; `6.0` is accepted as `6`.
    pub fn month(&self, row: &RawRow, index: usize) -> Result<u32, DataError> {
        match parse_finite(&row.cells[index]) {
            Some(value) if value.fract() == 0.0 && (1.0..=12.0).contains(&value) => {
                Ok(value as u32)
            }
            _ => Err(self.invalid(row, index, "a month between 1 and 12")),
        }
    }

    fn invalid(&self, row: &RawRow, index: usize, expected: &str) -> DataError {
        DataError::InvalidRow {
            path: self.path.clone(),
            line: row.line,
            detail: format!(
                "column `{}` value `{}` is not {expected}",
                self.headers[index], row.cells[index]
            ),
        }
    }
}

pub fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}
