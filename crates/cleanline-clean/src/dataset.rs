//! In-memory table keyed by a unique index column
//!
//! Cells keep their original text, so columns the cleaner does not touch are
//! written back byte-for-byte. Only columns cast to [`ColumnType::Date`] hold
//! parsed values.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::date;
use crate::error::CleanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Date,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Date(Option<NaiveDateTime>),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Date(_) => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(d) => *d,
            Self::Text(_) => None,
        }
    }
}

/// Names of the columns the cleaner works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    pub index: String,
    pub price: String,
    pub last_review: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            index: "id".to_string(),
            price: "price".to_string(),
            last_review: "last_review".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    types: Vec<ColumnType>,
    /// Position of the index column in `headers`.
    index: usize,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Build a dataset from text rows, checking the index column exists and
    /// its values are unique.
    pub fn new(headers: Vec<String>, index_column: &str, rows: Vec<Vec<String>>) -> Result<Self> {
        let index = headers
            .iter()
            .position(|h| h == index_column)
            .ok_or_else(|| CleanError::MissingColumn(index_column.to_string()))?;

        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                anyhow::bail!(
                    "row {} has {} fields, header has {}",
                    i + 1,
                    row.len(),
                    headers.len()
                );
            }
            if let Some(first) = seen.insert(&row[index], i + 1) {
                return Err(CleanError::DuplicateId {
                    id: row[index].clone(),
                    first_row: first,
                    row: i + 1,
                }
                .into());
            }
        }

        let types = vec![ColumnType::Text; headers.len()];
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Cell::Text).collect())
            .collect();
        Ok(Self {
            headers,
            types,
            index,
            rows,
        })
    }

    /// Parse comma-delimited text with a header row.
    pub fn from_reader<R: Read>(reader: R, index_column: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let headers: Vec<String> = reader
            .headers()
            .context("reading CSV header")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("CSV row {}", i + 1))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::new(headers, index_column, rows)
    }

    pub fn read_csv(path: &Path, index_column: &str) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Self::from_reader(file, index_column)
            .with_context(|| format!("failed to load {}", path.display()))
    }

    /// Write as CSV: index column first, then the rest in their original order.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let order = self.output_order();
        let rendered: Vec<Option<Vec<String>>> = (0..self.headers.len())
            .map(|col| match self.types[col] {
                ColumnType::Date => Some(date::format_column(&self.date_values(col))),
                ColumnType::Text => None,
            })
            .collect();

        let mut writer = csv::Writer::from_writer(writer);
        writer
            .write_record(order.iter().map(|&c| self.headers[c].as_str()))
            .context("writing CSV header")?;
        for (r, row) in self.rows.iter().enumerate() {
            let record = order.iter().map(|&c| match (&row[c], &rendered[c]) {
                (Cell::Text(s), _) => s.as_str(),
                (Cell::Date(_), Some(col)) => col[r].as_str(),
                (Cell::Date(_), None) => "",
            });
            writer
                .write_record(record)
                .with_context(|| format!("writing CSV row {}", r + 1))?;
        }
        writer.flush().context("flushing CSV output")?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        self.to_writer(std::io::BufWriter::new(file))
            .with_context(|| format!("failed to write {}", path.display()))
    }

    fn output_order(&self) -> Vec<usize> {
        std::iter::once(self.index)
            .chain((0..self.headers.len()).filter(|&c| c != self.index))
            .collect()
    }

    fn date_values(&self, col: usize) -> Vec<Option<NaiveDateTime>> {
        self.rows.iter().map(|row| row[col].as_date()).collect()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn index_column(&self) -> &str {
        &self.headers[self.index]
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_position(name).map(|c| self.types[c])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Ids in row order.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(|row| row[self.index].as_text().unwrap_or_default())
    }

    /// Id of row `r`.
    pub fn id(&self, r: usize) -> &str {
        self.rows[r][self.index].as_text().unwrap_or_default()
    }

    /// Keep only the rows for which `keep` returns true, in order.
    pub(crate) fn select_rows(&self, keep: &[bool]) -> Self {
        let rows = self
            .rows
            .iter()
            .zip(keep)
            .filter(|(_, k)| **k)
            .map(|(row, _)| row.clone())
            .collect();
        Self {
            headers: self.headers.clone(),
            types: self.types.clone(),
            index: self.index,
            rows,
        }
    }

    /// Convert column `col` to dates in place. Returns (parsed, null) counts.
    pub(crate) fn cast_to_date(&mut self, col: usize) -> (usize, usize) {
        let (mut parsed, mut null) = (0, 0);
        for row in &mut self.rows {
            let value = match &row[col] {
                Cell::Text(s) => date::parse_date(s),
                Cell::Date(d) => *d,
            };
            if value.is_some() {
                parsed += 1;
            } else {
                null += 1;
            }
            row[col] = Cell::Date(value);
        }
        self.types[col] = ColumnType::Date;
        (parsed, null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(csv: &str) -> Result<Dataset> {
        Dataset::from_reader(csv.as_bytes(), "id")
    }

    fn render(ds: &Dataset) -> String {
        let mut out = Vec::new();
        ds.to_writer(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn reads_rows_in_order() {
        let ds = load("id,name,price\n3,c,10\n1,a,20\n2,b,30\n").unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.ids().collect::<Vec<_>>(), vec!["3", "1", "2"]);
        assert_eq!(ds.column_type("price"), Some(ColumnType::Text));
        assert_eq!(ds.index_column(), "id");
    }

    #[test]
    fn missing_index_column() {
        let err = load("name,price\na,1\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<CleanError>(),
            Some(&CleanError::MissingColumn("id".into()))
        );
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = load("id,price\n1,10\n2,20\n1,30\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<CleanError>(),
            Some(&CleanError::DuplicateId {
                id: "1".into(),
                first_row: 1,
                row: 3
            })
        );
    }

    #[test]
    fn ragged_rows_rejected() {
        assert!(load("id,price\n1,10,extra\n").is_err());
    }

    #[test]
    fn empty_body_is_empty_dataset() {
        let ds = load("id,price,last_review\n").unwrap();
        assert!(ds.is_empty());
        assert_eq!(render(&ds), "id,price,last_review\n");
    }

    #[test]
    fn text_cells_written_verbatim() {
        let input = "id,name,price\n1,\"Cozy, quiet room\",149.00\n2,Loft,80\n";
        let ds = load(input).unwrap();
        assert_eq!(render(&ds), input);
    }

    #[test]
    fn index_column_written_first() {
        let ds = load("name,id,price\na,1,10\nb,2,20\n").unwrap();
        assert_eq!(render(&ds), "id,name,price\n1,a,10\n2,b,20\n");
    }

    #[test]
    fn cast_counts_and_renders_dates() {
        let mut ds = load("id,last_review\n1,2019-05-21\n2,\n3,garbage\n").unwrap();
        let col = ds.column_position("last_review").unwrap();
        assert_eq!(ds.cast_to_date(col), (1, 2));
        assert_eq!(ds.column_type("last_review"), Some(ColumnType::Date));
        assert_eq!(render(&ds), "id,last_review\n1,2019-05-21\n2,\n3,\n");
    }

    #[test]
    fn fractional_timestamps_written_in_full() {
        let mut ds = load("id,last_review\n1,2019-05-21 14:30:05.250\n").unwrap();
        let col = ds.column_position("last_review").unwrap();
        ds.cast_to_date(col);
        let out = render(&ds);
        assert_eq!(out, "id,last_review\n1,2019-05-21 14:30:05.250\n");

        let mut reread = load(&out).unwrap();
        reread.cast_to_date(col);
        assert_eq!(reread, ds);
    }

    #[test]
    fn select_rows_preserves_order() {
        let ds = load("id,price\n1,10\n2,20\n3,30\n").unwrap();
        let picked = ds.select_rows(&[true, false, true]);
        assert_eq!(picked.ids().collect::<Vec<_>>(), vec!["1", "3"]);
        assert_eq!(picked.headers(), ds.headers());
    }

    #[test]
    fn write_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean_sample.csv");
        let ds = load("id,price\n1,10\n").unwrap();
        ds.write_csv(&path).unwrap();
        assert_eq!(Dataset::read_csv(&path, "id").unwrap(), ds);
    }
}
