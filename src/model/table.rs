//! Table types.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A table of string cells with named columns.
///
/// Every row has exactly one cell per column. Columns are the union of the
/// keys seen across the source records, in first-seen order; missing cells
/// are stored as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    /// Column names in display order
    columns: Vec<String>,

    /// Cells, row-major; each row has `columns.len()` entries
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Create an empty table with the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        let mut table = Self::default();
        for column in columns {
            table.ensure_column(&column.into());
        }
        table
    }

    /// Build a table from records of column-name → value pairs.
    ///
    /// Records may disagree on their keys; the table pads the gaps.
    pub fn from_records<I, R, K, V>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::default();
        for record in records {
            table.push_record(record);
        }
        table
    }

    /// Build a table whose first row is the header.
    pub fn from_grid<R, S>(grid: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rows = grid.into_iter();
        let header: Vec<String> = match rows.next() {
            Some(row) => row.into_iter().map(Into::<String>::into).collect(),
            None => return Self::default(),
        };

        let mut table = Self::default();
        let names: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let name = name.trim();
                if name.is_empty() {
                    format!("column_{}", i + 1)
                } else {
                    name.to_string()
                }
            })
            .collect();
        for name in &names {
            table.ensure_column(name);
        }

        for row in rows {
            let record = row.into_iter().map(Into::<String>::into).enumerate().map(|(i, cell)| {
                let key = names
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("column_{}", i + 1));
                (key, cell)
            });
            table.push_record(record);
        }
        table
    }

    /// Parse a pipe-delimited table: `a | b` per line, first line is the
    /// header. Markdown separator lines (`---|---`) are skipped.
    pub fn from_pipe_text(text: &str) -> Option<Self> {
        let lines: Vec<Vec<String>> = text
            .lines()
            .map(str::trim)
            .filter(|line| line.contains('|'))
            .filter(|line| !is_separator_line(line))
            .map(|line| {
                line.trim_matches('|')
                    .split('|')
                    .map(|cell| cell.trim().to_string())
                    .collect()
            })
            .collect();

        if lines.len() < 2 {
            return None;
        }
        Some(Self::from_grid(lines))
    }

    /// Append one record, adding any unseen columns.
    pub fn push_record<K, V>(&mut self, record: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = vec![String::new(); self.columns.len()];
        for (key, value) in record {
            let key = key.into();
            let idx = self.ensure_column(&key);
            if idx >= row.len() {
                row.resize(idx + 1, String::new());
            }
            row[idx] = value.into();
        }
        self.rows.push(row);
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.columns.len() - 1
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Borrow one row.
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Raw cell grid, row-major.
    pub fn cells(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Plain text: header then rows, cells joined with ` | `.
    pub fn plain_text(&self) -> String {
        std::iter::once(self.columns.join(" | "))
            .chain(self.rows.iter().map(|r| r.join(" | ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn is_separator_line(line: &str) -> bool {
    line.chars()
        .all(|c| matches!(c, '|' | '-' | ':' | ' ' | '+'))
}

/// A borrowed table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Cell value by column name.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.cells.get(idx).map(String::as_str)
    }

    /// Cells in column order.
    pub fn cells(&self) -> &'a [String] {
        self.cells
    }

    /// (column, value) pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(String::as_str))
    }
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Serializes as an array of row objects, keys in column order.
impl Serialize for ResultTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in self.rows() {
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}
