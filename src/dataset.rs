//! # Opponent Dataset
//!
//! The `OpponentTable` holds the recorded field of opposing allocations,
//! one row per opponent. It is built once, validated, and then only read.
//!
//! Tables are usually loaded from a delimited text export of the score
//! sheet. A [`TableLayout`] selects the window of the sheet that holds the
//! allocations: header rows to skip, the first column of the allocation
//! block, its width and (optionally) the exact number of opponent rows.
//!
//! ## Example
//!
//! ```rust
//! use blotto::dataset::{OpponentTable, TableLayout};
//!
//! let text = "\
//! name,a,b,c
//! first,10,20,70
//! second,30,30,40
//! ";
//! let layout = TableLayout::new(3).with_skip_rows(1).with_first_column(1);
//! let table = OpponentTable::parse_str(text, &layout).unwrap();
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.row(1), &[30, 30, 40]);
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::{
    allocation::{FRONTS, TOTAL},
    error::{BlottoError, Result},
    scoring::{self, Tally},
};

/// Describes where the allocation block sits in a delimited text table.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    /// Number of leading non-blank lines (headers) to skip.
    skip_rows: usize,
    /// Zero-based index of the first allocation column.
    first_column: usize,
    /// Number of allocation columns.
    columns: usize,
    /// Exact number of opponent rows to read, if known. Rows past this
    /// window are ignored.
    rows: Option<usize>,
    /// If set, every row must sum to this many units.
    expected_total: Option<u32>,
}

impl TableLayout {
    /// A layout reading `columns` cells from the start of every line.
    pub fn new(columns: usize) -> Self {
        Self {
            skip_rows: 0,
            first_column: 0,
            columns,
            rows: None,
            expected_total: None,
        }
    }

    /// Layout of the recorded Blotto score sheet: one header line, the ten
    /// allocation columns starting at the seventh column, 78 opponents.
    pub fn blotto_scores() -> Self {
        Self {
            skip_rows: 1,
            first_column: 6,
            columns: FRONTS,
            rows: Some(78),
            expected_total: None,
        }
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    pub fn with_first_column(mut self, first_column: usize) -> Self {
        self.first_column = first_column;
        self
    }

    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Requires every row to sum to `TOTAL` units.
    pub fn with_fixed_total(mut self) -> Self {
        self.expected_total = Some(TOTAL);
        self
    }

    pub fn with_expected_total(mut self, total: u32) -> Self {
        self.expected_total = Some(total);
        self
    }

    pub fn get_columns(&self) -> usize {
        self.columns
    }

    pub fn get_rows(&self) -> Option<usize> {
        self.rows
    }
}

impl Default for TableLayout {
    fn default() -> Self {
        Self::new(FRONTS)
    }
}

/// Immutable, row-major table of opponent allocations.
///
/// With the `serde` feature the table (de)serializes as a list of rows, and
/// deserialization goes through [`OpponentTable::from_rows`].
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<Vec<u32>>", into = "Vec<Vec<u32>>")
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentTable {
    columns: usize,
    cells: Vec<u32>,
}

impl OpponentTable {
    /// Builds a table from rows of equal, non-zero width.
    ///
    /// # Errors
    ///
    /// Returns `BlottoError::InvalidTable` if there are no rows, a row is
    /// empty, or the rows differ in width.
    pub fn from_rows<R>(rows: impl IntoIterator<Item = R>) -> Result<Self>
    where
        R: AsRef<[u32]>,
    {
        let mut columns = None;
        let mut cells = Vec::new();

        for (i, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();
            match columns {
                None if row.is_empty() => {
                    return Err(BlottoError::InvalidTable(
                        "Opponent rows must contain at least one front".to_string(),
                    ))
                }
                None => columns = Some(row.len()),
                Some(width) if width != row.len() => {
                    return Err(BlottoError::InvalidTable(format!(
                        "Row {} has {} fronts, expected {}",
                        i,
                        row.len(),
                        width
                    )))
                }
                Some(_) => {}
            }
            cells.extend_from_slice(row);
        }

        let columns = columns.ok_or_else(|| {
            BlottoError::InvalidTable("Opponent table must contain at least one row".to_string())
        })?;

        Ok(Self { columns, cells })
    }

    /// Parses a delimited text table.
    ///
    /// Cells are separated by commas, semicolons, tabs or runs of whitespace.
    /// Blank lines are ignored.
    pub fn parse_str(text: &str, layout: &TableLayout) -> Result<Self> {
        Self::from_reader(text.as_bytes(), layout)
    }

    /// Loads a delimited text table from a file.
    pub fn from_path(path: impl AsRef<Path>, layout: &TableLayout) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let table = Self::from_reader(BufReader::new(file), layout)?;
        debug!(
            path = %path.display(),
            rows = table.len(),
            columns = table.columns(),
            "Loaded opponent table"
        );
        Ok(table)
    }

    /// Reads a delimited text table from any buffered reader.
    pub fn from_reader<B: BufRead>(reader: B, layout: &TableLayout) -> Result<Self> {
        if layout.columns == 0 {
            return Err(BlottoError::Configuration(
                "Table layout must select at least one column".to_string(),
            ));
        }

        let mut rows: Vec<Vec<u32>> = Vec::new();
        let mut skipped = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;

            if line.trim().is_empty() {
                continue;
            }
            if skipped < layout.skip_rows {
                skipped += 1;
                continue;
            }
            if layout.rows.is_some_and(|wanted| rows.len() >= wanted) {
                break;
            }

            rows.push(parse_row(&line, line_number, layout)?);
        }

        if let Some(wanted) = layout.rows {
            if rows.len() != wanted {
                return Err(BlottoError::InvalidTable(format!(
                    "Expected {} opponent rows, found {}",
                    wanted,
                    rows.len()
                )));
            }
        }

        if let Some(total) = layout.expected_total {
            if let Some((i, row)) = rows
                .iter()
                .enumerate()
                .find(|(_, row)| row.iter().sum::<u32>() != total)
            {
                return Err(BlottoError::InvalidTable(format!(
                    "Opponent {} distributes {} units, expected {}",
                    i,
                    row.iter().sum::<u32>(),
                    total
                )));
            }
        }

        Self::from_rows(rows)
    }

    /// Number of opponents.
    pub fn len(&self) -> usize {
        self.cells.len() / self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of fronts per opponent.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns the allocation of opponent `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn row(&self, index: usize) -> &[u32] {
        &self.cells[index * self.columns..(index + 1) * self.columns]
    }

    /// Iterates over opponent allocations in table order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[u32]> + '_ {
        self.cells.chunks_exact(self.columns)
    }

    /// Scores an arbitrary allocation against the whole table.
    ///
    /// The allocation does not need to sum to any particular total, but it
    /// must have one entry per front.
    pub fn compare(&self, allocation: &[u32]) -> Result<f64> {
        self.check_width(allocation)?;
        Ok(scoring::evaluate(allocation, self))
    }

    /// Win/tie/loss breakdown of an allocation against the whole table.
    pub fn tally(&self, allocation: &[u32]) -> Result<Tally> {
        self.check_width(allocation)?;
        Ok(scoring::tally(allocation, self))
    }

    fn check_width(&self, allocation: &[u32]) -> Result<()> {
        if allocation.len() != self.columns {
            return Err(BlottoError::Configuration(format!(
                "Allocation has {} fronts, opponent table has {}",
                allocation.len(),
                self.columns
            )));
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<u32>>> for OpponentTable {
    type Error = BlottoError;

    fn try_from(rows: Vec<Vec<u32>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<OpponentTable> for Vec<Vec<u32>> {
    fn from(table: OpponentTable) -> Self {
        table.rows().map(<[u32]>::to_vec).collect()
    }
}

fn split_cells(line: &str) -> Vec<&str> {
    if line.contains(',') {
        line.split(',').collect()
    } else if line.contains(';') {
        line.split(';').collect()
    } else if line.contains('\t') {
        line.split('\t').collect()
    } else {
        line.split_whitespace().collect()
    }
}

fn parse_row(line: &str, line_number: usize, layout: &TableLayout) -> Result<Vec<u32>> {
    let cells = split_cells(line);
    (layout.first_column..layout.first_column + layout.columns)
        .map(|column| {
            let raw = cells.get(column).ok_or_else(|| BlottoError::Dataset {
                line: line_number,
                column: column + 1,
                message: format!("missing cell, line has {} cells", cells.len()),
            })?;
            let raw = raw.trim().trim_matches('"');
            raw.parse::<u32>().map_err(|_| BlottoError::Dataset {
                line: line_number,
                column: column + 1,
                message: format!("expected a non-negative integer, found `{}`", raw),
            })
        })
        .collect()
}
