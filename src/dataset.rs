//! In-memory view of the benchmark results CSV.

use std::cmp::Ordering;
use std::fmt;
use std::io;
use std::path::Path;

/// Errors raised while loading or reshaping an [`InstanceTable`].
#[derive(Debug)]
pub enum DatasetError {
    /// The CSV source could not be read or parsed.
    Csv(csv::Error),
    /// A column referenced by name does not exist.
    MissingColumn(String),
    /// A cell that must be numeric could not be parsed.
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
    /// A replacement column did not provide one value per row.
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "Failed to read CSV data: {err}"),
            Self::MissingColumn(column) => write!(f, "Column '{column}' not found"),
            Self::NonNumeric { column, row, value } => write!(
                f,
                "Column '{}' has non-numeric value '{}' in row {}",
                column, value, row
            ),
            Self::LengthMismatch {
                column,
                expected,
                actual,
            } => write!(
                f,
                "Column '{}' needs {} values but {} were supplied",
                column, expected, actual
            ),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::MissingColumn(_) | Self::NonNumeric { .. } | Self::LengthMismatch { .. } => None,
        }
    }
}

/// Direction used by [`InstanceTable::sort_by_numeric`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A headered table of string cells.
///
/// Leading whitespace is stripped from every header and cell on load. All sorts are
/// stable, so rows that compare equal keep their relative order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstanceTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl InstanceTable {
    /// Builds a table from already split cells.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Loads the CSV file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path.as_ref())?;
        Self::from_csv(reader)
    }

    /// Loads CSV data from any reader.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, DatasetError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self, DatasetError> {
        let headers = reader
            .headers()?
            .iter()
            .map(|field| field.trim_start().to_owned())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| field.trim_start().to_owned())
                    .collect(),
            );
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    fn require_column(&self, name: &str) -> Result<usize, DatasetError> {
        self.column_index(name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_owned()))
    }

    /// Cell at `row` in column `column`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(index))
            .map(String::as_str)
    }

    /// All cells of column `name` in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>, DatasetError> {
        let index = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| cell(row, index)).collect())
    }

    /// Parses every cell of `name` as a number. Empty cells become `None`.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>, DatasetError> {
        let index = self.require_column(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let raw = cell(cells, index);
                if raw.trim().is_empty() {
                    return Ok(None);
                }
                parse_number(raw)
                    .map(Some)
                    .ok_or_else(|| DatasetError::NonNumeric {
                        column: name.to_owned(),
                        row,
                        value: raw.to_owned(),
                    })
            })
            .collect()
    }

    /// Sorts rows by the numeric value of `column`. Empty cells go last in either order.
    pub fn sort_by_numeric(&mut self, column: &str, order: SortOrder) -> Result<(), DatasetError> {
        let keys = self.numeric_column(column)?;
        self.reorder_by(|a, b| match (keys[a], keys[b]) {
            (Some(x), Some(y)) => match order {
                SortOrder::Ascending => x.total_cmp(&y),
                SortOrder::Descending => y.total_cmp(&x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        Ok(())
    }

    /// Sorts rows ascending over several columns, left to right.
    ///
    /// Two cells compare numerically when both parse as numbers and textually otherwise.
    pub fn sort_by_columns(&mut self, columns: &[&str]) -> Result<(), DatasetError> {
        let indices = columns
            .iter()
            .map(|name| self.require_column(name))
            .collect::<Result<Vec<_>, _>>()?;
        let rows = &self.rows;
        let order = stable_order(rows.len(), |a, b| {
            indices
                .iter()
                .map(|&index| compare_cells(cell(&rows[a], index), cell(&rows[b], index)))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        self.apply_order(order);
        Ok(())
    }

    /// Sorts rows ascending by the text of `column`.
    pub fn sort_by_text(&mut self, column: &str) -> Result<(), DatasetError> {
        let index = self.require_column(column)?;
        self.rows.sort_by(|a, b| cell(a, index).cmp(cell(b, index)));
        Ok(())
    }

    /// Adds column `name`, or replaces its cells when it already exists.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<(), DatasetError> {
        if values.len() != self.rows.len() {
            return Err(DatasetError::LengthMismatch {
                column: name.to_owned(),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }

        match self.column_index(name) {
            Some(index) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    if row.len() <= index {
                        row.resize(index + 1, String::new());
                    }
                    row[index] = value;
                }
            }
            None => {
                let width = self.headers.len();
                self.headers.push(name.to_owned());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.resize(width, String::new());
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// A new table holding only `columns`, in the given order.
    pub fn project(&self, columns: &[&str]) -> Result<InstanceTable, DatasetError> {
        let indices = columns
            .iter()
            .map(|name| self.require_column(name))
            .collect::<Result<Vec<_>, _>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|&index| cell(row, index).to_owned())
                    .collect()
            })
            .collect();
        Ok(InstanceTable {
            headers: columns.iter().map(|name| (*name).to_owned()).collect(),
            rows,
        })
    }

    fn reorder_by<F>(&mut self, compare: F)
    where
        F: Fn(usize, usize) -> Ordering,
    {
        let order = stable_order(self.rows.len(), compare);
        self.apply_order(order);
    }

    fn apply_order(&mut self, order: Vec<usize>) {
        let mut taken: Vec<Option<Vec<String>>> =
            std::mem::take(&mut self.rows).into_iter().map(Some).collect();
        self.rows = order
            .into_iter()
            .filter_map(|index| taken[index].take())
            .collect();
    }
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

fn stable_order<F>(len: usize, compare: F) -> Vec<usize>
where
    F: Fn(usize, usize) -> Ordering,
{
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by(|&a, &b| compare(a, b));
    order
}

fn compare_cells(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    }
}

/// Parses a cell as a finite or infinite float, ignoring surrounding whitespace.
pub fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|number| !number.is_nan())
}
