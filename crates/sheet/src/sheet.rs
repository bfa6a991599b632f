use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::collections::{HashMap, HashSet};

/// Options for cleaning a single sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanOptions {
    /// Remove the first data row (single-file path only)
    pub drop_first_row: bool,
    /// Remove rows that repeat an earlier row exactly
    pub drop_duplicates: bool,
    /// Remove rows where every cell is empty
    pub drop_empty_rows: bool,
}

impl CleanOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_drop_first_row(mut self, drop_first_row: bool) -> Self {
        self.drop_first_row = drop_first_row;
        self
    }

    #[must_use]
    pub fn with_drop_duplicates(mut self, drop_duplicates: bool) -> Self {
        self.drop_duplicates = drop_duplicates;
        self
    }

    #[must_use]
    pub fn with_drop_empty_rows(mut self, drop_empty_rows: bool) -> Self {
        self.drop_empty_rows = drop_empty_rows;
        self
    }
}

/// A table of named columns and row-major cells
///
/// Every row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    column_names: Vec<String>,
    data: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            column_names: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Create a sheet from column names and rows
    ///
    /// # Errors
    ///
    /// Returns `SheetError::DuplicateColumnName` for repeated names and
    /// `SheetError::LengthMismatch` when a row is not as wide as the header.
    pub fn from_columns<S, T>(columns: &[S], rows: Vec<Vec<T>>) -> Result<Self>
    where
        S: AsRef<str>,
        T: Into<CellValue>,
    {
        let column_names: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        let mut seen = HashSet::new();
        for name in &column_names {
            if !seen.insert(name.as_str()) {
                return Err(SheetError::DuplicateColumnName { name: name.clone() });
            }
        }

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() != column_names.len() {
                return Err(SheetError::LengthMismatch {
                    expected: column_names.len(),
                    actual: row.len(),
                });
            }
            data.push(row.into_iter().map(Into::into).collect());
        }

        Ok(Sheet {
            name: "Sheet1".to_string(),
            column_names,
            data,
        })
    }

    /// Build a sheet whose invariants the caller already upholds
    pub(crate) fn from_parts(name: &str, column_names: Vec<String>, data: Vec<Vec<CellValue>>) -> Self {
        debug_assert!(data.iter().all(|row| row.len() == column_names.len()));
        Sheet {
            name: name.to_string(),
            column_names,
            data,
        }
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of data rows (the header is not counted)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.column_names.len()
    }

    /// Check if the sheet has no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get column names in order
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Get a cell by row and column index
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.data
            .get(row)
            .ok_or(SheetError::RowIndexOutOfBounds {
                index: row,
                count: self.row_count(),
            })?
            .get(col)
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: format!("index {col}"),
            })
    }

    /// Get a cell by row index and column name
    pub fn get_by_name(&self, row: usize, col_name: &str) -> Result<&CellValue> {
        let col = self
            .column_names
            .iter()
            .position(|c| c == col_name)
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: col_name.to_string(),
            })?;
        self.get(row, col)
    }

    /// Get a row by index
    pub fn row(&self, index: usize) -> Result<&Vec<CellValue>> {
        self.data.get(index).ok_or(SheetError::RowIndexOutOfBounds {
            index,
            count: self.row_count(),
        })
    }

    /// Iterate over data rows
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Get all data rows
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    // ===== Cleaning =====

    /// Delete a row by index, returning its cells
    pub fn row_delete(&mut self, index: usize) -> Result<Vec<CellValue>> {
        if index >= self.data.len() {
            return Err(SheetError::RowIndexOutOfBounds {
                index,
                count: self.data.len(),
            });
        }
        Ok(self.data.remove(index))
    }

    /// Remove the first data row. Returns `true` if a row was removed.
    pub fn remove_first_row(&mut self) -> bool {
        self.row_delete(0).is_ok()
    }

    /// Remove rows that exactly repeat an earlier row, keeping the first one.
    /// Returns the number of rows removed.
    pub fn remove_duplicates(&mut self) -> usize {
        let before = self.data.len();
        let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(before);
        self.data
            .retain(|row| seen.insert(row.iter().map(CellValue::key).collect()));
        before - self.data.len()
    }

    /// Remove rows where every cell is the empty marker.
    /// Returns the number of rows removed.
    pub fn remove_empty_rows(&mut self) -> usize {
        let before = self.data.len();
        self.data.retain(|row| !row.iter().all(CellValue::is_null));
        before - self.data.len()
    }

    /// Replace the column names with the first row's values and drop that row
    ///
    /// Empty names become `Unnamed: <index>` and repeats get a `.1`, `.2` suffix.
    pub fn promote_first_row_to_header(&mut self) -> Result<()> {
        if self.data.is_empty() {
            return Err(SheetError::MissingHeaderRow {
                name: self.name.clone(),
            });
        }
        let header = self.data.remove(0);
        let raw: Vec<String> = header.iter().map(CellValue::as_str).collect();
        self.column_names = normalize_column_names(&raw);
        Ok(())
    }

    /// Apply the cleaning options in place
    ///
    /// The first row is removed before duplicates and empty rows are dropped.
    pub fn clean_in_place(&mut self, options: &CleanOptions) {
        if options.drop_first_row && self.remove_first_row() {
            tracing::debug!(sheet = %self.name, "removed first row");
        }
        if options.drop_duplicates {
            let removed = self.remove_duplicates();
            tracing::debug!(sheet = %self.name, removed, "removed duplicate rows");
        }
        if options.drop_empty_rows {
            let removed = self.remove_empty_rows();
            tracing::debug!(sheet = %self.name, removed, "removed empty rows");
        }
    }
}

/// Return a cleaned copy of `sheet`, leaving the input untouched
#[must_use]
pub fn clean(sheet: &Sheet, options: &CleanOptions) -> Sheet {
    let mut cleaned = sheet.clone();
    cleaned.clean_in_place(options);
    cleaned
}

/// Make header names non-empty and unique
pub(crate) fn normalize_column_names(raw: &[String]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (i, name) in raw.iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.clone()
        };

        let mut candidate = base.clone();
        while taken.contains(&candidate) {
            let n = counts.entry(base.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{base}.{n}");
        }
        taken.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sheet {
        Sheet::from_columns(
            &["id", "name"],
            vec![
                vec![CellValue::Int(1), CellValue::from("Alice")],
                vec![CellValue::Int(1), CellValue::from("Alice")],
                vec![CellValue::Null, CellValue::Null],
                vec![CellValue::Int(2), CellValue::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_sheet() {
        let sheet = Sheet::new();
        assert_eq!(sheet.name(), "Sheet1");
        assert!(sheet.is_empty());
        assert_eq!(sheet.col_count(), 0);
    }

    #[test]
    fn test_from_columns_rejects_ragged_rows() {
        let result = Sheet::from_columns(&["a", "b"], vec![vec![1]]);
        assert!(matches!(
            result,
            Err(SheetError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_from_columns_rejects_duplicate_names() {
        let result = Sheet::from_columns(&["a", "a"], Vec::<Vec<i64>>::new());
        assert!(matches!(result, Err(SheetError::DuplicateColumnName { .. })));
    }

    #[test]
    fn test_remove_duplicates() {
        let mut sheet = sample();
        assert_eq!(sheet.remove_duplicates(), 1);
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.get_by_name(0, "name").unwrap().as_str(), "Alice");
    }

    #[test]
    fn test_remove_empty_rows_keeps_partial_rows() {
        let mut sheet = sample();
        assert_eq!(sheet.remove_empty_rows(), 1);
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.get(2, 0).unwrap(), &CellValue::Int(2));
    }

    #[test]
    fn test_clean_is_pure() {
        let sheet = sample();
        let options = CleanOptions::new()
            .with_drop_duplicates(true)
            .with_drop_empty_rows(true);
        let cleaned = clean(&sheet, &options);
        assert_eq!(sheet.row_count(), 4);
        assert_eq!(cleaned.row_count(), 2);
    }

    #[test]
    fn test_drop_first_row_runs_before_dedup() {
        let sheet = sample();
        let options = CleanOptions::new()
            .with_drop_first_row(true)
            .with_drop_duplicates(true);
        let cleaned = clean(&sheet, &options);
        // The second Alice row survives once the first one is gone
        assert_eq!(cleaned.row_count(), 3);
        assert_eq!(cleaned.get(0, 0).unwrap(), &CellValue::Int(1));
    }

    #[test]
    fn test_remove_first_row_on_empty_sheet() {
        let mut sheet = Sheet::new();
        assert!(!sheet.remove_first_row());
    }

    #[test]
    fn test_promote_first_row_to_header() {
        let mut sheet = Sheet::from_columns(
            &["0", "1"],
            vec![vec!["x", "y"], vec!["1", "2"]],
        )
        .unwrap();
        sheet.promote_first_row_to_header().unwrap();
        assert_eq!(sheet.column_names(), ["x", "y"]);
        assert_eq!(sheet.row_count(), 1);
    }

    #[test]
    fn test_promote_on_empty_sheet_fails() {
        let mut sheet = Sheet::with_name("empty");
        let err = sheet.promote_first_row_to_header().unwrap_err();
        assert!(matches!(err, SheetError::MissingHeaderRow { name } if name == "empty"));
    }

    #[test]
    fn test_normalize_column_names() {
        let raw: Vec<String> = ["a", "", "a", "a", "a.1"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        assert_eq!(
            normalize_column_names(&raw),
            ["a", "Unnamed: 1", "a.1", "a.2", "a.1.1"]
        );
    }
}
