use crate::cell::CellValue;
use crate::csv::CsvOptions;
use crate::error::{Result, SheetError};
use crate::export::{export_all, Artifact};
use crate::sheet::{CleanOptions, Sheet};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A named byte stream handed over by the upload widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Create an upload from a name and raw bytes
    pub fn new<N: Into<String>, B: Into<Vec<u8>>>(name: N, bytes: B) -> Self {
        Upload {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk as an upload named after the file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("upload.csv")
            .to_string();
        Ok(Upload { name, bytes })
    }

    /// Sheet name derived from the file name (without extension)
    #[must_use]
    pub fn sheet_name(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("Sheet")
    }
}

/// Options for merging the sheets of a book
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Use each sheet's first row as its column names before merging
    pub promote_first_row_to_header: bool,
    /// Remove duplicate rows from the merged sheet
    pub drop_duplicates: bool,
    /// Remove all-empty rows from the merged sheet
    pub drop_empty_rows: bool,
}

impl MergeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_header_promotion(mut self, promote: bool) -> Self {
        self.promote_first_row_to_header = promote;
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

    /// Cleaning applied to the merged sheet
    #[must_use]
    pub fn clean_options(&self) -> CleanOptions {
        CleanOptions::new()
            .with_drop_duplicates(self.drop_duplicates)
            .with_drop_empty_rows(self.drop_empty_rows)
    }
}

/// The uploaded sheets of one session, in upload order
#[derive(Debug, Clone, Default)]
pub struct Book {
    sheets: IndexMap<String, Sheet>,
}

impl Book {
    /// Create a new empty book
    #[must_use]
    pub fn new() -> Self {
        Book {
            sheets: IndexMap::new(),
        }
    }

    /// Get the number of sheets
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the book is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get all sheet names in order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Get a sheet by index (0-based)
    #[must_use]
    pub fn get_sheet_by_index(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get_index(index).map(|(_, sheet)| sheet)
    }

    /// Add a sheet, suffixing the name with `_1`, `_2`... if it is taken.
    /// Returns the name the sheet was stored under.
    pub fn add_sheet(&mut self, name: &str, mut sheet: Sheet) -> String {
        let final_name = get_unique_name(self, name);
        sheet.set_name(&final_name);
        self.sheets.insert(final_name.clone(), sheet);
        final_name
    }

    /// Iterate over sheets
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &Sheet)> {
        self.sheets.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Consume the book, returning its sheets in order
    #[must_use]
    pub fn into_sheets(self) -> Vec<Sheet> {
        self.sheets.into_values().collect()
    }

    // ===== Loading =====

    /// Load a batch of uploads, one sheet per upload.
    ///
    /// Every upload is parsed with ',' first. If any of them fails
    /// structurally, the whole batch is parsed again with ';'.
    /// Uploads that are not valid UTF-8 fail the batch without a retry.
    pub fn load(uploads: &[Upload]) -> Result<Self> {
        let texts = decode_uploads(uploads)?;

        match Self::parse_batch(&texts, &CsvOptions::default()) {
            Ok(book) => Ok(book),
            Err(err) if err.is_structural() => {
                tracing::warn!(error = %err, "comma parsing failed, retrying batch with ';'");
                Self::parse_batch(&texts, &CsvOptions::semicolon()).map_err(|retry_err| {
                    if retry_err.is_structural() {
                        SheetError::Delimiter {
                            comma: Box::new(err),
                            source: Box::new(retry_err),
                        }
                    } else {
                        retry_err
                    }
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Load a batch of uploads with fixed CSV options and no fallback
    pub fn load_with_options(uploads: &[Upload], options: &CsvOptions) -> Result<Self> {
        let texts = decode_uploads(uploads)?;
        Self::parse_batch(&texts, options)
    }

    fn parse_batch(texts: &[(&str, &str)], options: &CsvOptions) -> Result<Self> {
        let mut book = Book::new();
        for (name, text) in texts {
            let sheet = Sheet::read_csv(name, text.as_bytes(), options)?;
            book.add_sheet(name, sheet);
        }
        tracing::info!(
            sheets = book.sheet_count(),
            delimiter = %char::from(options.delimiter),
            "loaded uploads"
        );
        Ok(book)
    }

    // ===== Merging =====

    /// Merge all sheets into one by stacking rows vertically.
    ///
    /// Columns are the union of every sheet's columns in order of first
    /// appearance; cells missing from a sheet are filled with Null.
    pub fn merge(&self, promote_first_row_to_header: bool) -> Result<Sheet> {
        if self.is_empty() {
            return Err(SheetError::NoTables);
        }

        let mut sheets: Vec<Sheet> = self.sheets.values().cloned().collect();
        if promote_first_row_to_header {
            for sheet in &mut sheets {
                sheet.promote_first_row_to_header()?;
            }
        }

        check_shared_columns(&sheets)?;

        let mut all_columns: IndexSet<String> = IndexSet::new();
        for sheet in &sheets {
            for col in sheet.column_names() {
                all_columns.insert(col.clone());
            }
        }

        let total_rows = sheets.iter().map(Sheet::row_count).sum();
        let mut data: Vec<Vec<CellValue>> = Vec::with_capacity(total_rows);

        for sheet in &sheets {
            let col_idx: HashMap<&str, usize> = sheet
                .column_names()
                .iter()
                .enumerate()
                .map(|(i, n)| (n.as_str(), i))
                .collect();

            for row in sheet.rows() {
                let new_row = all_columns
                    .iter()
                    .map(|col_name| {
                        col_idx
                            .get(col_name.as_str())
                            .and_then(|&idx| row.get(idx).cloned())
                            .unwrap_or(CellValue::Null)
                    })
                    .collect();
                data.push(new_row);
            }
        }

        tracing::info!(
            sheets = sheets.len(),
            rows = data.len(),
            cols = all_columns.len(),
            "merged sheets"
        );

        Ok(Sheet::from_parts(
            "merged",
            all_columns.into_iter().collect(),
            data,
        ))
    }

    /// Merge, then clean the merged sheet
    pub fn merge_with_options(&self, options: &MergeOptions) -> Result<Sheet> {
        let mut merged = self.merge(options.promote_first_row_to_header)?;
        merged.clean_in_place(&options.clean_options());
        Ok(merged)
    }

    // ===== Export =====

    /// One artifact per sheet, numbered from 1 in upload order
    pub fn artifacts(&self) -> Result<Vec<Artifact>> {
        export_all(self.sheets.values())
    }
}

/// Validate every upload as UTF-8 and strip a leading byte-order mark
fn decode_uploads(uploads: &[Upload]) -> Result<Vec<(&str, &str)>> {
    uploads
        .iter()
        .map(|upload| {
            let text = std::str::from_utf8(&upload.bytes).map_err(|e| SheetError::Encoding {
                name: upload.name.clone(),
                valid_up_to: e.valid_up_to(),
            })?;
            let text = text.strip_prefix('\u{feff}').unwrap_or(text);
            Ok((upload.sheet_name(), text))
        })
        .collect()
}

/// At least one column name must occur in two or more sheets
fn check_shared_columns(sheets: &[Sheet]) -> Result<()> {
    if sheets.len() < 2 {
        return Ok(());
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for sheet in sheets {
        // Names are unique within a sheet, so a repeat means a second sheet
        for col in sheet.column_names() {
            if !seen.insert(col.as_str()) {
                return Ok(());
            }
        }
    }

    Err(SheetError::NoSharedColumns {
        sheets: sheets.len(),
    })
}

/// Generate a unique sheet name by adding a suffix if needed
fn get_unique_name(book: &Book, base_name: &str) -> String {
    if !book.sheets.contains_key(base_name) {
        return base_name.to_string();
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{base_name}_{counter}");
        if !book.sheets.contains_key(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
