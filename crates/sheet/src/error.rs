use thiserror::Error;

/// Errors that can occur while loading, cleaning, merging or exporting sheets
#[derive(Error, Debug)]
pub enum SheetError {
    #[error(
        "File '{name}' is not valid UTF-8 (invalid byte at offset {valid_up_to}). \
         Please ensure the CSV file uses UTF-8 encoding."
    )]
    Encoding { name: String, valid_up_to: usize },

    #[error("Error tokenizing '{name}': expected {expected} fields in line {line}, saw {found}")]
    Structure {
        name: String,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Could not parse the upload with ',' ({comma}) or with ';' ({source})")]
    Delimiter {
        /// Error from the comma pass
        comma: Box<SheetError>,
        /// Error from the semicolon retry
        #[source]
        source: Box<SheetError>,
    },

    #[error("No columns to parse from '{name}'")]
    EmptyData { name: String },

    #[error("The {sheets} sheets share no column names")]
    NoSharedColumns { sheets: usize },

    #[error("Sheet '{name}' has no rows to use as header")]
    MissingHeaderRow { name: String },

    #[error("Please upload CSV files")]
    NoTables,

    #[error("Row index out of bounds: {index} (sheet has {count} rows)")]
    RowIndexOutOfBounds { index: usize, count: usize },

    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Data length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Duplicate column name: {name}")]
    DuplicateColumnName { name: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SheetError {
    /// Whether the error should be shown as a warning instead of an error
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self, SheetError::NoTables)
    }

    /// Whether a semicolon retry can recover from this error
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(self, SheetError::Structure { .. } | SheetError::Csv(_))
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
