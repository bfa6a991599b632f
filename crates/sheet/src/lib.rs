//! Sheet module for csvtidy
//!
//! Loads uploaded CSV files into sheets, cleans them (first row, duplicate
//! rows, empty rows), merges several sheets into one and exports the result
//! back to CSV.
//!
//! # Examples
//!
//! ## Cleaning a single upload
//!
//! ```
//! use csvtidy_sheet::{clean, Book, CleanOptions, Upload};
//!
//! let uploads = vec![Upload::new("a.csv", "id,name\n1,Alice\n1,Alice\n,\n")];
//! let book = Book::load(&uploads).unwrap();
//! let sheet = book.get_sheet_by_index(0).unwrap();
//!
//! let options = CleanOptions::new()
//!     .with_drop_duplicates(true)
//!     .with_drop_empty_rows(true);
//! let cleaned = clean(sheet, &options);
//!
//! assert_eq!(cleaned.to_csv_string(), "id,name\n1,Alice\n");
//! ```
//!
//! ## Merging uploads
//!
//! ```
//! use csvtidy_sheet::{Book, Upload};
//!
//! let uploads = vec![
//!     Upload::new("q1.csv", "a,b\n1,2"),
//!     Upload::new("q2.csv", "b,c\n3,4"),
//! ];
//! let merged = Book::load(&uploads).unwrap().merge(false).unwrap();
//!
//! assert_eq!(merged.column_names(), ["a", "b", "c"]);
//! assert_eq!(merged.row_count(), 2);
//! ```
//!
//! ## Exporting
//!
//! ```
//! use csvtidy_sheet::Sheet;
//!
//! let sheet = Sheet::from_csv_str("x,y\n1,2").unwrap();
//! let artifact = sheet.export(1).unwrap();
//!
//! assert_eq!(artifact.file_name, "cleaned_data_1.csv");
//! ```
//!
//! Semicolon-separated uploads are detected by [`Book::load`]; a plain
//! [`Sheet::from_csv_str`] call always uses the comma.

mod book;
mod cell;
mod csv;
mod error;
mod export;
pub mod session;
mod sheet;

/// Re-export book types and options.
pub use book::{Book, MergeOptions, Upload};
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export CSV options.
pub use crate::csv::CsvOptions;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export export types.
pub use export::{export_all, Artifact};
/// Re-export session types.
pub use session::{Choice, Session, Shell};
/// Re-export sheet type and cleaning.
pub use sheet::{clean, CleanOptions, Sheet};
