//! Per-session state and the interaction flow driven through a [`Shell`].
//!
//! A [`Session`] starts with no sheets. Each handler takes the session by
//! `&mut` and either replaces its sheets or leaves them untouched on error,
//! so a reported failure never ends the session.

use crate::book::{Book, MergeOptions, Upload};
use crate::error::{Result, SheetError};
use crate::export::{export_all, Artifact};
use crate::sheet::{clean, CleanOptions, Sheet};
use std::fmt;

/// One of the two labels offered by a Yes/No option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
}

impl Choice {
    /// Both labels, in the order they are offered
    pub const ALL: [Choice; 2] = [Choice::Yes, Choice::No];

    #[must_use]
    pub fn is_yes(self) -> bool {
        self == Choice::Yes
    }

    /// Parse a label; accepts `yes`/`no`/`y`/`n` in any case
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "yes" | "y" => Some(Choice::Yes),
            "no" | "n" => Some(Choice::No),
            _ => None,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Yes => write!(f, "Yes"),
            Choice::No => write!(f, "No"),
        }
    }
}

/// Labels of the options a session asks for
pub mod labels {
    pub const REMOVE_FIRST_ROW: &str = "Remove first row";
    pub const REMOVE_DUPLICATES: &str = "Remove duplicate rows";
    pub const REMOVE_EMPTY_ROWS: &str = "Remove all empty rows";
    pub const MERGE_FILES: &str = "Merge CSV files";
    pub const PROMOTE_HEADER: &str = "Make first row of each file the header";
    pub const SHOW_DATA: &str = "Show Data";
    pub const DOWNLOAD: &str = "Download Cleaned Data";
}

/// The presentation layer a session talks to: upload widget, form controls,
/// table rendering and download links
pub trait Shell {
    /// Files uploaded since the last turn
    fn upload_files(&mut self) -> Vec<Upload>;

    /// Ask the user to pick one of `choices`
    fn get_option(&mut self, prompt: &str, choices: &[Choice]) -> Choice;

    /// Read a toggle, starting from `default`
    fn get_toggle(&mut self, label: &str, default: bool) -> bool;

    /// True once per click
    fn button_pressed(&mut self, label: &str) -> bool;

    fn render_table(&mut self, title: &str, sheet: &Sheet);

    fn render_error(&mut self, message: &str);

    fn render_warning(&mut self, message: &str);

    fn offer_download(&mut self, artifact: &Artifact);
}

/// Sheets held for one user session
#[derive(Debug, Default)]
pub struct Session {
    sheets: Vec<Sheet>,
}

impl Session {
    /// Start a session with no sheets
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The sheets currently held for preview and export
    #[must_use]
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Drop every sheet held by the session
    pub fn clear(&mut self) {
        self.sheets.clear();
    }

    /// Replace the session's sheets with a freshly loaded batch.
    /// On error the session is left empty.
    pub fn upload(&mut self, uploads: &[Upload]) -> Result<usize> {
        self.sheets.clear();
        let book = Book::load(uploads)?;
        self.sheets = book.into_sheets();
        Ok(self.sheets.len())
    }

    /// Clean the single uploaded sheet
    pub fn clean_single(&mut self, options: &CleanOptions) -> Result<&Sheet> {
        let sheet = match self.sheets.as_slice() {
            [] => return Err(SheetError::NoTables),
            [sheet] => clean(sheet, options),
            many => {
                return Err(SheetError::LengthMismatch {
                    expected: 1,
                    actual: many.len(),
                })
            }
        };
        self.sheets = vec![sheet];
        Ok(&self.sheets[0])
    }

    /// Merge every held sheet into one and clean it.
    /// On error the unmerged sheets are kept.
    pub fn merge(&mut self, options: &MergeOptions) -> Result<&Sheet> {
        let mut book = Book::new();
        for sheet in &self.sheets {
            book.add_sheet(sheet.name(), sheet.clone());
        }
        let merged = book.merge_with_options(options)?;
        self.sheets = vec![merged];
        Ok(&self.sheets[0])
    }

    /// One artifact per held sheet
    pub fn artifacts(&self) -> Result<Vec<Artifact>> {
        if self.sheets.is_empty() {
            return Err(SheetError::NoTables);
        }
        export_all(&self.sheets)
    }

    /// Run one interaction turn against `shell`
    pub fn run_turn(&mut self, shell: &mut dyn Shell) {
        let uploads = shell.upload_files();
        if !uploads.is_empty() {
            if let Err(err) = self.upload(&uploads) {
                tracing::warn!(error = %err, "upload rejected");
                shell.render_error(&format!("Error: {err}"));
            }
        }

        match self.sheets.len() {
            0 => {
                shell.render_warning(&SheetError::NoTables.to_string());
                return;
            }
            1 => self.single_file_turn(shell),
            _ => self.multi_file_turn(shell),
        }

        if shell.get_toggle(labels::SHOW_DATA, true) {
            for (i, sheet) in self.sheets.iter().enumerate() {
                shell.render_table(&format!("File {}", i + 1), sheet);
            }
        }

        if shell.button_pressed(labels::DOWNLOAD) {
            match self.artifacts() {
                Ok(artifacts) => {
                    for artifact in &artifacts {
                        shell.offer_download(artifact);
                    }
                }
                Err(err) if err.is_warning() => shell.render_warning(&err.to_string()),
                Err(err) => shell.render_error(&format!("Error: {err}")),
            }
        }
    }

    fn single_file_turn(&mut self, shell: &mut dyn Shell) {
        let options = CleanOptions::new()
            .with_drop_first_row(ask(shell, labels::REMOVE_FIRST_ROW))
            .with_drop_duplicates(ask(shell, labels::REMOVE_DUPLICATES))
            .with_drop_empty_rows(ask(shell, labels::REMOVE_EMPTY_ROWS));

        if let Err(err) = self.clean_single(&options) {
            shell.render_error(&format!("Error: {err}"));
        }
    }

    fn multi_file_turn(&mut self, shell: &mut dyn Shell) {
        if !shell.get_toggle(labels::MERGE_FILES, false) {
            return;
        }

        let options = MergeOptions::new()
            .with_header_promotion(ask(shell, labels::PROMOTE_HEADER))
            .with_drop_duplicates(ask(shell, labels::REMOVE_DUPLICATES))
            .with_drop_empty_rows(ask(shell, labels::REMOVE_EMPTY_ROWS));

        if let Err(err) = self.merge(&options) {
            tracing::warn!(error = %err, "merge failed");
            shell.render_error(&format!(
                "An error occurred during merging: {err}; Please ensure at least one column matches"
            ));
        }
    }
}

fn ask(shell: &mut dyn Shell, prompt: &str) -> bool {
    shell.get_option(prompt, &Choice::ALL).is_yes()
}
