use crate::csv::CsvOptions;
use crate::error::Result;
use crate::sheet::Sheet;
use std::path::{Path, PathBuf};

/// A cleaned sheet serialized as CSV, ready to be offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name (`cleaned_data_<n>.csv`)
    pub file_name: String,
    /// Comma-delimited UTF-8 CSV with a header row
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Suggested file name for the artifact at a 1-based position
    #[must_use]
    pub fn file_name_for(index: usize) -> String {
        format!("cleaned_data_{index}.csv")
    }

    /// The CSV content as text
    #[must_use]
    pub fn as_text(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    /// Write the artifact into `dir` under its suggested name
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "wrote artifact");
        Ok(path)
    }
}

impl Sheet {
    /// Serialize the sheet for download as the `index`-th (1-based) artifact
    ///
    /// The header row holds the column names; no row index is written.
    pub fn export(&self, index: usize) -> Result<Artifact> {
        let mut bytes = Vec::new();
        self.write_csv(&mut bytes, &CsvOptions::default())?;
        Ok(Artifact {
            file_name: Artifact::file_name_for(index),
            bytes,
        })
    }
}

/// Export every sheet, numbering artifacts from 1 in order
pub fn export_all<'a, I>(sheets: I) -> Result<Vec<Artifact>>
where
    I: IntoIterator<Item = &'a Sheet>,
{
    sheets
        .into_iter()
        .enumerate()
        .map(|(i, sheet)| sheet.export(i + 1))
        .collect()
}
