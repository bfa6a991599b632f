use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::{normalize_column_names, Sheet};
use std::io::{Read, Write};

/// CSV reader/writer options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Whether the first row contains headers (default: true)
    pub has_headers: bool,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Whether to use type inference when reading
    pub infer_types: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            has_headers: true,
            quote: b'"',
            infer_types: true,
        }
    }
}

impl CsvOptions {
    /// Create options for semicolon-separated files
    #[must_use]
    pub fn semicolon() -> Self {
        Self::default().with_delimiter(b';')
    }

    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether the first row contains headers
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set whether to infer types
    #[must_use]
    pub fn with_type_inference(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }
}

impl Sheet {
    /// Load a sheet from a CSV string
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_str_with_options(content, &CsvOptions::default())
    }

    /// Load a sheet from a CSV string with custom options
    pub fn from_csv_str_with_options(content: &str, options: &CsvOptions) -> Result<Self> {
        Self::read_csv("Sheet1", content.as_bytes(), options)
    }

    /// Load a sheet from a reader
    pub fn from_csv_reader<R: Read>(reader: R, options: &CsvOptions) -> Result<Self> {
        Self::read_csv("Sheet1", reader, options)
    }

    /// Parse CSV records into a named sheet
    ///
    /// Short records are padded with `Null`; a record wider than the header
    /// is a structural error.
    pub(crate) fn read_csv<R: Read>(name: &str, reader: R, options: &CsvOptions) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false) // We handle headers ourselves
            .flexible(true) // Row widths are checked below
            .from_reader(reader);

        let mut records = csv_reader.records();
        let first = match records.next() {
            Some(record) => record?,
            None => {
                return Err(SheetError::EmptyData {
                    name: name.to_string(),
                })
            }
        };

        let width = first.len();
        let mut data: Vec<Vec<CellValue>> = Vec::new();
        let column_names = if options.has_headers {
            let raw: Vec<String> = first.iter().map(str::to_string).collect();
            normalize_column_names(&raw)
        } else {
            data.push(Self::convert_record(&first, width, options));
            (0..width).map(|i| i.to_string()).collect()
        };

        for result in records {
            let record = result?;
            if record.len() > width {
                return Err(SheetError::Structure {
                    name: name.to_string(),
                    line: record.position().map_or(0, csv::Position::line),
                    expected: width,
                    found: record.len(),
                });
            }
            data.push(Self::convert_record(&record, width, options));
        }

        tracing::debug!(
            sheet = name,
            delimiter = %char::from(options.delimiter),
            rows = data.len(),
            cols = width,
            "parsed csv"
        );

        Ok(Sheet::from_parts(name, column_names, data))
    }

    fn convert_record(record: &csv::StringRecord, width: usize, options: &CsvOptions) -> Vec<CellValue> {
        let mut row: Vec<CellValue> = record
            .iter()
            .map(|field| {
                if options.infer_types {
                    CellValue::parse(field)
                } else if field.is_empty() {
                    CellValue::Null
                } else {
                    CellValue::String(field.to_string())
                }
            })
            .collect();
        row.resize(width, CellValue::Null);
        row
    }

    /// Write the sheet to a writer as CSV
    pub fn write_csv<W: Write>(&self, writer: W, options: &CsvOptions) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .from_writer(writer);

        if options.has_headers && self.col_count() > 0 {
            csv_writer.write_record(self.column_names())?;
        }

        for row in self.rows() {
            let record: Vec<String> = row.iter().map(CellValue::as_str).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Convert the sheet to a CSV string
    #[must_use]
    pub fn to_csv_string(&self) -> String {
        self.to_csv_string_with_options(&CsvOptions::default())
    }

    /// Convert the sheet to a CSV string with custom options
    #[must_use]
    pub fn to_csv_string_with_options(&self, options: &CsvOptions) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec does not fail
        let _ = self.write_csv(&mut buffer, options);
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv_str() {
        let csv = "name,age,city\nAlice,30,NYC\nBob,25,LA";
        let sheet = Sheet::from_csv_str(csv).unwrap();

        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.col_count(), 3);
        assert_eq!(sheet.column_names(), ["name", "age", "city"]);
        assert_eq!(sheet.get(0, 1).unwrap(), &CellValue::Int(30));
        assert_eq!(sheet.get_by_name(1, "city").unwrap().as_str(), "LA");
    }

    #[test]
    fn test_without_headers() {
        let csv = "Alice,30\nBob,25";
        let options = CsvOptions::default().with_headers(false);
        let sheet = Sheet::from_csv_str_with_options(csv, &options).unwrap();

        assert_eq!(sheet.column_names(), ["0", "1"]);
        assert_eq!(sheet.row_count(), 2);
    }

    #[test]
    fn test_type_inference() {
        let csv = "string,int,float,empty\nhello,42,2.5,";
        let sheet = Sheet::from_csv_str(csv).unwrap();

        assert_eq!(
            sheet.get(0, 0).unwrap(),
            &CellValue::String("hello".to_string())
        );
        assert_eq!(sheet.get(0, 1).unwrap(), &CellValue::Int(42));
        assert_eq!(sheet.get(0, 2).unwrap(), &CellValue::Float(2.5));
        assert_eq!(sheet.get(0, 3).unwrap(), &CellValue::Null);
    }

    #[test]
    fn test_without_type_inference() {
        let options = CsvOptions::default().with_type_inference(false);
        let sheet = Sheet::from_csv_str_with_options("a,b\n1,", &options).unwrap();

        assert_eq!(sheet.get(0, 0).unwrap(), &CellValue::String("1".to_string()));
        assert_eq!(sheet.get(0, 1).unwrap(), &CellValue::Null);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let sheet = Sheet::from_csv_str("a,b,c\n1\n2,3").unwrap();

        assert_eq!(sheet.row(0).unwrap().len(), 3);
        assert_eq!(sheet.get(0, 2).unwrap(), &CellValue::Null);
        assert_eq!(sheet.get(1, 1).unwrap(), &CellValue::Int(3));
    }

    #[test]
    fn test_wide_row_is_structural_error() {
        let err = Sheet::from_csv_str("a,b\n1,2\n3,4,5").unwrap_err();
        assert!(matches!(
            err,
            SheetError::Structure {
                line: 3,
                expected: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_input() {
        let err = Sheet::from_csv_str("").unwrap_err();
        assert!(matches!(err, SheetError::EmptyData { .. }));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let sheet = Sheet::from_csv_str("a,b\n\n1,2\n\n").unwrap();
        assert_eq!(sheet.row_count(), 1);
    }

    #[test]
    fn test_semicolon_options() {
        let sheet =
            Sheet::from_csv_str_with_options("a;b\n1,5;x", &CsvOptions::semicolon()).unwrap();
        assert_eq!(sheet.column_names(), ["a", "b"]);
        assert_eq!(sheet.get(0, 0).unwrap().as_str(), "1,5");
    }

    #[test]
    fn test_to_csv_string() {
        let sheet = Sheet::from_columns(&["a", "b"], vec![vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(sheet.to_csv_string(), "a,b\n1,2\n3,4\n");
    }

    #[test]
    fn test_to_csv_quotes_special_cells() {
        let sheet = Sheet::from_columns(&["text"], vec![vec!["a,b"], vec!["line\nbreak"]]).unwrap();
        let csv = sheet.to_csv_string();
        assert_eq!(csv, "text\n\"a,b\"\n\"line\nbreak\"\n");

        let restored = Sheet::from_csv_str(&csv).unwrap();
        assert_eq!(restored.get(1, 0).unwrap().as_str(), "line\nbreak");
    }

    #[test]
    fn test_from_csv_reader() {
        let sheet = Sheet::from_csv_reader("x\n1\n".as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(sheet.row_count(), 1);
    }
}
