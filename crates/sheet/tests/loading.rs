use csvtidy_sheet::{Book, CellValue, Sheet, SheetError, Upload};

fn load(files: &[(&str, &str)]) -> Result<Book, SheetError> {
    let uploads: Vec<Upload> = files
        .iter()
        .map(|(name, text)| Upload::new(*name, *text))
        .collect();
    Book::load(&uploads)
}

#[test]
fn test_comma_is_default() {
    let book = load(&[("a.csv", "id,name\n1,Alice\n")]).unwrap();
    let sheet = book.get_sheet_by_index(0).unwrap();

    assert_eq!(sheet.name(), "a");
    assert_eq!(sheet.column_names(), ["id", "name"]);
    assert_eq!(sheet.get(0, 0).unwrap(), &CellValue::Int(1));
}

#[test]
fn test_semicolon_fallback() {
    let book = load(&[("eu.csv", "name;price\nTea;1,50\nCoffee;2,10\n")]).unwrap();
    let sheet = book.get_sheet_by_index(0).unwrap();

    assert_eq!(sheet.column_names(), ["name", "price"]);
    assert_eq!(sheet.row_count(), 2);
    assert_eq!(sheet.get_by_name(0, "price").unwrap().as_str(), "1,50");
}

#[test]
fn test_semicolon_without_structural_error_stays_comma() {
    // Nothing fails with ',' so the single ';' column is kept as-is
    let book = load(&[("a.csv", "x;y\n1;2\n")]).unwrap();
    let sheet = book.get_sheet_by_index(0).unwrap();
    assert_eq!(sheet.column_names(), ["x;y"]);
}

#[test]
fn test_mixed_delimiters_in_batch_are_unsupported() {
    let result = load(&[("comma.csv", "a,b\n1,2\n"), ("semi.csv", "a;b\n1,5;2\n")]);

    // The comma file is re-read with ';' and collapses into one column
    let book = result.unwrap();
    let comma = book.get_sheet_by_index(0).unwrap();
    assert_eq!(comma.column_names(), ["a,b"]);
}

#[test]
fn test_both_delimiters_failing_is_reported() {
    let err = load(&[("bad.csv", "a\n1,2\n3;4\n")]).unwrap_err();

    match err {
        SheetError::Delimiter { comma, source } => {
            assert!(matches!(*comma, SheetError::Structure { ref name, .. } if name == "bad"));
            assert!(matches!(*source, SheetError::Structure { ref name, .. } if name == "bad"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_encoding_error_yields_no_tables() {
    let err = Book::load(&[
        Upload::new("ok.csv", "a\n1\n"),
        Upload::new("latin1.csv", &b"name\nJos\xe9\n"[..]),
    ])
    .unwrap_err();

    assert!(matches!(err, SheetError::Encoding { ref name, .. } if name == "latin1.csv"));
    assert!(err.to_string().contains("UTF-8"));
}

#[test]
fn test_encoding_error_is_not_retried_with_semicolon() {
    // Structurally broken with ',' as well, but the encoding error wins
    let err = Book::load(&[Upload::new("bad.csv", &b"a\n1,2\n\xff\n"[..])]).unwrap_err();
    assert!(matches!(err, SheetError::Encoding { .. }));
}

#[test]
fn test_empty_upload() {
    let err = load(&[("empty.csv", "")]).unwrap_err();
    assert!(matches!(err, SheetError::EmptyData { ref name } if name == "empty"));
}

#[test]
fn test_duplicate_and_blank_headers() {
    let book = load(&[("a.csv", "id,,id\n1,2,3\n")]).unwrap();
    let sheet = book.get_sheet_by_index(0).unwrap();
    assert_eq!(sheet.column_names(), ["id", "Unnamed: 1", "id.1"]);
}

#[test]
fn test_export_round_trip() {
    let original = load(&[(
        "a.csv",
        "id,name,score,note\n1,Alice,2.5,\n2,Bob,3.0,late\n,,,\n",
    )])
    .unwrap()
    .into_sheets()
    .remove(0);

    let artifact = original.export(1).unwrap();
    let restored = Book::load(&[Upload::new("cleaned_data_1.csv", artifact.bytes)])
        .unwrap()
        .into_sheets()
        .remove(0);

    assert_eq!(restored.column_names(), original.column_names());
    assert_eq!(restored.data(), original.data());
}

#[test]
fn test_round_trip_of_built_sheet() {
    let original = Sheet::from_columns(
        &["n", "f", "s"],
        vec![
            vec![CellValue::Int(-4), CellValue::Float(10.0), CellValue::from("x y")],
            vec![CellValue::Null, CellValue::Float(0.125), CellValue::Null],
        ],
    )
    .unwrap();

    let restored = Sheet::from_csv_str(&original.to_csv_string()).unwrap();
    assert_eq!(restored.data(), original.data());
}
