use std::path::Path;

use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

use super::workbook::resolve_reconcile_sheets;
use super::{
    Sheet, SheetSource, detect_delimiter, find_column, find_fuzzy_column,
    is_cant_especulada_column, load_first_sheet, load_reconcile_workbook, load_sheet, parse_line,
    sheet_from_text,
};

#[test]
fn detect_delimiter_defaults_to_comma() {
    assert_eq!(detect_delimiter("url,nombre,precio"), ',');
    assert_eq!(detect_delimiter("sin delimitadores"), ',');
}

#[test]
fn detect_delimiter_requires_strict_semicolon_majority() {
    assert_eq!(detect_delimiter("a;b;c"), ';');
    assert_eq!(detect_delimiter("a;b,c"), ',');
    assert_eq!(detect_delimiter("a;b;c,d,e"), ';');
}

#[test]
fn detect_delimiter_ignores_delimiters_inside_quotes() {
    assert_eq!(detect_delimiter("\"a;b;c;d\",x,y"), ',');
    assert_eq!(detect_delimiter("\"uno, dos, tres\";x;y"), ';');
}

#[test]
fn detect_delimiter_skips_escaped_quotes() {
    assert_eq!(detect_delimiter("\"dijo \"\"hola; mundo\"\"\";a;b"), ';');
}

#[test]
fn parse_line_splits_simple_fields() {
    assert_eq!(parse_line("a,b,c", ','), vec!["a", "b", "c"]);
}

#[test]
fn parse_line_trims_each_field() {
    assert_eq!(parse_line("  a , b  ,c ", ','), vec!["a", "b", "c"]);
}

#[test]
fn parse_line_keeps_delimiters_inside_quotes() {
    assert_eq!(
        parse_line("\"uno, dos\",tres", ','),
        vec!["uno, dos", "tres"]
    );
}

#[test]
fn parse_line_unescapes_doubled_quotes() {
    assert_eq!(
        parse_line("\"dijo \"\"hola\"\"\",b", ','),
        vec!["dijo \"hola\"", "b"]
    );
}

#[test]
fn parse_line_discards_stray_quote_in_malformed_field() {
    // La comilla que cierra sin delimitador a continuación se descarta y el
    // resto del campo se conserva.
    assert_eq!(parse_line("\"abc\"def,g", ','), vec!["abcdef", "g"]);
}

#[test]
fn parse_line_keeps_trailing_empty_field() {
    assert_eq!(parse_line("a,b,", ','), vec!["a", "b", ""]);
}

#[test]
fn parse_line_handles_unclosed_quote() {
    assert_eq!(parse_line("\"sin cierre,b", ','), vec!["sin cierre,b"]);
}

#[test]
fn parse_line_supports_semicolon_delimiter() {
    assert_eq!(parse_line("a;\"b;c\";d", ';'), vec!["a", "b;c", "d"]);
}

#[test]
fn sheet_from_text_builds_headers_and_rows() -> Result<(), String> {
    let sheet = sheet_from_text("url,nombre\nexample.com,Mesa\nfoo.com,Silla\n")?;
    assert_eq!(sheet.headers, vec!["url", "nombre"]);
    assert_eq!(sheet.rows.len(), 2);
    assert_eq!(sheet.rows[0], vec!["example.com", "Mesa"]);
    Ok(())
}

#[test]
fn sheet_from_text_normalizes_line_endings() -> Result<(), String> {
    let sheet = sheet_from_text("url,nombre\r\nexample.com,Mesa\rfoo.com,Silla")?;
    assert_eq!(sheet.rows.len(), 2);
    Ok(())
}

#[test]
fn sheet_from_text_strips_bom() -> Result<(), String> {
    let sheet = sheet_from_text("\u{feff}url,nombre\nexample.com,Mesa\n")?;
    assert_eq!(sheet.headers[0], "url");
    Ok(())
}

#[test]
fn sheet_from_text_drops_fully_empty_rows() -> Result<(), String> {
    let sheet = sheet_from_text("url,nombre\nexample.com,Mesa\n,\n\nfoo.com,Silla\n")?;
    assert_eq!(sheet.rows.len(), 2);
    assert_eq!(sheet.rows[1][0], "foo.com");
    Ok(())
}

#[test]
fn sheet_from_text_pads_short_rows() -> Result<(), String> {
    let sheet = sheet_from_text("url,nombre,precio\nexample.com\n")?;
    assert_eq!(sheet.rows[0], vec!["example.com", "", ""]);
    Ok(())
}

#[test]
fn sheet_from_text_detects_semicolon_files() -> Result<(), String> {
    let sheet = sheet_from_text("url;nombre\nexample.com;Mesa grande\n")?;
    assert_eq!(sheet.headers, vec!["url", "nombre"]);
    assert_eq!(sheet.rows[0], vec!["example.com", "Mesa grande"]);
    Ok(())
}

#[test]
fn sheet_from_text_rejects_empty_content() {
    let error = sheet_from_text("\n\n  \n").expect_err("un archivo vacío debería fallar");
    assert_eq!(error, "El archivo CSV está vacío");
}

#[test]
fn assemble_keeps_cells_beyond_header_width() {
    let sheet = Sheet::assemble(
        vec!["url".to_string()],
        vec![vec!["example.com".to_string(), "extra".to_string()]],
    );
    assert_eq!(sheet.rows[0].len(), 2);
}

#[test]
fn display_row_accounts_for_header_and_base_one() {
    assert_eq!(Sheet::display_row(0), 2);
    assert_eq!(Sheet::display_row(7), 9);
}

#[test]
fn find_column_ignores_case_and_padding() {
    let headers = vec![" URL ".to_string(), "Nombre".to_string()];
    assert_eq!(find_column(&headers, "url"), Some(0));
    assert_eq!(find_column(&headers, "NOMBRE"), Some(1));
    assert_eq!(find_column(&headers, "precio"), None);
}

#[test]
fn find_fuzzy_column_ignores_separators() {
    let headers = vec!["Cant-Especulada".to_string()];
    assert_eq!(find_fuzzy_column(&headers, "cant_especulada"), Some(0));
}

#[test]
fn cant_especulada_column_admits_variants() {
    assert!(is_cant_especulada_column("cant_especulada"));
    assert!(is_cant_especulada_column("CANT ESPECULADA"));
    assert!(is_cant_especulada_column("cant-especulada"));
    assert!(!is_cant_especulada_column("cantidad"));
}

#[test]
fn sheet_source_depends_on_extension() {
    assert_eq!(
        SheetSource::from_path(Path::new("datos.CSV")),
        Ok(SheetSource::Csv)
    );
    assert_eq!(
        SheetSource::from_path(Path::new("datos.xlsx")),
        Ok(SheetSource::Excel)
    );
    let error = SheetSource::from_path(Path::new("datos.txt"))
        .expect_err("una extensión desconocida debería fallar");
    assert_eq!(error, "Por favor, selecciona un archivo CSV o XLSX válido");
}

#[test]
fn resolve_reconcile_sheets_ignores_case_and_accents() -> Result<(), String> {
    let names = vec![
        "Categorías".to_string(),
        "TOMA datos".to_string(),
        "faltantes".to_string(),
    ];
    let resolved = resolve_reconcile_sheets(&names)?;
    assert_eq!(resolved.categorias.as_deref(), Some("Categorías"));
    assert_eq!(resolved.toma, "TOMA datos");
    assert_eq!(resolved.faltantes, "faltantes");
    Ok(())
}

#[test]
fn resolve_reconcile_sheets_requires_toma_and_faltantes() {
    let names = vec!["Hoja1".to_string(), "Toma".to_string()];
    let error =
        resolve_reconcile_sheets(&names).expect_err("sin hoja Faltantes debería fallar");
    assert!(error.contains("las hojas \"Toma\" y \"Faltantes\""));
    assert!(error.contains("Hoja1, Toma"));
}

#[test]
fn load_first_sheet_projects_cells_to_text() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("datos.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write(0, 0, "url")?;
    worksheet.write(0, 1, "cant_especulada")?;
    worksheet.write(1, 0, "https://example.com/p/1")?;
    worksheet.write(1, 1, 5.0)?;
    workbook.save(&path)?;

    let sheet = load_first_sheet(&path)?;
    assert_eq!(sheet.headers, vec!["url", "cant_especulada"]);
    assert_eq!(sheet.rows, vec![vec!["https://example.com/p/1", "5"]]);
    Ok(())
}

#[test]
fn load_sheet_dispatches_by_extension() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("datos.csv");
    std::fs::write(&path, "url\nexample.com\n")?;

    let (sheet, source) = load_sheet(&path)?;
    assert_eq!(source, SheetSource::Csv);
    assert_eq!(sheet.rows.len(), 1);
    Ok(())
}

#[test]
fn load_reconcile_workbook_resolves_three_sheets() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("validacion.xlsx");
    write_reconcile_workbook(&path)?;

    let loaded = load_reconcile_workbook(&path)?;
    assert!(loaded.categorias.is_some());
    assert_eq!(loaded.toma.headers[0], "LINK_DE_CONSULTA");
    assert_eq!(loaded.faltantes.headers[0], "LINK_FALTANTE");
    assert_eq!(loaded.toma.rows.len(), 2);
    assert_eq!(loaded.faltantes.rows.len(), 1);
    Ok(())
}

#[test]
fn load_reconcile_workbook_reports_missing_sheets() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("incompleto.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Hoja1")?;
    worksheet.write(0, 0, "dato")?;
    workbook.save(&path)?;

    let error = load_reconcile_workbook(&path)
        .expect_err("un libro sin Toma ni Faltantes debería fallar");
    assert!(error.contains("Hojas encontradas: Hoja1"));
    Ok(())
}

fn write_reconcile_workbook(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new();

    let categorias = workbook.add_worksheet();
    categorias.set_name("Categorías")?;
    categorias.write(0, 0, "CATEGORIA")?;
    categorias.write(1, 0, "Hogar")?;

    let toma = workbook.add_worksheet();
    toma.set_name("Toma")?;
    toma.write(0, 0, "LINK_DE_CONSULTA")?;
    toma.write(1, 0, "https://tienda.com/id/ABC-1")?;
    toma.write(2, 0, "https://tienda.com/id/XYZ-9")?;

    let faltantes = workbook.add_worksheet();
    faltantes.set_name("Faltantes")?;
    faltantes.write(0, 0, "LINK_FALTANTE")?;
    faltantes.write(1, 0, "https://otra.com/id/ABC-1")?;

    workbook.save(path)?;
    Ok(())
}
