use super::{
    COLUMN_LINK_CONSULTA, COLUMN_LINK_FALTANTE, compile_rule, count_valid_url_rows, match_exact,
    match_with_rule,
};
use crate::tabular::Sheet;

fn sheet(headers: &[&str], rows: &[&[&str]]) -> Sheet {
    Sheet::assemble(
        headers.iter().map(|header| header.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect(),
    )
}

fn toma(urls: &[&str]) -> Sheet {
    let rows: Vec<&[&str]> = urls.iter().map(std::slice::from_ref).collect();
    sheet(&[COLUMN_LINK_CONSULTA], &rows)
}

fn faltantes(urls: &[&str]) -> Sheet {
    let rows: Vec<&[&str]> = urls.iter().map(std::slice::from_ref).collect();
    sheet(&[COLUMN_LINK_FALTANTE], &rows)
}

#[test]
fn match_exact_classifies_by_normalized_url() -> Result<(), String> {
    let toma = toma(&["https://shop.example.com/item/1/"]);
    let faltantes = faltantes(&["SHOP.example.com/item/1", "shop.example.com/item/2"]);

    let report = match_exact(&toma, &faltantes)?;
    assert_eq!(report.found.len(), 1);
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.found[0].link, "SHOP.example.com/item/1");
    assert_eq!(
        report.found[0].matched.as_deref(),
        Some("https://shop.example.com/item/1/")
    );
    assert_eq!(report.missing[0].link, "shop.example.com/item/2");
    Ok(())
}

#[test]
fn match_exact_keeps_first_seen_original() -> Result<(), String> {
    let toma = toma(&["http://a.com/x", "https://A.com/x/"]);
    let faltantes = faltantes(&["a.com/x"]);

    let report = match_exact(&toma, &faltantes)?;
    assert_eq!(report.found[0].matched.as_deref(), Some("http://a.com/x"));
    Ok(())
}

#[test]
fn match_exact_skips_invalid_urls_silently() -> Result<(), String> {
    let toma = toma(&["no es url", "https://a.com/x"]);
    let faltantes = faltantes(&["12345", "", "a.com/x"]);

    let report = match_exact(&toma, &faltantes)?;
    // Solo la fila con URL válida se clasifica; las demás no aparecen en
    // ninguna partición.
    assert_eq!(report.total(), 1);
    assert_eq!(report.found.len(), 1);
    Ok(())
}

#[test]
fn match_exact_preserves_sheet_order_and_rows() -> Result<(), String> {
    let toma = toma(&["https://a.com/1", "https://a.com/3"]);
    let faltantes = faltantes(&["a.com/1", "a.com/2", "a.com/3", "a.com/4"]);

    let report = match_exact(&toma, &faltantes)?;
    let found: Vec<&str> = report.found.iter().map(|row| row.link.as_str()).collect();
    let missing: Vec<&str> = report.missing.iter().map(|row| row.link.as_str()).collect();
    assert_eq!(found, vec!["a.com/1", "a.com/3"]);
    assert_eq!(missing, vec!["a.com/2", "a.com/4"]);
    assert_eq!(report.found[0].display_row, 2);
    assert_eq!(report.missing[1].display_row, 5);
    Ok(())
}

#[test]
fn match_exact_requires_consulta_column() {
    let toma = sheet(&["OTRA"], &[&["https://a.com"]]);
    let faltantes = faltantes(&["a.com"]);

    let error = match_exact(&toma, &faltantes).expect_err("sin columna debería fallar");
    assert_eq!(
        error,
        "No se encontró la columna \"LINK_DE_CONSULTA\" en la hoja Toma"
    );
}

#[test]
fn match_exact_requires_faltante_column() {
    let toma = toma(&["https://a.com"]);
    let faltantes = sheet(&["LINKS"], &[&["a.com"]]);

    let error = match_exact(&toma, &faltantes).expect_err("sin columna debería fallar");
    assert_eq!(
        error,
        "No se encontró la columna \"LINK_FALTANTE\" en la hoja Faltantes"
    );
}

#[test]
fn compile_rule_rejects_invalid_regex() {
    let error = compile_rule("[abc").expect_err("una regla malformada debería fallar");
    assert!(error.contains("La expresión regular no es válida"));
}

#[test]
fn compile_rule_rejects_empty_rule() {
    let error = compile_rule("   ").expect_err("una regla vacía debería fallar");
    assert!(error.contains("ingresa una expresión regular"));
}

#[test]
fn compile_rule_strips_one_quote_layer() -> Result<(), String> {
    let rule = compile_rule("\"/id/[0-9]+\"")?;
    assert!(rule.is_match("https://a.com/id/42"));
    let rule = compile_rule("'/id/[0-9]+'")?;
    assert!(rule.is_match("https://a.com/id/42"));
    Ok(())
}

#[test]
fn rule_match_finds_by_extracted_fragment() -> Result<(), String> {
    let toma = toma(&["https://tienda.com/id/ABC-1?ref=2"]);
    let faltantes = faltantes(&["https://otra.com/id/ABC-1"]);

    let report = match_with_rule(&toma, &faltantes, r"/id/[0-9a-zA-Z\-]+")?;
    assert_eq!(report.found.len(), 1);
    assert_eq!(report.found[0].pattern.as_deref(), Some("/id/ABC-1"));
    assert_eq!(
        report.found[0].matched.as_deref(),
        Some("https://tienda.com/id/ABC-1?ref=2")
    );
    Ok(())
}

#[test]
fn rule_match_without_query_pattern_goes_missing() -> Result<(), String> {
    let toma = toma(&["https://tienda.com/id/ABC-1"]);
    let faltantes = faltantes(&["https://otra.com/producto/99"]);

    let report = match_with_rule(&toma, &faltantes, r"/id/[0-9a-zA-Z\-]+")?;
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].pattern, None);
    Ok(())
}

#[test]
fn rule_match_records_pattern_on_missing_rows() -> Result<(), String> {
    let toma = toma(&["https://tienda.com/id/OTRA-7"]);
    let faltantes = faltantes(&["https://otra.com/id/ABC-1"]);

    let report = match_with_rule(&toma, &faltantes, r"/id/[A-Z]+-1")?;
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].pattern.as_deref(), Some("/id/ABC-1"));
    Ok(())
}

#[test]
fn rule_match_first_reference_wins() -> Result<(), String> {
    // La primera referencia matchea por igualdad de patrones (insensible a
    // mayúsculas) aunque la segunda contenga el fragmento textual.
    let toma = toma(&[
        "https://espejo.com/id/abc-1",
        "https://tienda.com/id/ABC-1",
    ]);
    let faltantes = faltantes(&["https://otra.com/id/ABC-1"]);

    let report = match_with_rule(&toma, &faltantes, r"/id/[0-9a-zA-Z\-]+")?;
    assert_eq!(
        report.found[0].matched.as_deref(),
        Some("https://espejo.com/id/abc-1")
    );
    Ok(())
}

#[test]
fn rule_match_substring_is_case_sensitive() -> Result<(), String> {
    // Sin patrón propio en la referencia, la subcadena exacta decide.
    let toma = toma(&["https://tienda.com/catalogo/abc-1"]);
    let faltantes = faltantes(&["https://otra.com/id/ABC-1"]);

    let report = match_with_rule(&toma, &faltantes, r"/id/[0-9a-zA-Z\-]+")?;
    assert_eq!(report.missing.len(), 1);
    Ok(())
}

#[test]
fn rule_match_ignores_empty_matches() -> Result<(), String> {
    let toma = toma(&["https://tienda.com/id/ABC-1"]);
    let faltantes = faltantes(&["https://otra.com/producto/99"]);

    // `z*` matchea la cadena vacía en la posición 0; eso no cuenta como
    // patrón extraído.
    let report = match_with_rule(&toma, &faltantes, "z*")?;
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].pattern, None);
    Ok(())
}

#[test]
fn rule_match_fails_before_classifying_on_bad_rule() {
    let toma = toma(&["https://tienda.com/id/ABC-1"]);
    let faltantes = faltantes(&["https://otra.com/id/ABC-1"]);

    let error =
        match_with_rule(&toma, &faltantes, "[").expect_err("una regla inválida debería fallar");
    assert!(error.contains("La expresión regular no es válida"));
}

#[test]
fn count_valid_url_rows_ignores_invalid_cells() {
    let sheet = sheet(
        &[COLUMN_LINK_CONSULTA],
        &[&["https://a.com"], &["12345"], &["b.com/x"]],
    );
    assert_eq!(count_valid_url_rows(&sheet, COLUMN_LINK_CONSULTA), 2);
}

#[test]
fn count_valid_url_rows_is_zero_without_column() {
    let sheet = sheet(&["OTRA"], &[&["https://a.com"]]);
    assert_eq!(count_valid_url_rows(&sheet, COLUMN_LINK_CONSULTA), 0);
}
