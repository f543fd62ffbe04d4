//! Lectura de contenido CSV completo: normaliza saltos de línea, detecta el
//! delimitador sobre los encabezados y arma la hoja.

use super::{Sheet, detect_delimiter, parse_line};

pub fn sheet_from_text(content: &str) -> Result<Sheet, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err("El archivo CSV está vacío".to_string());
    }

    let delimiter = detect_delimiter(lines[0]);
    let headers = parse_line(lines[0], delimiter);
    if headers.is_empty() || headers.iter().all(|header| header.is_empty()) {
        return Err("No se pudieron leer los encabezados del CSV".to_string());
    }

    let rows = lines[1..]
        .iter()
        .map(|line| parse_line(line, delimiter))
        .collect();

    Ok(Sheet::assemble(headers, rows))
}
