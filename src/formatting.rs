//! Ayudas de formato para la salida en terminal.

/// Recorta un valor largo para la vista previa, contando caracteres y no
/// bytes, y marca el corte con puntos suspensivos.
pub fn truncate_cell(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let truncated: String = value.chars().take(max_chars).collect();
    format!("{truncated}...")
}

/// `1 link encontrado`, `3 links encontrados`.
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
