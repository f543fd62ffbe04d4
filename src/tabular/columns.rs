//! Resolución de columnas por nombre: exacta (insensible a mayúsculas y
//! espacios) o difusa (ignora guiones, guiones bajos y espacios internos).

pub fn find_column(headers: &[String], name: &str) -> Option<usize> {
    let target = name.trim().to_lowercase();
    headers
        .iter()
        .position(|header| header.trim().to_lowercase() == target)
}

pub fn find_fuzzy_column(headers: &[String], canonical: &str) -> Option<usize> {
    let target = squash(canonical);
    headers.iter().position(|header| squash(header) == target)
}

pub fn is_cant_especulada_column(header: &str) -> bool {
    squash(header) == "cantespeculada"
}

fn squash(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '_' && *ch != '-')
        .collect()
}
