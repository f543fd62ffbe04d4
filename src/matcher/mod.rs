//! Conciliación de links entre las hojas Toma y Faltantes: matcheo exacto por
//! URL normalizada o por regla regex provista por el usuario.

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use crate::links::{is_valid_url, normalize_url};
use crate::tabular::{Sheet, find_column};

pub const COLUMN_LINK_CONSULTA: &str = "LINK_DE_CONSULTA";
pub const COLUMN_LINK_FALTANTE: &str = "LINK_FALTANTE";

/// Una fila de Faltantes clasificada. `matched` trae la URL de Toma tal como
/// figura en la hoja cuando hubo coincidencia; `pattern` trae el fragmento
/// extraído por la regla en ambas ramas del modo regla.
#[derive(Clone, Debug)]
pub struct MatchRow {
    pub display_row: usize,
    pub link: String,
    pub matched: Option<String>,
    pub pattern: Option<String>,
    pub row: Vec<String>,
}

/// Resultado de una corrida de conciliación. Ambas particiones conservan el
/// orden de aparición en la hoja Faltantes.
#[derive(Clone, Debug, Default)]
pub struct MatchReport {
    pub found: Vec<MatchRow>,
    pub missing: Vec<MatchRow>,
}

impl MatchReport {
    pub fn total(&self) -> usize {
        self.found.len() + self.missing.len()
    }
}

/// Clasifica cada URL válida de Faltantes según exista su forma normalizada
/// entre las URLs válidas de la columna `LINK_DE_CONSULTA` de Toma. Para cada
/// clave normalizada se recuerda la primera URL original vista en Toma.
pub fn match_exact(toma: &Sheet, faltantes: &Sheet) -> Result<MatchReport, String> {
    let consulta = require_column(toma, COLUMN_LINK_CONSULTA, "Toma")?;
    let faltante = require_column(faltantes, COLUMN_LINK_FALTANTE, "Faltantes")?;

    let mut canonical: HashMap<String, String> = HashMap::new();
    for row in &toma.rows {
        let Some(value) = valid_cell(row, consulta) else {
            continue;
        };
        canonical
            .entry(normalize_url(value))
            .or_insert_with(|| value.to_string());
    }

    let mut report = MatchReport::default();
    for (index, row) in faltantes.rows.iter().enumerate() {
        let Some(value) = valid_cell(row, faltante) else {
            continue;
        };
        let matched = canonical.get(&normalize_url(value)).cloned();
        let entry = MatchRow {
            display_row: Sheet::display_row(index),
            link: value.to_string(),
            matched: matched.clone(),
            pattern: None,
            row: row.clone(),
        };
        if matched.is_some() {
            report.found.push(entry);
        } else {
            report.missing.push(entry);
        }
    }

    Ok(report)
}

/// Compila la regla del usuario: se descarta una capa de comillas envolventes
/// y se construye insensible a mayúsculas. Una regla inválida corta la corrida
/// entera antes de clasificar fila alguna.
pub fn compile_rule(rule: &str) -> Result<Regex, String> {
    let trimmed = rule.trim();
    if trimmed.is_empty() {
        return Err("Por favor, ingresa una expresión regular (regex) de matcheo".to_string());
    }
    RegexBuilder::new(strip_rule_quotes(trimmed))
        .case_insensitive(true)
        .build()
        .map_err(|_| {
            "La expresión regular no es válida. Por favor, verifica el formato.\nEjemplo: \\/id\\/[0-9a-zA-Z\\-]+"
                .to_string()
        })
}

/// Clasifica Faltantes comparando el fragmento que la regla extrae de cada
/// URL contra las URLs de Toma.
pub fn match_with_rule(
    toma: &Sheet,
    faltantes: &Sheet,
    rule: &str,
) -> Result<MatchReport, String> {
    let rule = compile_rule(rule)?;
    let consulta = require_column(toma, COLUMN_LINK_CONSULTA, "Toma")?;
    let faltante = require_column(faltantes, COLUMN_LINK_FALTANTE, "Faltantes")?;

    let references: Vec<(String, Option<String>)> = toma
        .rows
        .iter()
        .filter_map(|row| {
            let value = valid_cell(row, consulta)?;
            Some((value.to_string(), extract_pattern(value, &rule)))
        })
        .collect();

    let mut report = MatchReport::default();
    for (index, row) in faltantes.rows.iter().enumerate() {
        let Some(value) = valid_cell(row, faltante) else {
            continue;
        };
        let pattern = extract_pattern(value, &rule);
        let matched = pattern.as_ref().and_then(|pattern| {
            // Gana la primera referencia en el orden de la hoja; la prueba de
            // subcadena se evalúa antes que la igualdad de patrones.
            references
                .iter()
                .find(|(reference, reference_pattern)| {
                    reference.contains(pattern.as_str())
                        || reference_pattern
                            .as_ref()
                            .is_some_and(|rp| rp.to_lowercase() == pattern.to_lowercase())
                })
                .map(|(reference, _)| reference.clone())
        });

        let entry = MatchRow {
            display_row: Sheet::display_row(index),
            link: value.to_string(),
            matched: matched.clone(),
            pattern,
            row: row.clone(),
        };
        if matched.is_some() {
            report.found.push(entry);
        } else {
            report.missing.push(entry);
        }
    }

    Ok(report)
}

/// Cantidad de filas con URL válida bajo la columna dada; `0` si la columna
/// no existe. Alimenta el panel informativo.
pub fn count_valid_url_rows(sheet: &Sheet, column: &str) -> usize {
    match find_column(&sheet.headers, column) {
        Some(index) => sheet
            .rows
            .iter()
            .filter(|row| valid_cell(row, index).is_some())
            .count(),
        None => 0,
    }
}

/// Primer fragmento que la regla encuentra en la URL; un match vacío cuenta
/// como ausencia de patrón.
fn extract_pattern(url: &str, rule: &Regex) -> Option<String> {
    rule.find(url)
        .map(|found| found.as_str())
        .filter(|found| !found.is_empty())
        .map(str::to_string)
}

fn strip_rule_quotes(rule: &str) -> &str {
    let without_prefix = rule.strip_prefix(['"', '\'']).unwrap_or(rule);
    without_prefix
        .strip_suffix(['"', '\''])
        .unwrap_or(without_prefix)
}

fn require_column(sheet: &Sheet, column: &str, hoja: &str) -> Result<usize, String> {
    find_column(&sheet.headers, column)
        .ok_or_else(|| format!("No se encontró la columna \"{column}\" en la hoja {hoja}"))
}

fn valid_cell(row: &[String], column: usize) -> Option<&str> {
    let value = row.get(column)?.trim();
    (!value.is_empty() && is_valid_url(value)).then_some(value)
}
