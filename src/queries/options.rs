//! Armado del campo `options`: etiquetas derivadas de columnas, volcado de
//! columnas restantes y opciones extra escritas por el usuario.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::config::TagsConfig;
use crate::links::{LinkRecord, URL_COLUMN};
use crate::tabular::{Sheet, find_column, is_cant_especulada_column};

/// Valor centinela del modo "options con etiquetas".
pub const WITH_TAGS_SENTINEL: &str = "{\"tags\":[]}";
/// Valor del campo `options` cuando no hay etiquetas ni extras configurados.
pub const EMPTY_OPTIONS: &str = "{}";

/// Cómo se construye `options` para cada fila.
#[derive(Clone, Debug, Default)]
pub struct OptionsMode {
    /// Genera `tags` a partir de las columnas mapeadas en `tags-config.json`.
    pub with_tags: bool,
    /// Vuelca además todas las columnas restantes de la hoja.
    pub full_columns: bool,
    /// Pares extra escritos por el usuario, en JSON o en `clave: valor`.
    pub extra: String,
}

/// Valor global del campo `options` antes de componer por fila: el centinela
/// de etiquetas, los extras serializados o `{}`.
pub fn global_options_value(mode: &OptionsMode) -> String {
    if mode.with_tags {
        return WITH_TAGS_SENTINEL.to_string();
    }
    let extra = parse_extra_options(&mode.extra);
    if extra.is_empty() {
        EMPTY_OPTIONS.to_string()
    } else {
        serialize(extra)
    }
}

/// Compone el objeto `options` definitivo de una fila. Las capas se aplican
/// en orden de inserción: columnas completas, luego etiquetas o el JSON
/// custom que haya quedado tras el merge, y al final los extras.
pub fn build_options_object(
    sheet: &Sheet,
    link: &LinkRecord,
    tags: &TagsConfig,
    mode: &OptionsMode,
    merged_options: &str,
) -> String {
    let mut object = Map::new();

    if mode.full_columns {
        for (key, value) in remaining_columns(sheet, link.row_index, tags) {
            object.insert(key, Value::String(value));
        }
    }

    let extra = parse_extra_options(&mode.extra);
    if merged_options == WITH_TAGS_SENTINEL {
        let tag_values: Vec<Value> = collect_tags(sheet, link.row_index, tags)
            .into_iter()
            .map(Value::String)
            .collect();
        object.insert("tags".to_string(), Value::Array(tag_values));
        for (key, value) in extra {
            object.insert(key, value);
        }
    } else if merged_options == EMPTY_OPTIONS {
        for (key, value) in extra {
            object.insert(key, value);
        }
    } else {
        if let Ok(Value::Object(custom)) = serde_json::from_str(merged_options) {
            for (key, value) in custom {
                object.insert(key, value);
            }
        }
        for (key, value) in extra {
            object.insert(key, value);
        }
    }

    serialize(object)
}

/// Interpreta la entrada de opciones extra. Acepta un objeto JSON literal,
/// el mismo contenido sin llaves, o pares `clave: valor` separados por comas
/// de primer nivel; las comas entre comillas no separan. Una entrada
/// inindescifrable produce un objeto vacío, nunca un error.
pub fn parse_extra_options(input: &str) -> Map<String, Value> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Map::new();
    }

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        if let Ok(Value::Object(object)) = serde_json::from_str(trimmed) {
            return object;
        }
        return Map::new();
    }

    if let Ok(Value::Object(object)) = serde_json::from_str(&format!("{{{trimmed}}}")) {
        return object;
    }

    let mut object = Map::new();
    for pair in split_top_level(trimmed) {
        if let Some((key, value)) = parse_pair(&pair) {
            object.insert(key, Value::String(value));
        }
    }
    object
}

/// Columnas que generan etiquetas, en el orden del mapeo: `prefijo: valor`
/// por cada celda no vacía.
pub fn collect_tags(sheet: &Sheet, row_index: usize, tags: &TagsConfig) -> Vec<String> {
    let Some(row) = sheet.rows.get(row_index) else {
        return Vec::new();
    };

    tags.column_mappings
        .iter()
        .filter_map(|mapping| {
            let column = find_column(&sheet.headers, &mapping.csv_column)?;
            let value = row.get(column).map(|cell| cell.trim()).unwrap_or("");
            if value.is_empty() {
                return None;
            }
            Some(format!("{}: {}", mapping.tag_prefix, value))
        })
        .collect()
}

/// Todas las columnas de la fila salvo la de URL, las de etiquetas y la de
/// `cant_especulada`; solo celdas no vacías.
fn remaining_columns(sheet: &Sheet, row_index: usize, tags: &TagsConfig) -> Vec<(String, String)> {
    let Some(row) = sheet.rows.get(row_index) else {
        return Vec::new();
    };

    sheet
        .headers
        .iter()
        .enumerate()
        .filter_map(|(index, header)| {
            if header.trim().to_lowercase() == URL_COLUMN {
                return None;
            }
            if tags.is_tag_column(header) || is_cant_especulada_column(header) {
                return None;
            }
            let value = row.get(index).map(|cell| cell.trim()).unwrap_or("");
            if value.is_empty() {
                return None;
            }
            Some((header.clone(), value.to_string()))
        })
        .collect()
}

/// Separa por comas de primer nivel; `"` alterna el estado de comillas salvo
/// que venga escapada con `\`, y el carácter de comilla se conserva en el par.
fn split_top_level(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut pairs = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for (i, ch) in chars.iter().enumerate() {
        if *ch == '"' && (i == 0 || chars[i - 1] != '\\') {
            in_quotes = !in_quotes;
        } else if *ch == ',' && !in_quotes {
            pairs.push(current.trim().to_string());
            current.clear();
            continue;
        }
        current.push(*ch);
    }
    if !current.trim().is_empty() {
        pairs.push(current.trim().to_string());
    }

    pairs
}

fn parse_pair(pair: &str) -> Option<(String, String)> {
    static PAIR: OnceLock<Regex> = OnceLock::new();
    let pattern =
        PAIR.get_or_init(|| Regex::new(r#"^"?([^"]+)"?\s*:\s*"?([^"]*)"?$"#).unwrap());

    let captures = pattern.captures(pair)?;
    let key = captures.get(1)?.as_str().trim().to_string();
    let value = captures
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

fn serialize(object: Map<String, Value>) -> String {
    serde_json::to_string(&Value::Object(object)).unwrap_or_else(|_| EMPTY_OPTIONS.to_string())
}
