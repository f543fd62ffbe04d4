//! Extracción de links de la hoja cargada para el flujo de INSERTs.

mod urls;

pub use urls::{complete_url, is_valid_url, normalize_url};


use std::collections::HashMap;

use crate::tabular::{Sheet, find_fuzzy_column};

/// Nombre obligatorio de la columna de URLs en el flujo de INSERTs.
pub const URL_COLUMN: &str = "url";

/// Un link extraído de la hoja. `url` es el valor completado con esquema;
/// `original` conserva la celda tal cual (solo recortada). Los duplicados se
/// conservan: cada fila con URL produce su propio registro.
#[derive(Clone, Debug)]
pub struct LinkRecord {
    pub url: String,
    pub original: String,
    pub display_row: usize,
    pub row_index: usize,
    pub cant_especulada: Option<String>,
    pub overrides: HashMap<String, String>,
}

/// Recorre las filas y produce un registro por celda de URL no vacía. Si la
/// hoja trae una columna `cant_especulada` (resuelta de forma difusa), su
/// valor acompaña al link.
pub fn extract_links(sheet: &Sheet, url_column: usize) -> Vec<LinkRecord> {
    let cant_column = find_fuzzy_column(&sheet.headers, "cant_especulada");

    sheet
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let value = row.get(url_column).map(|cell| cell.trim()).unwrap_or("");
            if value.is_empty() {
                return None;
            }

            let cant_especulada = cant_column
                .and_then(|column| row.get(column))
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty())
                .map(str::to_string);

            Some(LinkRecord {
                url: complete_url(value),
                original: value.to_string(),
                display_row: Sheet::display_row(index),
                row_index: index,
                cant_especulada,
                overrides: HashMap::new(),
            })
        })
        .collect()
}
