//! Generación de las queries INSERT: merge de valores globales, overrides por
//! fila y composición final de cada tupla.

mod options;
mod values;

pub use options::{
    EMPTY_OPTIONS, OptionsMode, WITH_TAGS_SENTINEL, build_options_object, collect_tags,
    global_options_value, parse_extra_options,
};
pub use values::build_values_tuple;


use std::collections::HashMap;

use crate::config::{TableConfig, TagsConfig};
use crate::links::LinkRecord;
use crate::tabular::Sheet;

/// Nombre del campo que recibe `cant_especulada` cuando el esquema lo define.
pub const CANT_ESPECULADA_FIELD: &str = "cant_especulada";

/// Query generada lista para mostrar y para guardar. `display` une las tuplas
/// con sangría; `export` pone una tupla por línea.
#[derive(Clone, Debug)]
pub struct GeneratedQuery {
    pub display: String,
    pub export: String,
    pub rows: usize,
}

/// Genera la sentencia INSERT para todos los links extraídos.
///
/// El valor de cada campo se resuelve por capas, de menor a mayor prioridad:
/// valores globales (con sus defaults), overrides no vacíos de la fila,
/// composición de `options`, defaults de relleno, y al final los campos
/// forzados por la fila (`isURL` y `cant_especulada`).
pub fn generate_queries(
    config: &TableConfig,
    tags: &TagsConfig,
    sheet: &Sheet,
    links: &[LinkRecord],
    global_values: &HashMap<String, String>,
    mode: &OptionsMode,
) -> Result<GeneratedQuery, String> {
    if links.is_empty() {
        return Err(
            "No hay links en la columna seleccionada. Por favor, selecciona una columna que contenga datos."
                .to_string(),
        );
    }

    let globals = effective_globals(config, global_values, mode);

    let tuples: Vec<String> = links
        .iter()
        .map(|link| {
            let mut merged = globals.clone();
            for (field, value) in &link.overrides {
                if !value.trim().is_empty() {
                    merged.insert(field.clone(), value.clone());
                }
            }

            if config.has_options_field() {
                let merged_options = merged.get("options").cloned().unwrap_or_default();
                merged.insert(
                    "options".to_string(),
                    build_options_object(sheet, link, tags, mode, &merged_options),
                );
            }

            for field in &config.fields {
                if field.from_csv {
                    continue;
                }
                let empty = merged.get(&field.name).is_none_or(|value| value.is_empty());
                if empty
                    && let Some(default) = &field.default
                    && !default.is_empty()
                {
                    merged.insert(field.name.clone(), default.clone());
                }
            }

            if let Some(url_field) = config.url_field() {
                merged.insert(url_field.name.clone(), link.url.clone());
            }
            if let Some(cant) = &link.cant_especulada
                && config.field(CANT_ESPECULADA_FIELD).is_some()
            {
                merged.insert(CANT_ESPECULADA_FIELD.to_string(), cant.clone());
            }

            build_values_tuple(config, &merged)
        })
        .collect();

    let columns: Vec<String> = config
        .fields
        .iter()
        .map(|field| format!("`{}`", field.name))
        .collect();
    let head = format!("INSERT INTO `{}`({})", config.table_name, columns.join(", "));

    Ok(GeneratedQuery {
        display: format!("{head} VALUES\n    {};", tuples.join(",\n    ")),
        export: format!("{head}\nVALUES\n{};", tuples.join(",\n")),
        rows: tuples.len(),
    })
}

/// Valores globales efectivos: solo campos que no vienen del archivo, con el
/// centinela de `options` según el modo y los defaults aplicados sobre vacío.
fn effective_globals(
    config: &TableConfig,
    global_values: &HashMap<String, String>,
    mode: &OptionsMode,
) -> HashMap<String, String> {
    let mut globals = HashMap::new();
    for field in &config.fields {
        if field.from_csv {
            continue;
        }
        let mut value = if field.name == "options" {
            global_options_value(mode)
        } else {
            global_values.get(&field.name).cloned().unwrap_or_default()
        };
        if value.is_empty()
            && let Some(default) = &field.default
        {
            value = default.clone();
        }
        globals.insert(field.name.clone(), value);
    }
    globals
}
