//! Serialización de valores a literales SQL seguros, campo por campo.

use std::collections::HashMap;

use crate::config::{FieldSpec, TableConfig};

/// Arma la tupla `(v1, v2, ...)` de una fila siguiendo el orden de
/// declaración de los campos. Los campos sin valor entran como cadena vacía.
pub fn build_values_tuple(config: &TableConfig, values: &HashMap<String, String>) -> String {
    let parts: Vec<String> = config
        .fields
        .iter()
        .map(|field| {
            let value = values.get(&field.name).map(String::as_str).unwrap_or("");
            format_value(value, field)
        })
        .collect();

    format!("({})", parts.join(", "))
}

/// Reglas de serialización: `id` siempre es NULL; el valor literal `NULL`
/// pasa sin comillas; el vacío es `''` solo para
/// `description` y NULL para el resto; `options` y los select siempre van
/// entre comillas aunque parezcan numéricos; los dígitos puros van sin
/// comillas; todo lo demás se cita doblando las comillas simples.
fn format_value(value: &str, field: &FieldSpec) -> String {
    if field.name == "id" {
        return "NULL".to_string();
    }
    if value == "NULL" {
        return "NULL".to_string();
    }
    if value.is_empty() {
        return if field.name == "description" {
            "''".to_string()
        } else {
            "NULL".to_string()
        };
    }
    if field.name == "options" || field.is_select() {
        return quote(value);
    }
    if is_all_digits(value) {
        return value.to_string();
    }
    quote(value)
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}
