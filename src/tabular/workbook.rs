//! Lectura de planillas Excel vía calamine y resolución de las hojas del
//! flujo de conciliación (Categorias, Toma y Faltantes).

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::Sheet;

/// Hojas del libro de conciliación. `Toma` y `Faltantes` son obligatorias;
/// `Categorias` es opcional y solo alimenta el panel informativo.
#[derive(Debug)]
pub struct ReconcileWorkbook {
    pub categorias: Option<Sheet>,
    pub toma: Sheet,
    pub faltantes: Sheet,
}

/// Carga la primera hoja del libro, para el flujo de generación de INSERTs.
pub fn load_first_sheet(path: &Path) -> Result<Sheet, String> {
    let mut workbook = open_workbook(path)?;
    let names = workbook.sheet_names().to_vec();
    let first = names
        .first()
        .ok_or_else(|| "El archivo Excel está vacío".to_string())?;
    let range = read_range(&mut workbook, first)?;
    let sheet = sheet_from_range(&range);

    if sheet.headers.is_empty() && sheet.is_empty() {
        return Err("El archivo Excel está vacío".to_string());
    }
    Ok(sheet)
}

/// Carga el libro de conciliación resolviendo las hojas por nombre sin
/// distinguir mayúsculas ni acentos.
pub fn load_reconcile_workbook(path: &Path) -> Result<ReconcileWorkbook, String> {
    let mut workbook = open_workbook(path)?;
    let names = workbook.sheet_names().to_vec();
    let resolved = resolve_reconcile_sheets(&names)?;

    let categorias = match resolved.categorias {
        Some(name) => Some(sheet_from_range(&read_range(&mut workbook, &name)?)),
        None => None,
    };
    let toma = sheet_from_range(&read_range(&mut workbook, &resolved.toma)?);
    let faltantes = sheet_from_range(&read_range(&mut workbook, &resolved.faltantes)?);

    Ok(ReconcileWorkbook {
        categorias,
        toma,
        faltantes,
    })
}

#[derive(Debug)]
pub(crate) struct ResolvedNames {
    pub categorias: Option<String>,
    pub toma: String,
    pub faltantes: String,
}

pub(crate) fn resolve_reconcile_sheets(names: &[String]) -> Result<ResolvedNames, String> {
    let find = |needle: &str| {
        names
            .iter()
            .find(|name| normalize_sheet_name(name).contains(needle))
            .cloned()
    };

    let categorias = find("categoria");
    let toma = find("toma");
    let faltantes = find("faltante");

    match (toma, faltantes) {
        (Some(toma), Some(faltantes)) => Ok(ResolvedNames {
            categorias,
            toma,
            faltantes,
        }),
        _ => Err(format!(
            "El archivo debe contener las hojas \"Toma\" y \"Faltantes\". Hojas encontradas: {}",
            names.join(", ")
        )),
    }
}

fn normalize_sheet_name(name: &str) -> String {
    name.to_lowercase()
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect()
}

fn open_workbook(path: &Path) -> Result<calamine::Sheets<std::io::BufReader<std::fs::File>>, String> {
    open_workbook_auto(path)
        .map_err(|err| format!("No se pudo abrir el archivo `{}`: {err}", path.display()))
}

fn read_range(
    workbook: &mut calamine::Sheets<std::io::BufReader<std::fs::File>>,
    name: &str,
) -> Result<Range<Data>, String> {
    workbook
        .worksheet_range(name)
        .map_err(|err| format!("No se pudo leer la hoja `{name}`: {err}"))
}

fn sheet_from_range(range: &Range<Data>) -> Sheet {
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let headers = rows.next().unwrap_or_default();
    let data: Vec<Vec<String>> = rows.collect();

    Sheet::assemble(headers, data)
}

/// Toda celda se proyecta a texto: los números enteros quedan sin decimales
/// (`5.0` se muestra como `5`) y las celdas vacías como cadena vacía.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(value) => value.trim().to_string(),
        Data::Empty => String::new(),
        other => format!("{other}").trim().to_string(),
    }
}
