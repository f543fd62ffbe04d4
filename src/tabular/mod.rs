//! Modelo tabular compartido por ambos flujos: encabezados más matriz de celdas.

mod columns;
mod line;
mod text;
mod workbook;

pub use columns::{find_column, find_fuzzy_column, is_cant_especulada_column};
pub use line::{detect_delimiter, parse_line};
pub use text::sheet_from_text;
pub use workbook::{ReconcileWorkbook, load_first_sheet, load_reconcile_workbook};

#[cfg(test)]
mod tests;

use std::fs;
use std::path::Path;

/// Hoja normalizada: la fila 0 del archivo queda como encabezados y el resto
/// como matriz de celdas. Las filas completamente vacías se descartan y las
/// cortas se rellenan con cadenas vacías hasta el ancho de los encabezados;
/// las celdas sobrantes de filas más anchas se conservan.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn assemble(headers: Vec<String>, raw_rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = raw_rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|mut row| {
                while row.len() < width {
                    row.push(String::new());
                }
                row
            })
            .collect();

        Self { headers, rows }
    }

    /// Número de fila tal como lo vería el usuario en el archivo original:
    /// índice de almacenamiento + encabezado + base 1.
    pub fn display_row(index: usize) -> usize {
        index + 2
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetSource {
    Csv,
    Excel,
}

impl SheetSource {
    pub fn label(self) -> &'static str {
        match self {
            SheetSource::Csv => "CSV",
            SheetSource::Excel => "Excel",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, String> {
        let name = path
            .file_name()
            .map(|value| value.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.ends_with(".csv") {
            Ok(SheetSource::Csv)
        } else if name.ends_with(".xlsx") || name.ends_with(".xls") {
            Ok(SheetSource::Excel)
        } else {
            Err("Por favor, selecciona un archivo CSV o XLSX válido".to_string())
        }
    }
}

/// Carga la primera hoja de un archivo CSV/XLSX/XLS según su extensión.
pub fn load_sheet(path: &Path) -> Result<(Sheet, SheetSource), String> {
    let source = SheetSource::from_path(path)?;
    let sheet = match source {
        SheetSource::Csv => {
            let content = fs::read_to_string(path).map_err(|err| {
                format!("No se pudo leer el archivo `{}`: {err}", path.display())
            })?;
            sheet_from_text(&content)?
        }
        SheetSource::Excel => load_first_sheet(path)?,
    };

    Ok((sheet, source))
}
