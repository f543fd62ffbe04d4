//! Estado de cada flujo de trabajo. Cargar un archivo nuevo reemplaza la
//! sesión completa del flujo correspondiente.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::TableConfig;
use crate::links::{LinkRecord, URL_COLUMN, extract_links};
use crate::matcher::MatchReport;
use crate::queries::{GeneratedQuery, OptionsMode};
use crate::tabular::{ReconcileWorkbook, Sheet, SheetSource, find_column};

/// Sesión del flujo de generación de INSERTs: la hoja cargada, los links
/// extraídos y la configuración de valores acumulada por el usuario.
pub struct GeneratorSession {
    pub source: PathBuf,
    pub sheet: Sheet,
    pub links: Vec<LinkRecord>,
    pub global_values: HashMap<String, String>,
    pub options_mode: OptionsMode,
    pub query: Option<GeneratedQuery>,
}

impl GeneratorSession {
    /// Arma la sesión validando que exista la columna `url`. Los valores
    /// globales arrancan con los defaults del esquema.
    pub fn new(
        source: PathBuf,
        sheet: Sheet,
        kind: SheetSource,
        config: &TableConfig,
    ) -> Result<Self, String> {
        let url_column = find_column(&sheet.headers, URL_COLUMN).ok_or_else(|| {
            format!(
                "El archivo {} debe contener una columna llamada \"url\"",
                kind.label()
            )
        })?;

        let links = extract_links(&sheet, url_column);
        let mut global_values = HashMap::new();
        for field in &config.fields {
            if field.from_csv || field.name == "options" {
                continue;
            }
            let initial = field.default.clone().unwrap_or_default();
            global_values.insert(field.name.clone(), initial);
        }

        Ok(Self {
            source,
            sheet,
            links,
            global_values,
            options_mode: OptionsMode::default(),
            query: None,
        })
    }

    /// Cualquier cambio de valores invalida la query ya generada.
    pub fn invalidate_query(&mut self) {
        self.query = None;
    }

    pub fn link_mut(&mut self, number: usize) -> Option<&mut LinkRecord> {
        if number == 0 {
            return None;
        }
        self.links.get_mut(number - 1)
    }
}

/// Resultado de aplicar una regla regex sobre el libro de conciliación.
pub struct RuleReport {
    pub rule: String,
    pub report: MatchReport,
}

/// Sesión del flujo de conciliación: el libro cargado, el matcheo exacto que
/// se corre al abrirlo y la última corrida por regla, si hubo.
pub struct ReconcileSession {
    pub source: PathBuf,
    pub workbook: ReconcileWorkbook,
    pub exact: MatchReport,
    pub rule: Option<RuleReport>,
}
