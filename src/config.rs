//! Configuración declarativa: esquema de la tabla destino (`config.json`) y
//! mapeo de columnas a etiquetas (`tags-config.json`).

use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Esquema de la tabla destino para generar los INSERT. El orden de `fields`
/// define el orden de columnas y de valores en cada tupla.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    pub table_name: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_field_type", rename = "type")]
    pub field_type: String,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default, rename = "fromCSV")]
    pub from_csv: bool,
    #[serde(default, rename = "isURL")]
    pub is_url: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<SelectOption>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SelectOption {
    pub value: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagsConfig {
    #[serde(default)]
    pub column_mappings: Vec<TagMapping>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagMapping {
    pub csv_column: String,
    pub tag_prefix: String,
}

fn default_field_type() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl TableConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|_| {
            format!(
                "Error al cargar la configuración. Por favor, asegúrate de que `{}` existe.",
                path.display()
            )
        })?;
        let config: TableConfig = serde_json::from_str(&content)
            .map_err(|err| format!("La configuración `{}` no es válida: {err}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// El campo que recibe la URL de cada link: `fromCSV` con `isURL`. La
    /// configuración admite a lo sumo uno.
    pub fn url_field(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.from_csv && field.is_url)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn has_options_field(&self) -> bool {
        self.field("options").is_some()
    }

    fn validate(&self) -> Result<(), String> {
        if self.fields.is_empty() {
            return Err("La configuración debe definir al menos un campo".to_string());
        }
        let url_fields = self
            .fields
            .iter()
            .filter(|field| field.from_csv && field.is_url)
            .count();
        if url_fields > 1 {
            return Err(
                "La configuración define más de un campo fromCSV con isURL; debe haber a lo sumo uno"
                    .to_string(),
            );
        }
        Ok(())
    }
}

impl FieldSpec {
    pub fn is_select(&self) -> bool {
        self.field_type == "select"
    }
}

impl TagsConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|_| {
            format!(
                "Error al cargar la configuración de etiquetas. Por favor, asegúrate de que `{}` existe.",
                path.display()
            )
        })?;
        serde_json::from_str(&content).map_err(|err| {
            format!(
                "La configuración de etiquetas `{}` no es válida: {err}",
                path.display()
            )
        })
    }

    /// Una columna es de etiquetas si figura en `columnMappings`, sin
    /// distinguir mayúsculas ni espacios de borde.
    pub fn is_tag_column(&self, header: &str) -> bool {
        let target = header.trim().to_lowercase();
        self.column_mappings
            .iter()
            .any(|mapping| mapping.csv_column.trim().to_lowercase() == target)
    }
}
