//! Exportación de resultados: la query INSERT a TXT y las particiones de la
//! conciliación a CSV o Excel.

use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

use crate::matcher::MatchRow;
use crate::queries::GeneratedQuery;

#[derive(Clone, Copy, Debug)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "Excel",
        }
    }
}

pub fn parse_export_format(input: &str) -> Result<ExportFormat, String> {
    match input.to_lowercase().as_str() {
        "csv" => Ok(ExportFormat::Csv),
        "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
        _ => Err("Formato de exportacion no reconocido".to_string()),
    }
}

/// Particiones exportables de una corrida de conciliación. Las variantes
/// "disponibles" agregan la columna `LINK_DE_CONSULTA_MATCH`, y en modo regla
/// también `PATRON_MATCHEADO`; las variantes faltantes exportan la fila tal
/// cual, sin columnas extra.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Partition {
    Disponibles,
    NoDisponibles,
    DisponiblesConRegla,
    NoDisponiblesConRegla,
}

impl Partition {
    pub fn parse(input: &str) -> Result<Self, String> {
        match input.to_lowercase().replace('_', "-").as_str() {
            "disponibles" => Ok(Partition::Disponibles),
            "no-disponibles" | "faltantes" => Ok(Partition::NoDisponibles),
            "disponibles-regla" => Ok(Partition::DisponiblesConRegla),
            "no-disponibles-regla" | "faltantes-regla" => Ok(Partition::NoDisponiblesConRegla),
            _ => Err(
                "Partición no reconocida. Usa: disponibles, no-disponibles, disponibles-regla o no-disponibles-regla"
                    .to_string(),
            ),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Partition::Disponibles => "Disponibles en Toma",
            Partition::NoDisponibles => "No disponibles",
            Partition::DisponiblesConRegla => "Disponibles con regla",
            Partition::NoDisponiblesConRegla => "No disponibles con regla",
        }
    }

    pub fn default_stem(self) -> &'static str {
        match self {
            Partition::Disponibles => "disponibles_en_toma",
            Partition::NoDisponibles => "no_disponibles",
            Partition::DisponiblesConRegla => "disponibles_en_toma_con_regla",
            Partition::NoDisponiblesConRegla => "no_disponibles_con_regla",
        }
    }

    pub fn include_match(self) -> bool {
        matches!(self, Partition::Disponibles | Partition::DisponiblesConRegla)
    }

    pub fn rule_mode(self) -> bool {
        matches!(
            self,
            Partition::DisponiblesConRegla | Partition::NoDisponiblesConRegla
        )
    }
}

/// Guarda la query en formato de descarga: una tupla por línea.
pub fn save_query_txt(query: &GeneratedQuery, path: &Path) -> Result<(), String> {
    fs::write(path, format!("{}\n", query.export))
        .map_err(|err| format!("No se pudo guardar el TXT: {err}"))
}

pub fn export_partition(
    headers: &[String],
    rows: &[MatchRow],
    partition: Partition,
    format: ExportFormat,
    path: &Path,
) -> Result<(), String> {
    if rows.is_empty() {
        return Err("No hay datos para descargar".to_string());
    }
    match format {
        ExportFormat::Csv => export_partition_csv(headers, rows, partition, path),
        ExportFormat::Xlsx => export_partition_xlsx(headers, rows, partition, path),
    }
}

fn partition_headers(headers: &[String], partition: Partition) -> Vec<String> {
    let mut all: Vec<String> = headers.to_vec();
    if partition.include_match() {
        all.push("LINK_DE_CONSULTA_MATCH".to_string());
        if partition.rule_mode() {
            all.push("PATRON_MATCHEADO".to_string());
        }
    }
    all
}

fn partition_record(row: &MatchRow, partition: Partition) -> Vec<String> {
    let mut record = row.row.clone();
    if partition.include_match() {
        record.push(row.matched.clone().unwrap_or_default());
        if partition.rule_mode() {
            record.push(row.pattern.clone().unwrap_or_default());
        }
    }
    record
}

/// El CSV sale con BOM UTF-8 para que Excel lo abra con la codificación
/// correcta, y solo cita los campos que lo necesitan.
fn export_partition_csv(
    headers: &[String],
    rows: &[MatchRow],
    partition: Partition,
    path: &Path,
) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer
        .write_record(partition_headers(headers, partition))
        .map_err(|err| format!("No se pudo armar el CSV: {err}"))?;
    for row in rows {
        writer
            .write_record(partition_record(row, partition))
            .map_err(|err| format!("No se pudo armar el CSV: {err}"))?;
    }

    let data = writer
        .into_inner()
        .map_err(|err| format!("No se pudo armar el CSV: {err}"))?;
    let mut bytes = Vec::with_capacity(data.len() + 3);
    bytes.extend_from_slice("\u{feff}".as_bytes());
    bytes.extend_from_slice(&data);

    fs::write(path, bytes).map_err(|err| format!("No se pudo guardar el CSV: {err}"))
}

fn export_partition_xlsx(
    headers: &[String],
    rows: &[MatchRow],
    partition: Partition,
    path: &Path,
) -> Result<(), String> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(partition.label())
        .map_err(|err| format!("No se pudo crear hoja de calculo: {err}"))?;

    let all_headers = partition_headers(headers, partition);
    for column in 0..all_headers.len() {
        worksheet
            .set_column_width(column as u16, 28.0)
            .map_err(|err| format!("No se pudo ajustar columnas: {err}"))?;
    }

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x1F4E78))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);

    let cell_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Left);

    for (column, header) in all_headers.iter().enumerate() {
        worksheet
            .write_with_format(0, column as u16, header.as_str(), &header_format)
            .map_err(|err| format!("No se pudo escribir el XLSX: {err}"))?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_index = (index + 1) as u32;
        for (column, value) in partition_record(row, partition).iter().enumerate() {
            worksheet
                .write_with_format(row_index, column as u16, value.as_str(), &cell_format)
                .map_err(|err| format!("No se pudo escribir el XLSX: {err}"))?;
        }
    }

    workbook
        .save(path)
        .map_err(|err| format!("No se pudo guardar el XLSX: {err}"))
}
