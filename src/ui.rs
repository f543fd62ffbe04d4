//! Presentación en terminal: encabezado, ayuda y tablas de vista previa,
//! links y resultados de conciliación.

use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Row, Table};
use console::style;

use crate::config::{TableConfig, TagsConfig};
use crate::formatting::{pluralize, truncate_cell};
use crate::links::{LinkRecord, is_valid_url};
use crate::matcher::{self, COLUMN_LINK_CONSULTA, COLUMN_LINK_FALTANTE, MatchReport};
use crate::queries::GeneratedQuery;
use crate::tabular::{ReconcileWorkbook, Sheet, is_cant_especulada_column};

const HEADER_WIDTH: usize = 74;
const PREVIEW_ROWS: usize = 2;
const PREVIEW_CELL_LIMIT: usize = 50;

pub fn render_header() {
    let border = "─".repeat(HEADER_WIDTH - 2);
    println!("\n{}", style(format!("┌{}┐", border)).cyan());
    println!(
        "{}",
        style(format!(
            "│ {:^inner_width$} │",
            "▸ LinkDesk · Queries INSERT y Conciliación de Links ◂",
            inner_width = HEADER_WIDTH - 4
        ))
        .cyan()
        .bold()
    );
    println!("{}\n", style(format!("└{}┘", border)).cyan());
}

pub fn render_intro() {
    println!(
        "{}",
        style("Flujo de INSERTs: `cargar <archivo.csv|xlsx>` y luego `generar`.").dim()
    );
    println!(
        "{}",
        style("Flujo de conciliación: `validar <archivo.xlsx>` y opcionalmente `regla <regex>`.")
            .dim()
    );
    println!(
        "{}\n",
        style("Escribe 'ayuda' para ver todos los comandos, 'salir' para terminar.").dim()
    );
}

pub fn render_help() {
    let commands = [
        ("cargar <archivo>", "Carga un CSV/XLSX y extrae los links (alias: abrir)"),
        ("vista", "Vuelve a mostrar la vista previa de la hoja cargada"),
        ("links", "Lista los links extraídos"),
        ("global <campo> [valor]", "Fija un valor global; sin valor lo limpia"),
        ("link <n> <campo> [valor]", "Fija un valor solo para el link n"),
        ("etiquetas si|no", "Genera el campo options con etiquetas de columnas"),
        ("completo si|no", "Vuelca todas las columnas restantes dentro de options"),
        ("extra [pares]", "Opciones extra: JSON o pares `clave: valor`; vacío limpia"),
        ("generar", "Genera la query INSERT para todos los links"),
        ("guardar [ruta]", "Guarda la query generada en TXT"),
        ("validar <archivo>", "Carga el libro Toma/Faltantes y matchea (alias: conciliar)"),
        ("regla <regex>", "Reclasifica Faltantes con una regla regex"),
        ("resultados", "Vuelve a mostrar los resultados de conciliación"),
        ("exportar <partición> [csv|xlsx] [ruta]", "Exporta una partición de resultados"),
        ("config <ruta>", "Carga otra configuración de tabla"),
        ("ayuda", "Muestra esta ayuda (alias: help)"),
        ("salir", "Termina la sesión (alias: exit)"),
    ];

    let mut table = base_table();
    table.set_header(vec![header_cell("Comando"), header_cell("Descripción")]);
    for (command, description) in commands {
        table.add_row(Row::from(vec![
            label_cell(command),
            Cell::new(description).fg(Color::White),
        ]));
    }

    println!("\n{table}\n");
}

/// Esquema cargado: un renglón por campo con su etiqueta, tipo, origen del
/// valor y default. Sirve de referencia para `global` y `link`.
pub fn render_schema(config: &TableConfig) {
    let mut table = base_table();
    table.set_header(vec![
        header_cell("Campo"),
        header_cell("Etiqueta"),
        header_cell("Tipo"),
        header_cell("Origen"),
        header_cell("Default"),
    ]);

    for field in &config.fields {
        let tipo = match &field.options {
            Some(options) => {
                let values: Vec<&str> =
                    options.iter().map(|option| option.value.as_str()).collect();
                format!("{} ({})", field.field_type, values.join(" | "))
            }
            None => field.field_type.clone(),
        };
        let origen = if field.from_csv {
            "archivo"
        } else if field.editable {
            "editable"
        } else {
            "fijo"
        };
        let default = match (&field.default, &field.placeholder) {
            (Some(default), _) if !default.is_empty() => default.clone(),
            (_, Some(hint)) => format!("ej. {hint}"),
            _ => "-".to_string(),
        };
        table.add_row(Row::from(vec![
            label_cell(&field.name),
            Cell::new(&field.label).fg(Color::White),
            Cell::new(tipo).fg(Color::White),
            Cell::new(origen).fg(Color::White),
            Cell::new(default).fg(Color::White),
        ]));
    }

    println!("{table}");
}

pub fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
        .add_attribute(Attribute::Underlined)
}

pub fn label_cell(text: &str) -> Cell {
    Cell::new(text).fg(Color::Rgb {
        r: 160,
        g: 196,
        b: 255,
    })
}

/// Vista previa de la hoja: encabezados con marcas para las columnas de
/// etiquetas y de cantidad, y las primeras filas de datos.
pub fn render_preview(sheet: &Sheet, tags: &TagsConfig) {
    let mut table = base_table();
    table.set_header(
        sheet
            .headers
            .iter()
            .map(|header| {
                let mut text = header.clone();
                if tags.is_tag_column(header) {
                    text.push_str(" [etiqueta]");
                }
                if is_cant_especulada_column(header) {
                    text.push_str(" [cant]");
                }
                header_cell(&text)
            })
            .collect::<Vec<Cell>>(),
    );

    for row in sheet.rows.iter().take(PREVIEW_ROWS) {
        table.add_row(Row::from(
            row.iter()
                .map(|cell| Cell::new(truncate_cell(cell, PREVIEW_CELL_LIMIT)).fg(Color::White))
                .collect::<Vec<Cell>>(),
        ));
    }

    println!("\n{}", style("Vista previa").cyan().bold());
    println!("{table}");
    println!(
        "{}\n",
        style(format!(
            "Mostrando {} de {} filas",
            sheet.rows.len().min(PREVIEW_ROWS),
            sheet.rows.len()
        ))
        .dim()
    );
}

pub fn render_links(links: &[LinkRecord]) {
    if links.is_empty() {
        println!(
            "\n{}\n",
            style("No se encontraron links en la columna \"url\".").yellow()
        );
        return;
    }

    let mut table = base_table();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Fila"),
        header_cell("Link"),
        header_cell("Cant. especulada"),
    ]);
    for (index, link) in links.iter().enumerate() {
        let is_url = is_valid_url(&link.url)
            || link.url.starts_with("http://")
            || link.url.starts_with("https://");
        let link_cell = if is_url {
            Cell::new(&link.url).fg(Color::Cyan)
        } else {
            Cell::new(&link.original).fg(Color::White)
        };
        table.add_row(Row::from(vec![
            Cell::new(format!("{:>2}", index + 1)).fg(Color::White),
            Cell::new(link.display_row).fg(Color::White),
            link_cell,
            Cell::new(link.cant_especulada.as_deref().unwrap_or("-")).fg(Color::White),
        ]));
    }

    println!(
        "\n{}",
        style(pluralize(
            links.len(),
            "link encontrado",
            "links encontrados"
        ))
        .cyan()
        .bold()
    );
    println!("{table}\n");
}

pub fn render_query(query: &GeneratedQuery) {
    println!(
        "\n{}",
        style(format!(
            "Query generada para {}",
            pluralize(query.rows, "link", "links")
        ))
        .cyan()
        .bold()
    );
    println!("{}\n", query.display);
}

/// Panel informativo del libro de conciliación: filas por hoja y cantidad de
/// URLs válidas en Toma y Faltantes.
pub fn render_workbook_info(source: &Path, workbook: &ReconcileWorkbook) {
    println!(
        "\n{}",
        style(format!("Libro cargado: `{}`", source.display()))
            .cyan()
            .bold()
    );

    let mut table = base_table();
    table.set_header(vec![header_cell("Hoja"), header_cell("Detalle")]);

    let categorias = match &workbook.categorias {
        Some(sheet) => format!("{} filas", sheet.rows.len()),
        None => "No encontrada".to_string(),
    };
    table.add_row(Row::from(vec![
        label_cell("Categorias"),
        Cell::new(categorias).fg(Color::White),
    ]));
    table.add_row(Row::from(vec![
        label_cell("Toma"),
        Cell::new(format!(
            "{} filas con URLs",
            matcher::count_valid_url_rows(&workbook.toma, COLUMN_LINK_CONSULTA)
        ))
        .fg(Color::White),
    ]));
    table.add_row(Row::from(vec![
        label_cell("Faltantes"),
        Cell::new(format!(
            "{} filas con URLs",
            matcher::count_valid_url_rows(&workbook.faltantes, COLUMN_LINK_FALTANTE)
        ))
        .fg(Color::White),
    ]));

    println!("{table}\n");
}

/// Resultados de una corrida: tabla de encontrados y tabla de faltantes. En
/// modo regla la tabla de encontrados agrega el patrón extraído.
pub fn render_report(report: &MatchReport, rule: Option<&str>) {
    if let Some(rule) = rule {
        println!("\n{}", style(format!("Regla aplicada: {rule}")).cyan());
    }
    println!(
        "{} {}",
        style(format!("✅ Encontrados: {}", report.found.len())).green(),
        style(format!("❌ No encontrados: {}", report.missing.len())).red()
    );

    if !report.found.is_empty() {
        let mut table = base_table();
        let mut headers = vec![
            header_cell("Fila"),
            header_cell("Link Faltante"),
            header_cell("Link de Consulta"),
        ];
        if rule.is_some() {
            headers.push(header_cell("Patrón"));
        }
        table.set_header(headers);

        for row in &report.found {
            let mut cells = vec![
                Cell::new(row.display_row).fg(Color::White),
                Cell::new(&row.link).fg(Color::White),
                Cell::new(row.matched.as_deref().unwrap_or("-")).fg(Color::Green),
            ];
            if rule.is_some() {
                cells.push(Cell::new(row.pattern.as_deref().unwrap_or("-")).fg(Color::Cyan));
            }
            table.add_row(Row::from(cells));
        }

        println!("\n{}", style("Disponibles en Toma").green().bold());
        println!("{table}");
    }

    if !report.missing.is_empty() {
        let mut table = base_table();
        table.set_header(vec![header_cell("Fila"), header_cell("Link Faltante")]);

        for row in &report.missing {
            table.add_row(Row::from(vec![
                Cell::new(row.display_row).fg(Color::White),
                Cell::new(&row.link).fg(Color::White),
            ]));
        }

        println!("\n{}", style("No disponibles").red().bold());
        println!("{table}");
    }

    println!();
}
