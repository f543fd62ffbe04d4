//! Bucle interactivo: comandos del flujo de INSERTs y del flujo de
//! conciliación sobre un estado compartido.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use console::style;

use crate::config::{TableConfig, TagsConfig};
use crate::export::{self, ExportFormat, Partition};
use crate::matcher;
use crate::queries;
use crate::session::{GeneratorSession, ReconcileSession, RuleReport};
use crate::tabular::{self, SheetSource};
use crate::ui;

const DEFAULT_CONFIG: &str = "config.json";
const DEFAULT_TAGS_CONFIG: &str = "tags-config.json";
const DEFAULT_QUERY_FILE: &str = "queries_insert.txt";

pub fn run() -> Result<(), String> {
    let mut state = AppState::new();

    ui::render_header();
    state.load_startup_config();
    ui::render_intro();

    let mut input = String::new();
    loop {
        match read_user_input(&mut input) {
            Ok(None) => {
                println!("\n{}", style("Fin de la entrada. ¡Hasta luego!").dim());
                break;
            }
            Ok(Some(line)) => {
                if line.is_empty() {
                    continue;
                }

                if matches_command(&line, &["exit", "salir"]) {
                    println!("{}", style("Hasta luego!").dim());
                    break;
                }

                if matches_command(&line, &["ayuda", "help"]) {
                    ui::render_help();
                    continue;
                }

                if let Err(message) = handle_input(&mut state, &line) {
                    eprintln!("{message}");
                }
            }
            Err(error) => {
                eprintln!("Error al leer la entrada: {error}");
            }
        }
    }

    Ok(())
}

fn matches_command(input: &str, aliases: &[&str]) -> bool {
    aliases
        .iter()
        .any(|alias| input.eq_ignore_ascii_case(alias))
}

struct AppState {
    table_config: Option<TableConfig>,
    tags_config: TagsConfig,
    generator: Option<GeneratorSession>,
    reconcile: Option<ReconcileSession>,
}

impl AppState {
    fn new() -> Self {
        Self {
            table_config: None,
            tags_config: TagsConfig::default(),
            generator: None,
            reconcile: None,
        }
    }

    /// Busca `config.json` y `tags-config.json` en el directorio actual. La
    /// configuración de tabla puede cargarse después con `config <ruta>`.
    fn load_startup_config(&mut self) {
        match TableConfig::load(Path::new(DEFAULT_CONFIG)) {
            Ok(config) => {
                println!(
                    "{}",
                    style(format!(
                        "Configuración cargada: tabla `{}` con {} campos.",
                        config.table_name,
                        config.fields.len()
                    ))
                    .dim()
                );
                ui::render_schema(&config);
                self.table_config = Some(config);
            }
            Err(_) => {
                println!(
                    "{}",
                    style("No se encontró config.json en el directorio actual. Usa `config <ruta>` antes de generar queries.")
                        .yellow()
                );
            }
        }

        if let Ok(tags) = TagsConfig::load(Path::new(DEFAULT_TAGS_CONFIG)) {
            println!(
                "{}",
                style(format!(
                    "Etiquetas configuradas para {} columnas.",
                    tags.column_mappings.len()
                ))
                .dim()
            );
            self.tags_config = tags;
        }
    }

    fn table_config(&self) -> Result<&TableConfig, String> {
        self.table_config
            .as_ref()
            .ok_or_else(|| "Error: Configuración de tabla no cargada".to_string())
    }

    fn generator_ref(&self) -> Result<&GeneratorSession, String> {
        self.generator
            .as_ref()
            .ok_or_else(|| "No hay un archivo cargado. Usa `cargar <archivo>` primero.".to_string())
    }

    fn generator_mut(&mut self) -> Result<&mut GeneratorSession, String> {
        self.generator
            .as_mut()
            .ok_or_else(|| "No hay un archivo cargado. Usa `cargar <archivo>` primero.".to_string())
    }

    fn reconcile_ref(&self) -> Result<&ReconcileSession, String> {
        self.reconcile.as_ref().ok_or_else(|| {
            "No hay un libro de conciliación cargado. Usa `validar <archivo>` primero.".to_string()
        })
    }

    fn reconcile_mut(&mut self) -> Result<&mut ReconcileSession, String> {
        self.reconcile.as_mut().ok_or_else(|| {
            "No hay un libro de conciliación cargado. Usa `validar <archivo>` primero.".to_string()
        })
    }
}

fn handle_input(state: &mut AppState, raw_input: &str) -> Result<(), String> {
    let trimmed = raw_input.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or("");
    let remainder = trimmed[command.len()..].trim();

    match command.to_ascii_lowercase().as_str() {
        "cargar" | "abrir" => load_generator(state, remainder),
        "vista" | "preview" => {
            let session = state.generator_ref()?;
            ui::render_preview(&session.sheet, &state.tags_config);
            Ok(())
        }
        "links" | "listar" => {
            let session = state.generator_ref()?;
            ui::render_links(&session.links);
            Ok(())
        }
        "global" => set_global_value(state, remainder),
        "link" => set_link_value(state, remainder),
        "etiquetas" => set_tags_mode(state, remainder),
        "completo" => set_full_mode(state, remainder),
        "extra" => set_extra_options(state, remainder),
        "generar" => generate(state),
        "guardar" => save_query(state, remainder),
        "validar" | "conciliar" => load_reconcile(state, remainder),
        "regla" => apply_rule(state, remainder),
        "resultados" => show_results(state),
        "exportar" => export_results(state, remainder),
        "config" => load_config(state, remainder),
        _ => Err("Comando no reconocido. Escribe 'ayuda' para ver los comandos.".to_string()),
    }
}

fn load_generator(state: &mut AppState, remainder: &str) -> Result<(), String> {
    if remainder.is_empty() {
        return Err("Debes indicar la ruta del archivo a cargar.".to_string());
    }
    let config = state.table_config()?.clone();
    let path = PathBuf::from(remainder);
    let (sheet, kind) = tabular::load_sheet(&path)?;
    let session = GeneratorSession::new(path, sheet, kind, &config)?;

    println!(
        "{}",
        style(format!(
            "Archivo {} cargado: `{}`.",
            kind.label(),
            session.source.display()
        ))
        .green()
    );
    ui::render_preview(&session.sheet, &state.tags_config);
    ui::render_links(&session.links);
    state.generator = Some(session);
    Ok(())
}

fn set_global_value(state: &mut AppState, remainder: &str) -> Result<(), String> {
    let (field_name, value) = split_first(remainder);
    if field_name.is_empty() {
        return Err("Uso: global <campo> [valor]. Sin valor, limpia el campo.".to_string());
    }

    if field_name == "options" {
        return Err(
            "El campo `options` se configura con los comandos `etiquetas`, `completo` y `extra`."
                .to_string(),
        );
    }
    let config = state.table_config()?.clone();
    validate_editable_field(&config, field_name, value)?;

    let session = state.generator_mut()?;
    session
        .global_values
        .insert(field_name.to_string(), value.to_string());
    session.invalidate_query();

    if value.is_empty() {
        println!("{}", style(format!("Campo `{field_name}` limpiado.")).dim());
    } else {
        println!(
            "{}",
            style(format!("Campo `{field_name}` = {value}")).dim()
        );
    }
    Ok(())
}

fn set_link_value(state: &mut AppState, remainder: &str) -> Result<(), String> {
    let (number_text, rest) = split_first(remainder);
    let (field_name, value) = split_first(rest);
    if number_text.is_empty() || field_name.is_empty() {
        return Err("Uso: link <n> <campo> [valor]. Sin valor, quita el override.".to_string());
    }
    let number: usize = number_text
        .parse()
        .map_err(|_| "El número de link debe ser un entero positivo.".to_string())?;

    let config = state.table_config()?.clone();
    if field_name != "options" {
        validate_editable_field(&config, field_name, value)?;
    }

    let session = state.generator_mut()?;
    let link = session
        .link_mut(number)
        .ok_or_else(|| "Número de link fuera de rango. Usa `links` para ver la lista.".to_string())?;

    if value.is_empty() {
        link.overrides.remove(field_name);
        println!(
            "{}",
            style(format!("Override de `{field_name}` quitado para el link {number}.")).dim()
        );
    } else {
        link.overrides
            .insert(field_name.to_string(), value.to_string());
        println!(
            "{}",
            style(format!("Link {number}: `{field_name}` = {value}")).dim()
        );
    }
    session.invalidate_query();
    Ok(())
}

fn set_tags_mode(state: &mut AppState, remainder: &str) -> Result<(), String> {
    let enabled = parse_switch(remainder, "Uso: etiquetas si|no")?;
    let session = state.generator_mut()?;
    session.options_mode.with_tags = enabled;
    session.invalidate_query();
    println!(
        "{}",
        style(if enabled {
            "El campo options incluirá etiquetas generadas desde las columnas."
        } else {
            "El campo options no incluirá etiquetas."
        })
        .dim()
    );
    Ok(())
}

fn set_full_mode(state: &mut AppState, remainder: &str) -> Result<(), String> {
    let enabled = parse_switch(remainder, "Uso: completo si|no")?;
    let session = state.generator_mut()?;
    session.options_mode.full_columns = enabled;
    session.invalidate_query();
    println!(
        "{}",
        style(if enabled {
            "El campo options incluirá todas las columnas restantes de la hoja."
        } else {
            "El campo options no incluirá columnas adicionales."
        })
        .dim()
    );
    Ok(())
}

fn set_extra_options(state: &mut AppState, remainder: &str) -> Result<(), String> {
    let session = state.generator_mut()?;
    session.options_mode.extra = remainder.to_string();
    session.invalidate_query();

    if remainder.is_empty() {
        println!("{}", style("Opciones extra limpiadas.").dim());
        return Ok(());
    }

    let parsed = queries::parse_extra_options(remainder);
    if parsed.is_empty() {
        println!(
            "{}",
            style("No se pudo interpretar la entrada; no se agregarán opciones extra.").yellow()
        );
    } else {
        println!(
            "{}",
            style(format!("Se registraron {} pares extra.", parsed.len())).dim()
        );
    }
    Ok(())
}

fn generate(state: &mut AppState) -> Result<(), String> {
    let config = state.table_config()?.clone();
    let tags = state.tags_config.clone();
    let session = state.generator_mut()?;

    let query = queries::generate_queries(
        &config,
        &tags,
        &session.sheet,
        &session.links,
        &session.global_values,
        &session.options_mode,
    )?;
    ui::render_query(&query);
    session.query = Some(query);
    Ok(())
}

fn save_query(state: &mut AppState, remainder: &str) -> Result<(), String> {
    let session = state.generator_ref()?;
    let query = session
        .query
        .as_ref()
        .ok_or_else(|| "No hay queries para descargar".to_string())?;

    let path = if remainder.is_empty() {
        PathBuf::from(DEFAULT_QUERY_FILE)
    } else {
        PathBuf::from(remainder)
    };
    export::save_query_txt(query, &path)?;
    println!(
        "{}",
        style(format!("Query guardada en `{}`.", path.display())).green()
    );
    Ok(())
}

fn load_reconcile(state: &mut AppState, remainder: &str) -> Result<(), String> {
    if remainder.is_empty() {
        return Err("Debes indicar la ruta del archivo XLSX a validar.".to_string());
    }
    let path = PathBuf::from(remainder);
    if SheetSource::from_path(&path) != Ok(SheetSource::Excel) {
        return Err(
            "Por favor, selecciona un archivo XLSX válido con 3 hojas: Categorias, Toma, Faltantes"
                .to_string(),
        );
    }

    let workbook = tabular::load_reconcile_workbook(&path)?;
    let exact = matcher::match_exact(&workbook.toma, &workbook.faltantes)?;
    let session = ReconcileSession {
        source: path,
        workbook,
        exact,
        rule: None,
    };

    ui::render_workbook_info(&session.source, &session.workbook);
    ui::render_report(&session.exact, None);

    state.reconcile = Some(session);
    Ok(())
}

fn apply_rule(state: &mut AppState, remainder: &str) -> Result<(), String> {
    let session = state.reconcile_mut()?;

    let report = matcher::match_with_rule(
        &session.workbook.toma,
        &session.workbook.faltantes,
        remainder,
    )?;
    ui::render_report(&report, Some(remainder.trim()));
    session.rule = Some(RuleReport {
        rule: remainder.trim().to_string(),
        report,
    });
    Ok(())
}

fn show_results(state: &mut AppState) -> Result<(), String> {
    let session = state.reconcile_ref()?;
    ui::render_workbook_info(&session.source, &session.workbook);
    match &session.rule {
        Some(rule) => ui::render_report(&rule.report, Some(&rule.rule)),
        None => ui::render_report(&session.exact, None),
    }
    Ok(())
}

fn export_results(state: &mut AppState, remainder: &str) -> Result<(), String> {
    let (partition_text, rest) = split_first(remainder);
    if partition_text.is_empty() {
        return Err(
            "Uso: exportar <partición> [csv|xlsx] [ruta]. Particiones: disponibles, no-disponibles, disponibles-regla, no-disponibles-regla."
                .to_string(),
        );
    }
    let partition = Partition::parse(partition_text)?;

    let (format, path_text) = match split_first(rest) {
        (first, tail) if !first.is_empty() => match export::parse_export_format(first) {
            Ok(format) => (format, tail),
            Err(_) => (ExportFormat::Csv, rest),
        },
        _ => (ExportFormat::Csv, rest),
    };

    let session = state.reconcile_ref()?;
    let report = if partition.rule_mode() {
        &session
            .rule
            .as_ref()
            .ok_or_else(|| {
                "No hay resultados con regla. Corre `regla <regex>` primero.".to_string()
            })?
            .report
    } else {
        &session.exact
    };
    let rows = if partition.include_match() {
        &report.found
    } else {
        &report.missing
    };

    let path = if path_text.is_empty() {
        PathBuf::from(format!(
            "{}.{}",
            partition.default_stem(),
            format.extension()
        ))
    } else {
        PathBuf::from(path_text)
    };

    export::export_partition(
        &session.workbook.faltantes.headers,
        rows,
        partition,
        format,
        &path,
    )?;
    println!(
        "{}",
        style(format!(
            "{} exportado como {} en `{}`.",
            partition.label(),
            format.label(),
            path.display()
        ))
        .green()
    );
    Ok(())
}

fn load_config(state: &mut AppState, remainder: &str) -> Result<(), String> {
    if remainder.is_empty() {
        return Err("Debes indicar la ruta del archivo de configuración.".to_string());
    }
    let path = PathBuf::from(remainder);
    let config = TableConfig::load(&path)?;
    println!(
        "{}",
        style(format!(
            "Configuración cargada: tabla `{}` con {} campos.",
            config.table_name,
            config.fields.len()
        ))
        .green()
    );
    ui::render_schema(&config);
    state.table_config = Some(config);

    let tags_path = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(DEFAULT_TAGS_CONFIG);
    if tags_path.is_file() {
        let tags = TagsConfig::load(&tags_path)?;
        println!(
            "{}",
            style(format!(
                "Etiquetas configuradas para {} columnas.",
                tags.column_mappings.len()
            ))
            .dim()
        );
        state.tags_config = tags;
    }
    Ok(())
}

fn validate_editable_field(
    config: &TableConfig,
    field_name: &str,
    value: &str,
) -> Result<(), String> {
    let field = config
        .field(field_name)
        .ok_or_else(|| format!("El campo `{field_name}` no existe en la configuración."))?;
    if field.from_csv {
        return Err(format!(
            "El campo `{field_name}` se completa desde el archivo y no puede fijarse a mano."
        ));
    }
    if !field.editable {
        return Err(format!("El campo `{field_name}` no es editable."));
    }
    if !value.is_empty()
        && let Some(options) = &field.options
        && !options.iter().any(|option| option.value == value)
    {
        let allowed: Vec<String> = options
            .iter()
            .map(|option| {
                if option.label.is_empty() {
                    option.value.clone()
                } else {
                    format!("{} ({})", option.value, option.label)
                }
            })
            .collect();
        return Err(format!(
            "Valor inválido para `{field_name}`. Opciones: {}",
            allowed.join(", ")
        ));
    }
    Ok(())
}

fn parse_switch(input: &str, usage: &str) -> Result<bool, String> {
    match input.to_lowercase().as_str() {
        "si" | "sí" | "on" => Ok(true),
        "no" | "off" => Ok(false),
        _ => Err(usage.to_string()),
    }
}

/// Separa el primer token del resto de la línea; el resto conserva sus
/// espacios internos.
fn split_first(input: &str) -> (&str, &str) {
    let trimmed = input.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim()),
        None => (trimmed, ""),
    }
}

fn read_user_input(buffer: &mut String) -> io::Result<Option<String>> {
    print!("{} ", style("LinkDesk").bold().cyan());
    print!("{} ", style("›").cyan());
    io::stdout().flush()?;

    buffer.clear();
    let bytes_read = io::stdin().read_line(buffer)?;
    if bytes_read == 0 {
        return Ok(None);
    }

    Ok(Some(buffer.trim_end().to_string()))
}
