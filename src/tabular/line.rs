//! Partición de líneas CSV tolerante a dialectos: comillas dobles escapadas,
//! comillas sin cerrar y campos malformados nunca abortan el parseo.

/// Detecta el delimitador contando `,` y `;` fuera de comillas sobre la línea
/// de encabezados. El punto y coma gana solo con mayoría estricta.
pub fn detect_delimiter(header_line: &str) -> char {
    let chars: Vec<char> = header_line.chars().collect();
    let mut commas = 0usize;
    let mut semicolons = 0usize;
    let mut in_quotes = false;
    let mut i = 0usize;

    while i < chars.len() {
        match chars[i] {
            '"' => {
                if in_quotes && i + 1 < chars.len() && chars[i + 1] == '"' {
                    i += 1;
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => commas += 1,
            ';' if !in_quotes => semicolons += 1,
            _ => {}
        }
        i += 1;
    }

    if semicolons > commas { ';' } else { ',' }
}

/// Corta una línea en campos según `delimiter`. Dentro de comillas, `""` es
/// una comilla literal; una comilla seguida de cualquier otro carácter cierra
/// el campo a la fuerza y la comilla suelta se descarta. Al final cada campo
/// pierde un par de comillas envolventes, colapsa `""` en `"` y se recorta.
pub fn parse_line(line: &str, delimiter: char) -> Vec<String> {
    let chars: Vec<char> = line.trim().chars().collect();
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut i = 0usize;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '"' {
            if in_quotes {
                let next = chars.get(i + 1).copied();
                if next == Some('"') {
                    current.push('"');
                    i += 2;
                    continue;
                } else if next == Some(delimiter) {
                    in_quotes = false;
                    fields.push(current.clone());
                    current.clear();
                    i += 2;
                    continue;
                } else if next.is_none() || next == Some('\n') || next == Some('\r') {
                    in_quotes = false;
                    break;
                } else {
                    in_quotes = false;
                }
            } else {
                in_quotes = true;
            }
            i += 1;
        } else if ch == delimiter && !in_quotes {
            fields.push(current.clone());
            current.clear();
            i += 1;
        } else {
            current.push(ch);
            i += 1;
        }
    }
    fields.push(current);

    fields
        .into_iter()
        .map(|field| {
            let mut field = field;
            if field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
                field = field[1..field.len() - 1].to_string();
            }
            field.replace("\"\"", "\"").trim().to_string()
        })
        .collect()
}
