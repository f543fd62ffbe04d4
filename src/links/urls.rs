//! Normalización y validación de URLs. La comparación entre hojas usa la
//! forma normalizada; la validación acepta URLs absolutas http(s) o, como
//! respaldo, cadenas con forma de dominio.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

struct UrlPatterns {
    permissive: Regex,
    domain: Regex,
    subdomain: Regex,
}

fn patterns() -> &'static UrlPatterns {
    static PATTERNS: OnceLock<UrlPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| UrlPatterns {
        permissive: Regex::new(r"(?i)^(https?://)?([\da-z.-]+)\.([a-z.]{2,6})([/\w .-]*)*/?$")
            .unwrap(),
        domain: Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]*\.[a-zA-Z]{2,}").unwrap(),
        subdomain: Regex::new(
            r"^[a-zA-Z0-9][a-zA-Z0-9-]*\.[a-zA-Z0-9][a-zA-Z0-9-]*\.[a-zA-Z]{2,}",
        )
        .unwrap(),
    })
}

/// Forma canónica para comparar URLs: sin barras finales, en minúsculas y sin
/// el prefijo `http://` o `https://`.
pub fn normalize_url(url: &str) -> String {
    let lowered = url.trim_end_matches('/').to_lowercase();
    let stripped = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    stripped.trim().to_string()
}

/// Antepone `https://` a los valores con forma de dominio. Las URLs que ya
/// traen esquema y los valores sin forma de dominio quedan intactos.
pub fn complete_url(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_string();
    }
    if looks_like_domain(trimmed) {
        format!("https://{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Valida primero con un parseo estricto que solo acepta `http`/`https`; si el
/// valor ni siquiera parsea como URL absoluta, cae a un patrón permisivo de
/// dominio. Un esquema distinto de http(s) se rechaza sin respaldo.
pub fn is_valid_url(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    match Url::parse(trimmed) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => patterns().permissive.is_match(trimmed),
    }
}

fn looks_like_domain(value: &str) -> bool {
    let patterns = patterns();
    patterns.domain.is_match(value) || patterns.subdomain.is_match(value)
}
