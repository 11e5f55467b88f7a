// range.rs
//
// Cabeceras de paginación de PostgREST: `Range: a-b` en la petición y
// `Content-Range: a-b/total` en la respuesta.

/// Valor parseado de `Content-Range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    /// `None` cuando la respuesta no trae filas (`*/total`).
    pub span: Option<(u64, u64)>,
    /// `None` cuando el servidor no contó (`a-b/*`).
    pub total: Option<u64>,
}

/// Acepta `0-8/42`, `*/0` y `9-17/*`. Cualquier otra forma es `None`.
pub fn parse_content_range(header: &str) -> Option<ContentRange> {
    let value = header.trim();
    // algunos proxies anteponen la unidad
    let value = value.strip_prefix("items ").unwrap_or(value);
    let (span, total) = value.split_once('/')?;
    let total = match total.trim() {
        "*" => None,
        t => Some(t.parse::<u64>().ok()?),
    };
    let span = match span.trim() {
        "*" => None,
        s => {
            let (from, to) = s.split_once('-')?;
            Some((from.trim().parse().ok()?, to.trim().parse().ok()?))
        }
    };
    Some(ContentRange { span, total })
}

/// Número de páginas para `total` filas.
pub fn page_count(total: u64, page_size: u64) -> u64 {
    let size = page_size.max(1);
    total.div_ceil(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_usual_forms() {
        assert_eq!(parse_content_range("9-17/42"),
                   Some(ContentRange { span: Some((9, 17)), total: Some(42) }));
        assert_eq!(parse_content_range("*/0"), Some(ContentRange { span: None, total: Some(0) }));
        assert_eq!(parse_content_range("0-8/*").and_then(|r| r.total), None);
        assert_eq!(parse_content_range("items 0-8/10").and_then(|r| r.total), Some(10));
        assert_eq!(parse_content_range("garbage"), None);
        assert_eq!(parse_content_range("1-x/3"), None);
    }

    #[test]
    fn pages() {
        assert_eq!(page_count(42, 9), 5);
        assert_eq!(page_count(0, 9), 0);
        assert_eq!(page_count(9, 0), 9);
    }
}
