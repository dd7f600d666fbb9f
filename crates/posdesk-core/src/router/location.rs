/// A navigation target: a path plus ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: normalize_path(&path.into()),
            query: Vec::new(),
        }
    }

    /// Parse `path?k=v&k2=v2`. Any `#fragment` is dropped.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.split('#').next().unwrap_or_default();
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (raw, Vec::new()),
        };
        Self {
            path: normalize_path(path),
            query,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// First value for `key`
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn full_path(&self) -> String {
        full_path(&self.path, &self.query)
    }
}

impl From<&str> for Location {
    fn from(raw: &str) -> Self {
        Location::parse(raw)
    }
}

impl From<String> for Location {
    fn from(raw: String) -> Self {
        Location::parse(&raw)
    }
}

pub(crate) fn full_path(path: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let rendered: Vec<String> = query
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect();
    format!("{}?{}", path, rendered.join("&"))
}

/// Leading slash, no trailing slash (except the root), no empty segments
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode_component(k), decode_component(v)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// Percent-encode a query key or value. Path punctuation such as `/` and `:`
/// stays readable, so `redirect=/app/products` round-trips as written.
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => out.push(byte as char),
            b'-' | b'_' | b'.' | b'~' | b'/' | b':' | b'@' | b'!' | b'$' | b'\'' | b'(' | b')'
            | b'*' | b',' | b';' | b'?' => out.push(byte as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn decode_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi * 16 + lo) as u8);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_and_query() {
        let loc = Location::parse("/login?redirect=/app/products&x=1#top");
        assert_eq!(loc.path, "/login");
        assert_eq!(loc.query_value("redirect"), Some("/app/products"));
        assert_eq!(loc.query_value("x"), Some("1"));
        assert_eq!(loc.query_value("missing"), None);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(Location::new("app/products/").path, "/app/products");
        assert_eq!(Location::new("").path, "/");
        assert_eq!(Location::new("//app//sales").path, "/app/sales");
    }

    #[test]
    fn test_full_path_keeps_slashes_readable() {
        let loc = Location::new("/login").with_query("redirect", "/app/products");
        assert_eq!(loc.full_path(), "/login?redirect=/app/products");
    }

    #[test]
    fn test_nested_query_is_escaped() {
        let inner = "/app/reports?from=2024-01-01&to=2024-01-31";
        let loc = Location::new("/login").with_query("redirect", inner);
        let rendered = loc.full_path();
        assert_eq!(
            rendered,
            "/login?redirect=/app/reports?from%3D2024-01-01%26to%3D2024-01-31"
        );
        assert_eq!(Location::parse(&rendered).query_value("redirect"), Some(inner));
    }

    #[test]
    fn test_decode_component() {
        assert_eq!(decode_component("a+b%20c"), "a b c");
        assert_eq!(decode_component("%E1%80%80"), "\u{1000}");
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz"), "%zz");
    }
}
