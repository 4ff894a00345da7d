use http::Method;
use may_minihttp::Request;
use std::collections::HashMap;
use std::io;

/// Parsed HTTP request data handed to the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: Method,
    /// Request path without the query string.
    pub path: String,
    pub query_params: HashMap<String, String>,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
}

/// Decode the query string of `path` into a map. Repeated keys keep the
/// last value.
#[must_use]
pub fn parse_query_params(path: &str) -> HashMap<String, String> {
    match path.find('?') {
        Some(pos) => url::form_urlencoded::parse(path[pos + 1..].as_bytes())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        None => HashMap::new(),
    }
}

/// Extract method, path, query parameters and headers from a
/// `may_minihttp` request. Request bodies are not consumed here; handlers
/// that need them read from the connection themselves.
pub fn parse_request(req: &Request) -> io::Result<ParsedRequest> {
    let method = Method::from_bytes(req.method().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "invalid request method"))?;

    let raw_path = req.path().to_string();
    let path = raw_path
        .split('?')
        .next()
        .unwrap_or("/")
        .to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let query_params = parse_query_params(&raw_path);

    Ok(ParsedRequest {
        method,
        path,
        query_params,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/p?x=1&y=2");
        assert_eq!(q.get("x"), Some(&"1".to_string()));
        assert_eq!(q.get("y"), Some(&"2".to_string()));
    }

    #[test]
    fn test_parse_query_params_empty() {
        assert!(parse_query_params("/p").is_empty());
        assert!(parse_query_params("/p?").is_empty());
    }

    #[test]
    fn test_parse_query_params_decodes() {
        let q = parse_query_params("/p?name=a%20b&tag=c%2Fd");
        assert_eq!(q.get("name"), Some(&"a b".to_string()));
        assert_eq!(q.get("tag"), Some(&"c/d".to_string()));
    }
}
