// Framework-agnostic HTTP request/response layer.
//
// The filter consumes an `AuthRequest` and produces an `AuthResponse`;
// web-framework integrations convert their own types at the boundary. Only
// what the dispatch flow needs is modeled: method, path, query, headers,
// and redirect responses.

use std::collections::HashMap;

/// A framework-agnostic HTTP request.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// HTTP method (GET, POST, ...).
    pub method: String,
    /// Request path, e.g. "/auth/mock".
    pub path: String,
    /// Raw query string without the leading '?'.
    pub query: Option<String>,
    /// Request headers, lowercased keys.
    pub headers: HashMap<String, String>,
}

impl AuthRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            path: path.into(),
            query: None,
            headers: HashMap::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    /// Header value by name, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|v| v.as_str())
    }

    /// Parsed query parameters, percent-decoded.
    pub fn query_params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        if let Some(ref query) = self.query {
            for pair in query.split('&') {
                if let Some((key, value)) = pair.split_once('=') {
                    params.insert(
                        urlencoding::decode(key).unwrap_or_default().to_string(),
                        urlencoding::decode(value).unwrap_or_default().to_string(),
                    );
                }
            }
        }
        params
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_params().get(name).cloned()
    }
}

/// A framework-agnostic HTTP response. The dispatch flow only ever
/// redirects, but status and headers are open for integrations.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
}

impl AuthResponse {
    /// A 302 redirect to `url`.
    pub fn redirect(url: &str) -> Self {
        let mut headers = HashMap::new();
        headers.insert("location".to_string(), url.to_string());
        Self {
            status: 302,
            headers,
        }
    }

    pub fn is_redirect(&self) -> bool {
        self.status == 302 && self.headers.contains_key("location")
    }

    /// The redirect target, if this is a redirect.
    pub fn location(&self) -> Option<&str> {
        self.headers.get("location").map(|v| v.as_str())
    }
}

/// Append a query parameter to a URL that may already carry a query string.
/// Values are form-encoded.
pub(crate) fn append_query_param(url: &str, name: &str, value: &str) -> String {
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(name, value)
        .finish();
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_decoded() {
        let request = AuthRequest::get("/auth/mock")
            .with_query("connect=true&redirect=https%3A%2F%2Fexample.com");
        let params = request.query_params();
        assert_eq!(params.get("connect"), Some(&"true".to_string()));
        assert_eq!(params.get("redirect"), Some(&"https://example.com".to_string()));
    }

    #[test]
    fn test_query_param_absent() {
        let request = AuthRequest::get("/auth/mock");
        assert!(request.query_param("connect").is_none());
    }

    #[test]
    fn test_header_case_insensitive() {
        let request = AuthRequest::get("/auth/mock").with_header("X-Forwarded-For", "1.2.3.4");
        assert_eq!(request.header("x-forwarded-for"), Some("1.2.3.4"));
        assert_eq!(request.header("X-FORWARDED-FOR"), Some("1.2.3.4"));
    }

    #[test]
    fn test_redirect_response() {
        let response = AuthResponse::redirect("/signin");
        assert_eq!(response.status, 302);
        assert!(response.is_redirect());
        assert_eq!(response.location(), Some("/signin"));
    }

    #[test]
    fn test_append_query_param() {
        assert_eq!(
            append_query_param("/signin", "error", "UNKNOWN_PROVIDER"),
            "/signin?error=UNKNOWN_PROVIDER"
        );
        assert_eq!(
            append_query_param("/signin?retry=true", "error", "AMBIGUOUS_ACCOUNT"),
            "/signin?retry=true&error=AMBIGUOUS_ACCOUNT"
        );
    }
}
