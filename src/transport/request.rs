use std::fmt;
use std::sync::Arc;

use crate::error::SmsError;
use crate::signing::percent_encode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// How the body bytes are encoded.
pub enum BodyKind {
    #[default]
    None,
    Raw,
    Json,
    Form,
}

impl BodyKind {
    /// Default `Content-Type` for this body kind, if any.
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            Self::None | Self::Raw => None,
            Self::Json => Some("application/json"),
            Self::Form => Some("application/x-www-form-urlencoded"),
        }
    }
}

/// Verdict over a raw `(status, body)` pair returned by the executor.
pub type ResponseHandler = Arc<dyn Fn(u16, &[u8]) -> Result<(), SmsError> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Pure description of the HTTP request a transformer wants executed.
pub struct HttpRequestSpec {
    pub method: HttpMethod,
    pub url: String,
    /// Header names as sent on the wire, in insertion order.
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub body_kind: BodyKind,
}

impl HttpRequestSpec {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_json_body(mut self, body: &serde_json::Value) -> Self {
        self.body = body.to_string().into_bytes();
        self.body_kind = BodyKind::Json;
        self
    }

    pub fn with_form_body(mut self, params: &[(String, String)]) -> Self {
        self.body = encode_form(params).into_bytes();
        self.body_kind = BodyKind::Form;
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Query parameter lookup (first match).
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Decode a form body back into pairs (first match for `name`).
    pub fn form_param(&self, name: &str) -> Option<String> {
        if self.body_kind != BodyKind::Form {
            return None;
        }
        url::form_urlencoded::parse(&self.body)
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Parse a JSON body.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        if self.body_kind != BodyKind::Json {
            return None;
        }
        serde_json::from_slice(&self.body).ok()
    }

    /// Full URL with the query encoded by the RFC 3986 rule used for signing.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{query}", self.url)
    }
}

impl fmt::Display for HttpRequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method.as_str(), self.url)
    }
}

/// `application/x-www-form-urlencoded` serialization preserving pair order.
pub fn encode_form(params: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_url_encodes_query_with_rfc3986_rule() {
        let spec = HttpRequestSpec::post("https://example.com/").with_query(vec![
            ("A".to_owned(), "a b*c~".to_owned()),
            ("B".to_owned(), "{\"k\":1}".to_owned()),
        ]);
        assert_eq!(
            spec.full_url(),
            "https://example.com/?A=a%20b%2Ac~&B=%7B%22k%22%3A1%7D"
        );
    }

    #[test]
    fn full_url_appends_to_existing_query() {
        let spec = HttpRequestSpec::get("https://example.com/sms?u=1")
            .with_query(vec![("m".to_owned(), "138".to_owned())]);
        assert_eq!(spec.full_url(), "https://example.com/sms?u=1&m=138");
    }

    #[test]
    fn form_body_round_trips_lookup() {
        let spec = HttpRequestSpec::post("https://example.com").with_form_body(&[
            ("to".to_owned(), "+8613800000001,+8613800000002".to_owned()),
            ("templateParas".to_owned(), "[\"foo\"]".to_owned()),
        ]);
        assert_eq!(spec.body_kind, BodyKind::Form);
        assert_eq!(
            spec.form_param("to").as_deref(),
            Some("+8613800000001,+8613800000002")
        );
        assert_eq!(spec.form_param("templateParas").as_deref(), Some("[\"foo\"]"));
        assert_eq!(spec.form_param("missing"), None);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let spec = HttpRequestSpec::get("https://example.com").with_header("X-Acs-Action", "SendSms");
        assert_eq!(spec.header("x-acs-action"), Some("SendSms"));
        assert_eq!(spec.to_string(), "GET https://example.com");
    }

    #[test]
    fn content_types() {
        assert_eq!(BodyKind::Json.content_type(), Some("application/json"));
        assert_eq!(
            BodyKind::Form.content_type(),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(BodyKind::None.content_type(), None);
    }
}
