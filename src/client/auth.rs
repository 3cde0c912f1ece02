use crate::error::{Error, Result};
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};

/// Header n8n reads the public API key from (`X-N8N-API-KEY`), lowercased.
pub const API_KEY_HEADER: &str = "x-n8n-api-key";

/// n8n public API key authentication.
///
/// `Debug` hides the key entirely; `Display` shows only a short prefix for logs.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(Error::Configuration("API key must not be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Default headers sent with every request.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut value = HeaderValue::from_str(&self.0).map_err(|_| {
            Error::Configuration("API key contains characters not allowed in a header".to_string())
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let visible: String = self.0.chars().take(4).collect();
        write!(f, "{}***", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers() {
        let key = ApiKey::new("n8n_api_1234567890").unwrap();
        let headers = key.headers().unwrap();

        let value = headers.get(API_KEY_HEADER).unwrap();
        assert_eq!(value.to_str().unwrap(), "n8n_api_1234567890");
        assert!(value.is_sensitive());
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get("X-N8N-API-KEY"), Some(value));
    }

    #[test]
    fn test_key_is_redacted() {
        let key = ApiKey::new("n8n_api_1234567890").unwrap();
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
        assert_eq!(key.to_string(), "n8n_***");
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(matches!(ApiKey::new("  "), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_invalid_header_characters() {
        let key = ApiKey::new("line\nbreak").unwrap();
        assert!(matches!(key.headers(), Err(Error::Configuration(_))));
    }
}
