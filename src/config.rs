//! Client configuration resolved once at startup.
//!
//! Values come from the process environment, which `main` may first populate
//! from a dotenv file. The resolved [`ClientConfig`] is handed to
//! [`N8nClient::try_new`](crate::client::N8nClient::try_new) and never read
//! again from the environment.

use crate::error::{Error, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_URL: &str = "http://localhost:5678";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable settings for talking to one n8n instance.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the n8n instance, e.g. `http://localhost:5678`
    pub base_url: Url,
    /// API key sent in the `X-N8N-API-KEY` header
    pub api_key: Option<String>,
    /// Public tunnel endpoint forwarding to n8n; informational only
    pub tunnel_url: Option<Url>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: Url, api_key: Option<String>) -> Self {
        Self {
            base_url,
            api_key,
            tunnel_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_tunnel_url(self, tunnel_url: Option<Url>) -> Self {
        Self { tunnel_url, ..self }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Load configuration from environment variables
    ///
    /// Expected environment variables:
    /// - N8N_URL: n8n base URL (optional, defaults to http://localhost:5678)
    /// - N8N_API_KEY: API key (required by the client, checked at construction)
    /// - N8N_TUNNEL_URL or WEBHOOK_URL: public tunnel URL (optional)
    /// - N8N_TIMEOUT_SECS: request timeout in seconds (optional, defaults to 30)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url_str = get("N8N_URL").unwrap_or_else(|| DEFAULT_URL.to_string());
        let base_url = parse_http_url("N8N_URL", &url_str)?;

        let tunnel_url = match get("N8N_TUNNEL_URL").or_else(|| get("WEBHOOK_URL")) {
            Some(raw) => Some(parse_http_url("N8N_TUNNEL_URL", &raw)?),
            None => None,
        };

        let timeout = match get("N8N_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Configuration(format!("Invalid N8N_TIMEOUT_SECS: {}", raw))
                })?;
                if secs == 0 {
                    return Err(Error::Configuration(
                        "N8N_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            base_url,
            api_key: get("N8N_API_KEY"),
            tunnel_url,
            timeout,
        })
    }

    /// The API key, or a configuration error if none was provided.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::Configuration(
                "N8N_API_KEY is not set; export it or add it to your .env file".to_string(),
            )
        })
    }
}

fn parse_http_url(var: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Configuration(format!("Invalid {}: {} ({})", var, raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Configuration(format!(
            "Invalid {}: unsupported scheme '{}'",
            var, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:5678/");
        assert_eq!(config.api_key, None);
        assert_eq!(config.tunnel_url, None);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_all_values() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("N8N_URL", "https://n8n.internal:8443/"),
            ("N8N_API_KEY", "secret"),
            ("N8N_TUNNEL_URL", "https://abc.trycloudflare.com"),
            ("N8N_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url.host_str(), Some("n8n.internal"));
        assert_eq!(config.require_api_key().unwrap(), "secret");
        assert_eq!(
            config.tunnel_url.unwrap().host_str(),
            Some("abc.trycloudflare.com")
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_webhook_url_fallback() {
        let config =
            ClientConfig::from_lookup(lookup(&[("WEBHOOK_URL", "https://hooks.example.com")]))
                .unwrap();
        assert_eq!(
            config.tunnel_url.unwrap().host_str(),
            Some("hooks.example.com")
        );
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = ClientConfig::from_lookup(lookup(&[("N8N_API_KEY", "   ")])).unwrap();
        assert!(matches!(
            config.require_api_key(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_url() {
        let result = ClientConfig::from_lookup(lookup(&[("N8N_URL", "not a url")]));
        assert!(matches!(result, Err(Error::Configuration(_))));

        let result = ClientConfig::from_lookup(lookup(&[("N8N_URL", "ftp://n8n.local")]));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("unsupported scheme")
        );
    }

    #[test]
    fn test_invalid_timeout() {
        let result = ClientConfig::from_lookup(lookup(&[("N8N_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(Error::Configuration(_))));

        let result = ClientConfig::from_lookup(lookup(&[("N8N_TIMEOUT_SECS", "0")]));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
