//! Typed HTTP client for the incident.io API.
//!
//! One [`Client`] is built when the provider is configured and shared by every
//! resource adapter. It authenticates with a bearer token, tags each request
//! with a version-identifying user agent, and treats any response with a
//! status of 400 or above as an [`ApiError::Status`] carrying the raw body.
//! Redirects are left to the transport.
//!
//! Endpoint groups live in their own modules, each adding methods to
//! [`Client`] alongside the request and response bodies they exchange.

mod error;

// Request and response bodies mirror the API field for field.
#[allow(missing_docs)]
pub mod catalog;
#[allow(missing_docs)]
pub mod custom_fields;
#[allow(missing_docs)]
pub mod incident_roles;
#[allow(missing_docs)]
pub mod incident_statuses;
#[allow(missing_docs)]
pub mod severities;

use std::borrow::Cow;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ProviderError;

pub use error::ApiError;

/// Shared, read-only handle to the incident.io API.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Build a client for `endpoint`, authenticating with `api_key`.
    ///
    /// Fails when the endpoint is not an http(s) URL, when the key cannot be
    /// carried in an HTTP header, or when the TLS backend cannot be set up.
    pub fn new(endpoint: &str, api_key: &str, user_agent: &str) -> Result<Self, ProviderError> {
        let url = reqwest::Url::parse(endpoint).map_err(|err| {
            ProviderError::Configuration(format!("invalid endpoint {:?}: {}", endpoint, err))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProviderError::Configuration(format!(
                "invalid endpoint {:?}: scheme must be http or https",
                endpoint
            )));
        }

        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
                ProviderError::Configuration(
                    "api key contains characters that are not valid in an HTTP header".to_string(),
                )
            })?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(|err| {
                ProviderError::Configuration(format!("failed to build HTTP client: {}", err))
            })?;

        Ok(Self {
            http,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// The API root every request path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.request(Method::GET, path, None::<&()>).await?;
        decode(&body)
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.request(Method::POST, path, Some(body)).await?;
        decode(&body)
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.request(Method::PUT, path, Some(body)).await?;
        decode(&body)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(Method::DELETE, path, None::<&()>).await?;
        Ok(())
    }

    async fn request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<String, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "sending API request");

        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() >= 400 {
            warn!(method = %method, url = %url, status = status.as_u16(), "API request failed");
            return Err(ApiError::Status { status, body });
        }

        debug!(method = %method, url = %url, status = status.as_u16(), "API request completed");
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(ApiError::Decode)
}

/// Escape an identifier for use as a single path segment.
pub(crate) fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = Client::new("https://api.incident.io/", "key", "test/0.0.0").unwrap();
        assert_eq!(client.base_url(), "https://api.incident.io");
    }

    #[test]
    fn test_new_rejects_unparseable_endpoint() {
        let err = Client::new("not a url", "key", "test/0.0.0").unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn test_new_rejects_non_http_scheme() {
        let err = Client::new("ftp://api.incident.io", "key", "test/0.0.0").unwrap_err();
        assert!(err.to_string().contains("scheme must be http or https"));
    }

    #[test]
    fn test_new_rejects_key_with_newline() {
        let err = Client::new("https://api.incident.io", "bad\nkey", "test/0.0.0").unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn test_segment_escapes_reserved_characters() {
        assert_eq!(segment("01H/../x"), "01H%2F..%2Fx");
        assert_eq!(segment("01GW2G3V0S59R238FAHPDS1R66"), "01GW2G3V0S59R238FAHPDS1R66");
    }
}
