use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LOCATION};
use reqwest::redirect::Policy;
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;

const FS_MEDIA_TYPE: &str = "application/x-fs-v1+json";

/// A response from the genealogy API.
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    pub status: u16,
    /// `Location` header, present on redirect-style lookups.
    pub location: Option<String>,
    /// Parsed JSON body, `Null` when the body is empty.
    pub body: Value,
}

/// Authenticated GET against a relative API path.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str) -> Result<ApiResponse, TransportError>;
}

/// Bearer-token transport over reqwest. Redirects are not followed so the
/// current-person lookup can read its `Location` header.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FS_MEDIA_TYPE));
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|e| TransportError::Network(format!("invalid access token: {}", e)))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(TransportError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let body = parse_body(path, &bytes)?;

        Ok(ApiResponse {
            status: status.as_u16(),
            location,
            body,
        })
    }
}

fn parse_body(path: &str, bytes: &[u8]) -> Result<Value, TransportError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|e| TransportError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}
