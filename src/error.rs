use thiserror::Error;

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status} for {path}")]
    Status { status: u16, path: String },

    #[error("failed to decode response for {path}: {message}")]
    Decode { path: String, message: String },
}

/// A transport failure surfaced from one of the API client operations.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("{operation} returned an unexpected response: {message}")]
    Malformed {
        operation: &'static str,
        message: String,
    },
}

impl LookupError {
    pub fn transport(operation: &'static str, source: TransportError) -> Self {
        LookupError::Transport { operation, source }
    }

    pub fn malformed(operation: &'static str, message: impl Into<String>) -> Self {
        LookupError::Malformed {
            operation,
            message: message.into(),
        }
    }
}

/// Per-person enrichment failure. Never escapes the enricher.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("person details for {0} contained no person record")]
    NoPersonRecord(String),
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth configuration missing: {0}")]
    Config(&'static str),

    #[error("token request failed: {0}")]
    Network(String),

    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("token response had no access_token")]
    MissingToken,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}
