//! Provider error type and transience classification.

/// How much of a provider error body is kept in error messages. Raw
/// payloads are never propagated verbatim past this summary.
const BODY_SUMMARY_LEN: usize = 200;

/// Errors from the provider adapter layer.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Truncated response body for diagnostics.
        message: String,
    },

    /// The provider reported a failure in an otherwise-successful response.
    #[error("Provider reported failure: {0}")]
    Provider(String),

    /// A 2xx response did not match the expected shape.
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Connection-level failures, timeouts, and 5xx responses are
    /// transient; client errors and malformed payloads are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ProviderError::Api { status, .. } => *status >= 500,
            ProviderError::Provider(_) | ProviderError::Malformed(_) => false,
        }
    }

    /// Truncate a raw provider body to a short summary.
    pub fn summarize_body(body: &str) -> String {
        let trimmed = body.trim();
        if trimmed.len() > BODY_SUMMARY_LEN {
            let mut end = BODY_SUMMARY_LEN;
            while !trimmed.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &trimmed[..end])
        } else {
            trimmed.to_string()
        }
    }
}
