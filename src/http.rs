use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

const BODY_EXCERPT_CHARS: usize = 240;

/// Failure of a single upstream call. Every call site consumes this explicitly
/// and turns it into a skip, an early stop, or a degraded field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub(crate) enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP status {status} ({excerpt})")]
    Status { status: u16, excerpt: String },
    #[error("response decode failed: {0}")]
    Decode(String),
    #[error("response has no `{field}` field: {excerpt}")]
    MissingField {
        field: &'static str,
        excerpt: String,
    },
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Blocking JSON client. One request in flight at a time, one attempt per call.
pub(crate) struct HttpClient {
    agent: ureq::Agent,
}

impl HttpClient {
    pub(crate) fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .timeout_write(read_timeout)
            .build();
        Self { agent }
    }

    pub(crate) fn get_json(&self, url: &str, query: &[(&str, &str)]) -> ApiResult<Value> {
        let mut request = self.agent.get(url);
        for (key, value) in query {
            request = request.query(key, value);
        }

        match request.call() {
            Ok(response) => {
                let body = response
                    .into_string()
                    .map_err(|err| ApiError::Decode(err.to_string()))?;
                serde_json::from_str(&body)
                    .map_err(|err| ApiError::Decode(format!("{err}; body: {}", excerpt(&body))))
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().ok().unwrap_or_default();
                Err(ApiError::Status {
                    status,
                    excerpt: excerpt(&body),
                })
            }
            Err(ureq::Error::Transport(err)) => Err(ApiError::Transport(err.to_string())),
        }
    }
}

pub(crate) fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty body".to_string();
    }
    trimmed.chars().take(BODY_EXCERPT_CHARS).collect()
}
