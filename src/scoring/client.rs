//! The remote-call boundary: a trait so the engine can be driven against a
//! deterministic fake in tests, with a `reqwest`-backed production
//! implementation.

use async_trait::async_trait;

/// A single scoring request: a system instruction enforcing JSON-only
/// output, and a user payload containing the formatted batch prompt (§6).
#[derive(Debug, Clone)]
pub struct ScoreBatchRequest {
    /// System-role instruction sent ahead of the user payload.
    pub system_instruction: String,
    /// The formatted batch prompt (see [`super::batch::format_batch_prompt`]).
    pub user_payload: String,
    /// Model identifier to request.
    pub model_name: String,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A successful scoring response: the raw response text (to be parsed by
/// [`super::extractor`]) plus whatever usage accounting the server
/// surfaced.
#[derive(Debug, Clone)]
pub struct ScoreBatchResponse {
    /// Raw UTF-8 response text, expected to contain one JSON object.
    pub raw_text: String,
    /// Token usage reported by the server, if any.
    pub token_usage: Option<u64>,
}

/// A failed scoring attempt, carrying enough detail for the engine's
/// retry/backoff and circuit-breaker logic (§4.4).
#[derive(Debug, Clone)]
pub enum RemoteFailure {
    /// A transient failure (timeout, 5xx, 429) that is safe to retry.
    /// `retry_after` is the server-advertised cooldown, in whole seconds,
    /// when present.
    Transient {
        /// Human-readable description, used in logs.
        message: String,
        /// Server-advertised cooldown, in seconds.
        retry_after: Option<u64>,
    },
    /// A local-execution failure specific to an on-device scorer (e.g. an
    /// allocation failure), tracked by the circuit breaker alongside plain
    /// failures.
    Allocation {
        /// Human-readable description, used in logs.
        message: String,
    },
    /// A non-retryable failure (e.g. 4xx other than 429, malformed
    /// request). The engine treats this the same as an exhausted retry
    /// budget: the batch's segments receive a fallback report.
    Fatal {
        /// Human-readable description, used in logs.
        message: String,
    },
}

impl std::fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transient { message, .. } | Self::Allocation { message } | Self::Fatal { message } => {
                write!(f, "{message}")
            }
        }
    }
}

impl std::error::Error for RemoteFailure {}

/// A scoring backend: either the production remote model or an on-device
/// alternative. The engine is generic over this trait so tests can
/// substitute a deterministic fake (§9 design note).
#[async_trait]
pub trait RemoteScorer: Send + Sync {
    /// Score one batch, returning the raw response text or a classified
    /// failure.
    async fn score_batch(&self, request: ScoreBatchRequest) -> Result<ScoreBatchResponse, RemoteFailure>;
}

/// Production [`RemoteScorer`] backed by an HTTP JSON API, using
/// `reqwest`'s `rustls` TLS stack.
pub struct HttpRemoteScorer {
    client: reqwest::Client,
    endpoint: String,
    credential: String,
    timeout: std::time::Duration,
}

impl HttpRemoteScorer {
    /// Build a scorer targeting `endpoint`, authenticating with
    /// `credential`, with a per-attempt timeout of `timeout_secs` seconds.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, credential: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            credential: credential.into(),
            timeout: std::time::Duration::from_secs(timeout_secs),
        }
    }
}

#[async_trait]
impl RemoteScorer for HttpRemoteScorer {
    async fn score_batch(&self, request: ScoreBatchRequest) -> Result<ScoreBatchResponse, RemoteFailure> {
        let body = serde_json::json!({
            "model": request.model_name,
            "temperature": request.temperature,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": request.system_instruction },
                { "role": "user", "content": request.user_payload },
            ],
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.credential)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::classify_transport_error(&e))?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());

        if status.as_u16() == 429 || status.is_server_error() {
            return Err(RemoteFailure::Transient {
                message: format!("HTTP {status}"),
                retry_after,
            });
        }
        if !status.is_success() {
            return Err(RemoteFailure::Fatal {
                message: format!("HTTP {status}"),
            });
        }

        let token_usage = None;
        let raw_text = response.text().await.map_err(|e| RemoteFailure::Fatal {
            message: format!("failed to read response body: {e}"),
        })?;

        Ok(ScoreBatchResponse { raw_text, token_usage })
    }
}

impl HttpRemoteScorer {
    fn classify_transport_error(error: &reqwest::Error) -> RemoteFailure {
        if error.is_timeout() || error.is_connect() {
            RemoteFailure::Transient {
                message: error.to_string(),
                retry_after: None,
            }
        } else {
            RemoteFailure::Fatal {
                message: error.to_string(),
            }
        }
    }
}

/// Parse a `retry-after`/`Retry-After` header as whole seconds, matching
/// case-insensitively as `reqwest::header::HeaderMap` already does.
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}
