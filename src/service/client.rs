//! HTTP client for an OpenAI-compatible chat-completions endpoint.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info_span, Instrument};

use crate::config::ServiceConfig;
use crate::{AppError, Result};

use super::{GenerationService, Prompt};

/// Longest body excerpt quoted in error messages.
const ERROR_SNIPPET_BYTES: usize = 200;

/// Largest server retry hint honored, in seconds.
const MAX_RETRY_AFTER_SECS: f64 = 3600.0;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

/// Generation client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: String,
}

impl HttpGenerationClient {
    /// Build a client from service settings.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the API key is missing or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::Config(
                "generation service API key is not loaded".into(),
            ));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: config.api_key.clone(),
        })
    }

    async fn send(&self, prompt: &Prompt) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let text = response.text().await.map_err(map_transport_error)?;
        debug!(status, bytes = text.len(), "generation service responded");

        if !(200..300).contains(&status) {
            return Err(classify_status(status, retry_after.as_deref(), &text));
        }

        extract_message_content(&text)
    }
}

impl GenerationService for HttpGenerationClient {
    fn complete<'a>(
        &'a self,
        prompt: &'a Prompt,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        let span = info_span!("generation_request", request_id = %uuid::Uuid::new_v4());
        Box::pin(self.send(prompt).instrument(span))
    }
}

fn map_transport_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout(format!("generation request timed out: {err}"))
    } else {
        AppError::Network(format!("generation request failed: {err}"))
    }
}

/// Pull `choices[0].message.content` out of a chat-completions body.
fn extract_message_content(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| AppError::parse(format!("service body is not JSON: {err}"), body))?;
    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| AppError::parse("service body has no message content", body))
}

/// Map a non-success HTTP status onto the error taxonomy.
///
/// | status | error | retryable |
/// |---|---|---|
/// | 400 | `Validation` | no |
/// | 401, 403 | `Unauthorized` | no |
/// | 404 | `NotFound` | no |
/// | 429 | `RateLimit` | yes |
/// | 5xx | `Service` | yes |
///
/// Other statuses are treated as validation failures. A rate-limit delay
/// comes from the `Retry-After` header (seconds) or a `retryAfter` /
/// `retry_after` number in the JSON body.
#[must_use]
pub fn classify_status(status: u16, retry_after_header: Option<&str>, body: &str) -> AppError {
    let detail = format!("status {status}: {}", snippet(body));
    match status {
        400 => AppError::Validation(detail),
        401 | 403 => AppError::Unauthorized(detail),
        404 => AppError::NotFound(detail),
        429 => AppError::RateLimit {
            message: detail,
            retry_after: retry_after_header
                .and_then(parse_seconds)
                .or_else(|| retry_after_from_body(body)),
        },
        500..=599 => AppError::Service(detail),
        _ => AppError::Validation(detail),
    }
}

fn parse_seconds(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| (0.0..=MAX_RETRY_AFTER_SECS).contains(secs))
        .map(Duration::from_secs_f64)
}

fn retry_after_from_body(body: &str) -> Option<Duration> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["/retryAfter", "/retry_after", "/error/retryAfter", "/error/retry_after"]
        .iter()
        .find_map(|path| {
            let hint = value.pointer(path)?;
            hint.as_f64()
                .or_else(|| hint.as_str().and_then(|s| s.trim().parse().ok()))
        })
        .filter(|secs| (0.0..=MAX_RETRY_AFTER_SECS).contains(secs))
        .map(Duration::from_secs_f64)
}

/// Truncate `text` to [`ERROR_SNIPPET_BYTES`] on a char boundary.
fn snippet(text: &str) -> String {
    let text = text.trim();
    if text.len() <= ERROR_SNIPPET_BYTES {
        return text.to_owned();
    }
    let boundary = text
        .char_indices()
        .map(|(idx, _)| idx)
        .take_while(|&idx| idx <= ERROR_SNIPPET_BYTES)
        .last()
        .unwrap_or(0);
    format!("{}...", &text[..boundary])
}
