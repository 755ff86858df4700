//! Provider access: chat completions with token budgeting, retry, and
//! streaming.
//!
//! ## Retry Strategy
//!
//! HTTP 429 is the only retryable signal. Waits are randomized exponential —
//! doubling from the configured minimum, clamped into the
//! `[backoff_min, backoff_max]` window, with uniform jitter inside the
//! window so concurrent workers don't retry in lockstep. After
//! `max_attempts` total attempts the final rate-limit error propagates to
//! the caller unchanged. Every other provider error is logged and
//! propagated immediately; nothing is ever converted into a fake "success"
//! string in place of model output.
//!
//! ## Streaming
//!
//! [`LlmClient::complete_stream`] returns a finite, non-restartable
//! [`CompletionStream`] of text increments. A provider failure mid-stream
//! surfaces as a terminal `Err` item (the stream then ends); the consumer
//! cancels by dropping the stream, which aborts the underlying connection.

use crate::config::ForgeConfig;
use crate::error::ForgeError;
use crate::tokens;
use futures::stream::{self, StreamExt};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// A boxed stream of incremental completion text.
///
/// Finite and non-restartable: it terminates when the provider signals
/// completion or after yielding one terminal `Err` item.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String, ForgeError>> + Send>>;

/// Message role in a chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message in a chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A finished (non-streaming) completion.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Model output, trimmed.
    pub text: String,
    /// Prompt tokens, from provider usage when reported, else counted locally.
    pub input_tokens: usize,
    /// Completion tokens, from provider usage when reported, else counted locally.
    pub output_tokens: usize,
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    max_completion_tokens: usize,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

#[derive(Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────────

/// Client for an OpenAI-compatible chat-completions endpoint.
///
/// Construct once from a [`ForgeConfig`] and share by reference; the inner
/// `reqwest::Client` pools connections across calls.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: ForgeConfig,
}

impl LlmClient {
    pub fn new(config: ForgeConfig) -> Result<Self, ForgeError> {
        let http = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .build()
            .map_err(|source| ForgeError::Transport { source })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    /// Single-prompt convenience wrapper around [`LlmClient::complete`].
    pub async fn complete_prompt(
        &self,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<Completion, ForgeError> {
        self.complete(&[ChatMessage::user(prompt)], model).await
    }

    /// Run a chat completion to completion, retrying rate limits.
    ///
    /// The output-token allowance is computed from the prompt before the
    /// first attempt (see [`crate::tokens::output_budget`]) and reused for
    /// every retry.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        model: Option<&str>,
    ) -> Result<Completion, ForgeError> {
        let model = model.unwrap_or(&self.config.model);
        let prompt_text = joined_content(messages);
        let max_tokens =
            tokens::output_budget(&prompt_text, model, self.config.output_token_cap)?;
        let input_tokens = tokens::count_tokens(&prompt_text, model);
        debug!(model, input_tokens, max_tokens, "sending completion request");

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.request_once(messages, model, max_tokens).await {
                Ok(mut completion) => {
                    if completion.input_tokens == 0 {
                        completion.input_tokens = input_tokens;
                    }
                    if completion.output_tokens == 0 {
                        completion.output_tokens = tokens::count_tokens(&completion.text, model);
                    }
                    debug!(
                        input_tokens = completion.input_tokens,
                        output_tokens = completion.output_tokens,
                        "completion finished"
                    );
                    return Ok(completion);
                }
                Err(e @ ForgeError::RateLimited { .. })
                    if attempt < self.config.max_attempts =>
                {
                    let wait =
                        backoff_delay(attempt, self.config.backoff_min, self.config.backoff_max);
                    warn!(
                        attempt,
                        ceiling = self.config.max_attempts,
                        wait_ms = wait.as_millis() as u64,
                        "rate limited, backing off: {e}"
                    );
                    sleep(wait).await;
                }
                Err(e) => {
                    warn!(model, attempt, "provider call failed: {e}");
                    return Err(e);
                }
            }
        }
    }

    /// Start a streaming completion.
    ///
    /// Returns `Err` for failures before any token arrives (bad key, rate
    /// limit, connection refused). Failures after the stream starts surface
    /// as the stream's terminal `Err` item.
    pub async fn complete_stream(
        &self,
        messages: &[ChatMessage],
        model: Option<&str>,
    ) -> Result<CompletionStream, ForgeError> {
        let model = model.unwrap_or(&self.config.model);
        let prompt_text = joined_content(messages);
        let max_tokens =
            tokens::output_budget(&prompt_text, model, self.config.output_token_cap)?;
        debug!(model, max_tokens, "opening completion stream");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&ChatRequest {
                model,
                messages,
                stream: true,
                max_completion_tokens: max_tokens,
            })
            .send()
            .await
            .map_err(|source| ForgeError::Transport { source })?;
        let response = check_status(response).await?;

        let state = SseState {
            body: Box::pin(response.bytes_stream()),
            buf: String::new(),
            pending: VecDeque::new(),
            done: false,
        };

        let s = stream::unfold(state, |mut st| async move {
            loop {
                if let Some(token) = st.pending.pop_front() {
                    return Some((Ok(token), st));
                }
                if st.done {
                    return None;
                }
                match st.body.next().await {
                    Some(Ok(bytes)) => {
                        st.buf.push_str(&String::from_utf8_lossy(&bytes));
                        while let Some(pos) = st.buf.find('\n') {
                            let line = st.buf[..pos].trim_end_matches('\r').to_string();
                            st.buf.drain(..=pos);
                            match parse_sse_line(&line) {
                                SseEvent::Token(t) => st.pending.push_back(t),
                                SseEvent::Done => st.done = true,
                                SseEvent::Ignore => {}
                            }
                        }
                    }
                    Some(Err(e)) => {
                        st.done = true;
                        return Some((Err(ForgeError::Transport { source: e }), st));
                    }
                    None => st.done = true,
                }
            }
        });

        Ok(Box::pin(s))
    }

    async fn request_once(
        &self,
        messages: &[ChatMessage],
        model: &str,
        max_tokens: usize,
    ) -> Result<Completion, ForgeError> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&ChatRequest {
                model,
                messages,
                stream: false,
                max_completion_tokens: max_tokens,
            })
            .send()
            .await
            .map_err(|source| ForgeError::Transport { source })?;
        let response = check_status(response).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|source| ForgeError::Transport { source })?;

        let choice = body.choices.into_iter().next().ok_or_else(|| {
            ForgeError::ResponseFormat {
                detail: "response held no choices".into(),
            }
        })?;
        let text = choice.message.content.unwrap_or_default().trim().to_string();
        let (input_tokens, output_tokens) = body
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        Ok(Completion {
            text,
            input_tokens,
            output_tokens,
        })
    }
}

struct SseState {
    body: Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>,
    buf: String,
    pending: VecDeque<String>,
    done: bool,
}

enum SseEvent {
    Token(String),
    Done,
    Ignore,
}

/// Parse one server-sent-events line into a stream event.
///
/// Malformed data lines are skipped, matching the tolerant behaviour
/// providers require (keep-alive comments, stray blank lines).
fn parse_sse_line(line: &str) -> SseEvent {
    let Some(payload) = line.strip_prefix("data:") else {
        return SseEvent::Ignore;
    };
    let payload = payload.trim();
    if payload == "[DONE]" {
        return SseEvent::Done;
    }
    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => {
            let token = chunk
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.delta.content)
                .unwrap_or_default();
            if token.is_empty() {
                SseEvent::Ignore
            } else {
                SseEvent::Token(token)
            }
        }
        Err(_) => SseEvent::Ignore,
    }
}

/// Map non-success statuses to typed errors; 429 is the retryable one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ForgeError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        return Err(ForgeError::RateLimited { retry_after_secs });
    }
    if !status.is_success() {
        let message: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(300)
            .collect();
        return Err(ForgeError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

/// Randomized exponential backoff wait for the given attempt (1-based).
fn backoff_delay(attempt: u32, min: Duration, max: Duration) -> Duration {
    let exp = min.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
    let ceiling = exp.min(max);
    if ceiling <= min {
        return min;
    }
    let span_ms = (ceiling - min).as_millis() as u64;
    let jitter = rand::thread_rng().gen_range(0..=span_ms);
    min + Duration::from_millis(jitter)
}

fn joined_content(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
