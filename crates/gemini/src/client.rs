//! Streaming client for Vertex AI Gemini.
//!
//! Sends a single-turn prompt to `:streamGenerateContent?alt=sse` and turns
//! the event stream into a stream of text fragments.

use std::collections::VecDeque;
use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use questsmith_core::generation::{FragmentStream, GenerationError, TextGenerator};

use crate::auth::{Credentials, TokenProvider};
use crate::config::GeminiConfig;
use crate::error::GeminiError;
use crate::messages::{GenerateContentRequest, GenerateContentResponse};
use crate::sse::SseDecoder;

/// HTTP client for one Vertex AI publisher model.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
    tokens: TokenProvider,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig, credentials: Credentials) -> Self {
        Self::with_client(reqwest::Client::new(), config, credentials)
    }

    /// Create a client reusing an existing [`reqwest::Client`] (shared with
    /// the token exchange).
    pub fn with_client(client: reqwest::Client, config: GeminiConfig, credentials: Credentials) -> Self {
        let tokens = TokenProvider::new(credentials, client.clone());
        Self {
            client,
            config,
            tokens,
        }
    }

    /// Start a streamed generation for `prompt`.
    ///
    /// Authentication and HTTP status failures are returned directly; the
    /// returned stream yields text fragments in delivery order and ends with
    /// the first error it meets.
    pub async fn stream_generate_content(
        &self,
        prompt: &str,
    ) -> Result<BoxStream<'static, Result<String, GeminiError>>, GeminiError> {
        let token = self.tokens.access_token().await?;
        let body = GenerateContentRequest::user_prompt(prompt);

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Submitting streamed generation request",
        );

        let response = self
            .client
            .post(self.config.stream_url())
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(decode_fragments(response.bytes_stream()))
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GeminiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GeminiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<FragmentStream, GenerationError> {
        let fragments = self.stream_generate_content(prompt).await?;
        Ok(fragments.map_err(GenerationError::from).boxed())
    }

    fn name(&self) -> &str {
        "vertex-gemini"
    }
}

// ---------------------------------------------------------------------------
// Body stream -> fragment stream
// ---------------------------------------------------------------------------

struct FragmentState<S> {
    body: Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    exhausted: bool,
}

/// Decode an SSE body into the text fragments it carries.
pub fn decode_fragments<S, B, E>(body: S) -> BoxStream<'static, Result<String, GeminiError>>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<GeminiError> + Send + 'static,
{
    let state = FragmentState {
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        exhausted: false,
    };
    futures::stream::try_unfold(state, next_fragment::<S, B, E>).boxed()
}

async fn next_fragment<S, B, E>(
    mut state: FragmentState<S>,
) -> Result<Option<(String, FragmentState<S>)>, GeminiError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<GeminiError>,
{
    loop {
        if let Some(payload) = state.pending.pop_front() {
            let chunk: GenerateContentResponse = serde_json::from_str(&payload)?;
            match chunk.into_fragment()? {
                Some(text) => return Ok(Some((text, state))),
                None => continue,
            }
        }

        if state.exhausted {
            return Ok(None);
        }

        match state.body.next().await {
            Some(bytes) => {
                let bytes = bytes.map_err(Into::<GeminiError>::into)?;
                let events = state.decoder.push(bytes.as_ref())?;
                state.pending.extend(events);
            }
            None => {
                state.exhausted = true;
                state.pending.extend(state.decoder.finish()?);
            }
        }
    }
}
