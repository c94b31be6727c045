//! Text generation provider seam.
//!
//! A [`TextGenerator`] turns a prompt into a lazy, finite stream of text
//! fragments. Consumers only ever concatenate fragments in arrival order,
//! see [`collect_fragments`].

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{BoxStream, Stream, StreamExt};

/// Message shown to clients whenever generation fails, whatever the cause.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate adventure content.";

/// Incrementally delivered provider output.
pub type FragmentStream = BoxStream<'static, Result<String, GenerationError>>;

/// Failures of the external generation call.
///
/// The detail is for operator logs only; clients see
/// [`GENERIC_FAILURE_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The request never produced an HTTP response (network, DNS, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with an error status or error payload.
    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    /// The provider refused the prompt or stopped on a safety filter.
    #[error("Blocked by provider safety filter: {0}")]
    Blocked(String),

    /// The provider response could not be decoded.
    #[error("Malformed provider response: {0}")]
    Malformed(String),

    /// Credentials could not be loaded or exchanged for an access token.
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// The provider did not finish within the allowed time.
    #[error("Generation timed out after {0:?}")]
    TimedOut(Duration),

    /// The provider panicked while generating.
    #[error("Provider panicked")]
    Panicked,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Start generating text for `prompt`.
    ///
    /// Errors raised before the first fragment are returned directly; later
    /// errors arrive as stream items.
    async fn generate(&self, prompt: &str) -> Result<FragmentStream, GenerationError>;

    /// Provider name used in logs.
    fn name(&self) -> &str;
}

/// Concatenate every fragment in arrival order, stopping at the first error.
pub async fn collect_fragments<S>(mut stream: S) -> Result<String, GenerationError>
where
    S: Stream<Item = Result<String, GenerationError>> + Unpin,
{
    let mut text = String::new();
    while let Some(fragment) = stream.next().await {
        text.push_str(&fragment?);
    }
    Ok(text)
}

/// Run a full generation and return the accumulated text.
pub async fn generate_text(
    generator: &dyn TextGenerator,
    prompt: &str,
) -> Result<String, GenerationError> {
    let stream = generator.generate(prompt).await?;
    collect_fragments(stream).await
}
