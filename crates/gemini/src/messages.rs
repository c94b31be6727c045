//! Request and response bodies of the Vertex AI `generateContent` API.
//!
//! Only the fields the client reads or writes are modelled; everything else
//! in a response (safety ratings, usage metadata, citations) is ignored.

use serde::{Deserialize, Serialize};

use crate::error::GeminiError;

/// Harm categories that get an explicit safety threshold.
pub const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Block only content rated high-probability harmful.
pub const BLOCK_ONLY_HIGH: &str = "BLOCK_ONLY_HIGH";

/// Finish reasons meaning the candidate was cut off by a content filter.
pub const SAFETY_FINISH_REASONS: [&str; 4] = ["SAFETY", "BLOCKLIST", "PROHIBITED_CONTENT", "SPII"];

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerateContentRequest {
    /// A single user turn carrying `prompt`, with the default safety settings.
    pub fn user_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category: (*category).to_string(),
                    threshold: BLOCK_ONLY_HIGH.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// One streamed chunk (or a full non-streamed response).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
    #[serde(default)]
    pub block_reason_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl GenerateContentResponse {
    /// Interpret a chunk as a text fragment.
    ///
    /// The fragment is the text of the first part of the first candidate.
    /// Chunks without one (e.g. the trailing usage-metadata chunk) yield
    /// `Ok(None)`. Error payloads and safety stops are errors.
    pub fn into_fragment(self) -> Result<Option<String>, GeminiError> {
        if let Some(err) = self.error {
            let body = match err.status {
                Some(status) => format!("{status}: {}", err.message),
                None => err.message,
            };
            return Err(GeminiError::ApiError {
                status: err.code,
                body,
            });
        }

        if let Some(feedback) = self.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let detail = feedback.block_reason_message.unwrap_or_default();
                return Err(GeminiError::Blocked(
                    format!("prompt blocked ({reason}) {detail}").trim_end().to_string(),
                ));
            }
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Ok(None);
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if SAFETY_FINISH_REASONS.contains(&reason) {
                return Err(GeminiError::Blocked(format!("response stopped ({reason})")));
            }
        }

        Ok(candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text))
    }
}
