use serde::{Deserialize, Serialize};

use crate::types::Content;

/// One candidate answer within a response frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The (partial) content of the candidate.
    #[serde(default)]
    pub content: Option<Content>,

    /// Why generation stopped; only set on the last frame.
    #[serde(default)]
    pub finish_reason: Option<String>,

    /// Position of the candidate.
    #[serde(default)]
    pub index: Option<u32>,
}

/// Feedback on the prompt itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Set when the prompt was refused outright.
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Token accounting for a request.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_token_count: Option<u32>,

    /// Tokens generated across candidates.
    #[serde(default)]
    pub candidates_token_count: Option<u32>,

    /// Total tokens.
    #[serde(default)]
    pub total_token_count: Option<u32>,
}

/// The `error` object the API returns in failure bodies and in-stream failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    /// Numeric (HTTP-like) code.
    #[serde(default)]
    pub code: Option<u16>,

    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,

    /// Canonical status, e.g. `RESOURCE_EXHAUSTED`.
    #[serde(default)]
    pub status: Option<String>,
}

/// A (streamed) response frame from `streamGenerateContent`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate answers.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Prompt feedback.
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,

    /// Token usage; usually only meaningful on the last frame.
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,

    /// The model version that answered.
    #[serde(default)]
    pub model_version: Option<String>,

    /// Present when the server reports a failure inside the stream.
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

impl GenerateContentResponse {
    /// The answer text carried by the first candidate in this frame.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(Content::answer_text)
            .unwrap_or_default()
    }

    /// The block reason when the prompt was refused and nothing was generated.
    pub fn block_reason(&self) -> Option<&str> {
        if !self.candidates.is_empty() {
            return None;
        }
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }

    /// The finish reason of the first candidate, if this is the last frame.
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
    }
}
