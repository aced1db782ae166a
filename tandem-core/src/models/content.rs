//! Canonical request and response shapes.
//!
//! These are the provider-neutral types exchanged at the executor boundary.
//! Field names serialize in camelCase, matching the Gemini wire shape that
//! the canonical model is based on. Backends with a different wire format
//! translate to and from these types once, at their adapter boundary.

use serde::{Deserialize, Serialize};

// ============================================================================
// Content
// ============================================================================

/// Author of a content turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The caller.
    #[default]
    User,
    /// The model.
    Model,
}

/// One piece of a content turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Part {
    /// Text payload.
    #[serde(default)]
    pub text: String,
}

impl Part {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A single turn: a role plus ordered parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Content {
    /// Who authored this turn.
    #[serde(default)]
    pub role: Role,
    /// Ordered parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Creates a single-part user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Creates a single-part model turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenates the text of all parts.
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

// ============================================================================
// Generate Content
// ============================================================================

/// Optional sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Nucleus sampling threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Sequences that end generation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

/// A generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Model name.
    pub model: String,
    /// Ordered conversation turns.
    pub contents: Vec<Content>,
    /// System prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    /// Sampling parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Creates a request with the given turns.
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            contents,
            system_instruction: None,
            generation_config: None,
        }
    }

    /// Creates a single-turn user prompt.
    pub fn prompt(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(model, vec![Content::user(text)])
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::user(text));
        self
    }

    /// Sets sampling parameters.
    #[must_use]
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

/// Why a candidate stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Natural stop point or stop sequence.
    #[default]
    Stop,
    /// Token limit reached.
    MaxTokens,
    /// Blocked by safety filters.
    Safety,
    /// Blocked for recitation.
    Recitation,
    /// Any other reason.
    #[serde(other)]
    Other,
}

/// One generated candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content.
    #[serde(default)]
    pub content: Content,
    /// Stop reason. Defaults to [`FinishReason::Stop`] when absent.
    #[serde(default)]
    pub finish_reason: FinishReason,
    /// Position among candidates.
    #[serde(default)]
    pub index: u32,
}

/// Token accounting for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_token_count: u32,
    /// Tokens across all candidates.
    #[serde(default)]
    pub candidates_token_count: u32,
    /// Prompt plus candidates.
    #[serde(default)]
    pub total_token_count: u32,
}

/// A generation response.
///
/// A successful response always has at least one candidate. An empty list
/// is an invalid response, not a degenerate success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Ordered candidates.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Token accounting. Zeroed when the backend omits it.
    #[serde(default)]
    pub usage_metadata: UsageMetadata,
    /// Model version reported by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Returns the text of the first candidate.
    pub fn text(&self) -> Option<String> {
        self.candidates.first().map(|c| c.content.text())
    }

    /// Returns true if there is at least one candidate.
    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }
}

// ============================================================================
// Count Tokens
// ============================================================================

/// A token counting request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensRequest {
    /// Model name.
    pub model: String,
    /// Turns to count.
    pub contents: Vec<Content>,
}

impl CountTokensRequest {
    /// Creates a request.
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            contents,
        }
    }
}

/// A token counting response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensResponse {
    /// Total tokens. Zero when the backend omits it.
    #[serde(default)]
    pub total_tokens: u32,
}

// ============================================================================
// Embed Content
// ============================================================================

/// An embedding request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    /// Model name.
    pub model: String,
    /// Content to embed.
    pub content: Content,
}

impl EmbedContentRequest {
    /// Creates a request.
    pub fn new(model: impl Into<String>, content: Content) -> Self {
        Self {
            model: model.into(),
            content,
        }
    }
}

/// A single embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContentEmbedding {
    /// Vector components.
    #[serde(default)]
    pub values: Vec<f32>,
}

/// An embedding response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EmbedContentResponse {
    /// Embeddings, one per input.
    #[serde(default)]
    pub embeddings: Vec<ContentEmbedding>,
}

impl EmbedContentResponse {
    /// Wraps one vector.
    pub fn single(values: Vec<f32>) -> Self {
        Self {
            embeddings: vec![ContentEmbedding { values }],
        }
    }

    /// Returns the first vector, if any.
    pub fn first(&self) -> Option<&[f32]> {
        self.embeddings.first().map(|e| e.values.as_slice())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_text_concatenates_parts() {
        let content = Content {
            role: Role::Model,
            parts: vec![Part::text("Hel"), Part::text("lo")],
        };
        assert_eq!(content.text(), "Hello");
    }

    #[test]
    fn test_response_text_uses_first_candidate() {
        let response = GenerateContentResponse {
            candidates: vec![
                Candidate {
                    content: Content::model("first"),
                    ..Candidate::default()
                },
                Candidate {
                    content: Content::model("second"),
                    index: 1,
                    ..Candidate::default()
                },
            ],
            ..GenerateContentResponse::default()
        };
        assert_eq!(response.text().as_deref(), Some("first"));
        assert!(response.has_candidates());
    }

    #[test]
    fn test_empty_response_has_no_text() {
        let response = GenerateContentResponse::default();
        assert!(response.text().is_none());
        assert!(!response.has_candidates());
    }

    #[test]
    fn test_embed_single() {
        let response = EmbedContentResponse::single(vec![0.5, 0.25]);
        assert_eq!(response.first(), Some(&[0.5, 0.25][..]));
    }
}
