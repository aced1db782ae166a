//! Gemini wire types.
//!
//! Requests borrow the canonical request directly. Replies are decoded
//! leniently and translated once into the canonical response types.

use serde::{Deserialize, Serialize};

use tandem_core::{
    Candidate, Content, ContentEmbedding, CountTokensResponse, EmbedContentResponse,
    FinishReason, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part, Role,
    UsageMetadata,
};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateBody<'a> {
    pub contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<&'a Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<&'a GenerationConfig>,
}

impl<'a> From<&'a GenerateContentRequest> for GenerateBody<'a> {
    fn from(request: &'a GenerateContentRequest) -> Self {
        Self {
            contents: &request.contents,
            system_instruction: request.system_instruction.as_ref(),
            generation_config: request.generation_config.as_ref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CountBody<'a> {
    pub contents: &'a [Content],
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbedBody<'a> {
    pub model: String,
    pub content: &'a Content,
}

// ============================================================================
// Replies
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateReply {
    #[serde(default)]
    candidates: Vec<CandidateReply>,
    #[serde(default)]
    usage_metadata: Option<UsageReply>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateReply {
    #[serde(default)]
    content: Option<ContentReply>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    index: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentReply {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<PartReply>,
}

// Non-text parts (function calls, inline data) carry no `text` and are dropped.
#[derive(Debug, Default, Deserialize)]
struct PartReply {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageReply {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CountReply {
    #[serde(default)]
    total_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EmbedReply {
    #[serde(default)]
    embedding: Option<ValuesReply>,
    #[serde(default)]
    embeddings: Vec<ValuesReply>,
}

#[derive(Debug, Default, Deserialize)]
struct ValuesReply {
    #[serde(default)]
    values: Vec<f32>,
}

// ============================================================================
// Translation
// ============================================================================

fn finish_reason(value: Option<&str>) -> FinishReason {
    match value {
        None | Some("STOP" | "FINISH_REASON_UNSPECIFIED") => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::MaxTokens,
        Some("SAFETY") => FinishReason::Safety,
        Some("RECITATION") => FinishReason::Recitation,
        Some(_) => FinishReason::Other,
    }
}

impl GenerateReply {
    pub(crate) fn into_canonical(self) -> GenerateContentResponse {
        let candidates = self
            .candidates
            .into_iter()
            .enumerate()
            .map(|(position, candidate)| {
                let content = candidate.content.unwrap_or_default();
                Candidate {
                    content: Content {
                        role: match content.role.as_deref() {
                            Some("user") => Role::User,
                            _ => Role::Model,
                        },
                        parts: content
                            .parts
                            .into_iter()
                            .filter_map(|p| p.text.map(Part::text))
                            .collect(),
                    },
                    finish_reason: finish_reason(candidate.finish_reason.as_deref()),
                    index: candidate
                        .index
                        .unwrap_or_else(|| u32::try_from(position).unwrap_or(u32::MAX)),
                }
            })
            .collect();

        let usage = self.usage_metadata.unwrap_or_default();

        GenerateContentResponse {
            candidates,
            usage_metadata: UsageMetadata {
                prompt_token_count: usage.prompt_token_count.unwrap_or(0),
                candidates_token_count: usage.candidates_token_count.unwrap_or(0),
                total_token_count: usage.total_token_count.unwrap_or(0),
            },
            model_version: self.model_version,
        }
    }
}

impl CountReply {
    pub(crate) fn into_canonical(self) -> CountTokensResponse {
        CountTokensResponse {
            total_tokens: self.total_tokens.unwrap_or(0),
        }
    }
}

impl EmbedReply {
    pub(crate) fn into_canonical(self) -> EmbedContentResponse {
        let mut embeddings: Vec<ContentEmbedding> = self
            .embedding
            .into_iter()
            .chain(self.embeddings)
            .map(|e| ContentEmbedding { values: e.values })
            .collect();

        if embeddings.is_empty() {
            embeddings.push(ContentEmbedding::default());
        }

        EmbedContentResponse { embeddings }
    }
}

// ============================================================================
// Tests
// ============================================================================
