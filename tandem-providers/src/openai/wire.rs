//! OpenAI-compatible wire types.

use serde::{Deserialize, Serialize};

use tandem_core::{
    Candidate, Content, CountTokensRequest, CountTokensResponse, EmbedContentRequest,
    EmbedContentResponse, FinishReason, GenerateContentRequest, GenerateContentResponse, Part,
    Role, UsageMetadata,
};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    fn from_content(content: &Content) -> Self {
        Self {
            role: match content.role {
                Role::User => "user",
                Role::Model => "assistant",
            },
            content: content.text(),
        }
    }
}

fn messages(system: Option<&Content>, contents: &[Content]) -> Vec<ChatMessage> {
    system
        .map(|s| ChatMessage {
            role: "system",
            content: s.text(),
        })
        .into_iter()
        .chain(contents.iter().map(ChatMessage::from_content))
        .collect()
}

#[derive(Debug, Serialize)]
pub(crate) struct StreamOptions {
    pub include_usage: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatBody<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<&'a [String]>,
}

impl<'a> ChatBody<'a> {
    pub(crate) fn new(request: &'a GenerateContentRequest, stream: bool) -> Self {
        let config = request.generation_config.as_ref();
        Self {
            model: &request.model,
            messages: messages(request.system_instruction.as_ref(), &request.contents),
            stream,
            stream_options: stream.then_some(StreamOptions {
                include_usage: true,
            }),
            temperature: config.and_then(|c| c.temperature),
            top_p: config.and_then(|c| c.top_p),
            max_tokens: config.and_then(|c| c.max_output_tokens),
            stop: config
                .map(|c| c.stop_sequences.as_slice())
                .filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenizeBody<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
}

impl<'a> From<&'a CountTokensRequest> for TokenizeBody<'a> {
    fn from(request: &'a CountTokensRequest) -> Self {
        Self {
            model: &request.model,
            messages: messages(None, &request.contents),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbeddingsBody<'a> {
    pub model: &'a str,
    pub input: String,
}

impl<'a> From<&'a EmbedContentRequest> for EmbeddingsBody<'a> {
    fn from(request: &'a EmbedContentRequest) -> Self {
        Self {
            model: &request.model,
            input: request.content.text(),
        }
    }
}

// ============================================================================
// Replies
// ============================================================================

/// A chat completion, or one streamed chunk of it.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatReply {
    #[serde(default)]
    choices: Vec<ChoiceReply>,
    #[serde(default)]
    usage: Option<UsageReply>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceReply {
    #[serde(default)]
    index: Option<u32>,
    #[serde(default)]
    message: Option<MessageReply>,
    #[serde(default)]
    delta: Option<MessageReply>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MessageReply {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UsageReply {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
    #[serde(default)]
    total_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenizeReply {
    #[serde(default, alias = "totalTokens", alias = "count")]
    total_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EmbeddingsReply {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Default, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    embedding: Vec<f32>,
}

// ============================================================================
// Translation
// ============================================================================

fn finish_reason(value: Option<&str>) -> FinishReason {
    match value {
        None | Some("stop") => FinishReason::Stop,
        Some("length") => FinishReason::MaxTokens,
        Some("content_filter") => FinishReason::Safety,
        Some(_) => FinishReason::Other,
    }
}

impl ChatReply {
    pub(crate) fn into_canonical(self) -> GenerateContentResponse {
        let candidates = self
            .choices
            .into_iter()
            .enumerate()
            .map(|(position, choice)| {
                let message = choice.message.or(choice.delta).unwrap_or_default();
                Candidate {
                    content: Content {
                        role: match message.role.as_deref() {
                            Some("user") => Role::User,
                            _ => Role::Model,
                        },
                        parts: message.content.map(Part::text).into_iter().collect(),
                    },
                    finish_reason: finish_reason(choice.finish_reason.as_deref()),
                    index: choice
                        .index
                        .unwrap_or_else(|| u32::try_from(position).unwrap_or(u32::MAX)),
                }
            })
            .collect();

        let usage = self.usage.unwrap_or_default();

        GenerateContentResponse {
            candidates,
            usage_metadata: UsageMetadata {
                prompt_token_count: usage.prompt_tokens.unwrap_or(0),
                candidates_token_count: usage.completion_tokens.unwrap_or(0),
                total_token_count: usage.total_tokens.unwrap_or(0),
            },
            model_version: self.model,
        }
    }
}

impl TokenizeReply {
    pub(crate) fn into_canonical(self) -> CountTokensResponse {
        CountTokensResponse {
            total_tokens: self.total_tokens.unwrap_or(0),
        }
    }
}

impl EmbeddingsReply {
    pub(crate) fn into_canonical(self) -> EmbedContentResponse {
        EmbedContentResponse::single(
            self.data
                .into_iter()
                .next()
                .map(|d| d.embedding)
                .unwrap_or_default(),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
