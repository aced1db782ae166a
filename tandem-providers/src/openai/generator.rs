//! OpenAI-compatible content generator.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, instrument};

use tandem_core::{
    BackendKind, CountTokensRequest, CountTokensResponse, EmbedContentRequest,
    EmbedContentResponse, GenerateContentRequest, GenerateContentResponse,
};
use tandem_fetch::sse::parse_sse_data;
use tandem_fetch::{ContentGenerator, ContentStream, GenerateError, HttpClient};

use super::wire::{
    ChatBody, ChatReply, EmbeddingsBody, EmbeddingsReply, TokenizeBody, TokenizeReply,
};
use crate::backend::BackendTransport;
use crate::oauth::OAuth2Client;

/// Generator for OpenAI-compatible chat completion APIs.
pub struct OpenAiGenerator {
    transport: BackendTransport,
}

impl OpenAiGenerator {
    /// Creates a generator rooted at `base_url`.
    pub fn new(auth: Arc<OAuth2Client>, http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            transport: BackendTransport::new(auth, http, base_url),
        }
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    fn kind(&self) -> BackendKind {
        BackendKind::OpenAi
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerateError> {
        let url = self.transport.url("chat/completions");
        let reply: ChatReply = self
            .transport
            .post_json(&url, &ChatBody::new(request, false))
            .await?;
        Ok(reply.into_canonical())
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate_content_stream(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<ContentStream, GenerateError> {
        let url = self.transport.url("chat/completions");
        let events = self
            .transport
            .post_stream(&url, &ChatBody::new(request, true))
            .await?;
        debug!("OpenAI stream opened");

        let fragments = events.filter_map(|event| async move {
            match event {
                Ok(data) => parse_sse_data::<ChatReply>(&data, "openai")
                    .map(|reply| Ok(reply.into_canonical())),
                Err(e) => Some(Err(GenerateError::from(e))),
            }
        });

        Ok(Box::pin(fragments))
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn count_tokens(
        &self,
        request: &CountTokensRequest,
    ) -> Result<CountTokensResponse, GenerateError> {
        let url = self.transport.url("tokenize");
        let reply: TokenizeReply = self
            .transport
            .post_json(&url, &TokenizeBody::from(request))
            .await?;
        Ok(reply.into_canonical())
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn embed_content(
        &self,
        request: &EmbedContentRequest,
    ) -> Result<EmbedContentResponse, GenerateError> {
        let url = self.transport.url("embeddings");
        let reply: EmbeddingsReply = self
            .transport
            .post_json(&url, &EmbeddingsBody::from(request))
            .await?;
        Ok(reply.into_canonical())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Backend;
    use tandem_core::Content;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn generator(backend: &Backend) -> OpenAiGenerator {
        OpenAiGenerator::new(
            backend.auth.clone(),
            HttpClient::new().unwrap(),
            backend.server.uri(),
        )
    }

    #[tokio::test]
    async fn test_generate_content_translates_choices() {
        let backend = Backend::start(BackendKind::OpenAi).await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "model": "m",
                "messages": [{"role": "user", "content": "Hello"}],
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "Hi"}, "finish_reason": "stop", "index": 0}],
                "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
            })))
            .expect(1)
            .mount(&backend.server)
            .await;

        let request = GenerateContentRequest::prompt("m", "Hello");
        let response = generator(&backend).generate_content(&request).await.unwrap();

        assert_eq!(response.candidates[0].content.parts[0].text, "Hi");
        assert_eq!(response.usage_metadata.total_token_count, 2);
    }

    #[tokio::test]
    async fn test_unauthorized_status_is_backend_error() {
        let backend = Backend::start(BackendKind::OpenAi).await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&backend.server)
            .await;

        let request = GenerateContentRequest::prompt("m", "Hello");
        let err = generator(&backend).generate_content(&request).await.unwrap_err();

        match err {
            GenerateError::Backend {
                status, status_text, ..
            } => {
                assert_eq!(status, 401);
                assert_eq!(status_text, "Unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_translate_to_no_candidates() {
        let backend = Backend::start(BackendKind::OpenAi).await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&backend.server)
            .await;

        let request = GenerateContentRequest::prompt("m", "Hello");
        let response = generator(&backend).generate_content(&request).await.unwrap();

        assert!(!response.has_candidates());
    }

    #[tokio::test]
    async fn test_stream_concatenates_deltas_until_done() {
        let backend = Backend::start(BackendKind::OpenAi).await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"Hi\"},\"index\":0}]}\n\n",
            ": keep-alive\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" there\"},\"index\":0,\"finish_reason\":\"stop\"}]}\n\n",
            "data: {\"choices\":[],\"usage\":{\"prompt_tokens\":1,\"completion_tokens\":2,\"total_tokens\":3}}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({"stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&backend.server)
            .await;

        let request = GenerateContentRequest::prompt("m", "Hello");
        let fragments: Vec<_> = generator(&backend)
            .generate_content_stream(&request)
            .await
            .unwrap()
            .map(Result::unwrap)
            .collect()
            .await;

        assert_eq!(fragments.len(), 3);
        let text: String = fragments.iter().filter_map(GenerateContentResponse::text).collect();
        assert_eq!(text, "Hi there");
        assert_eq!(fragments[2].usage_metadata.total_token_count, 3);
    }

    #[tokio::test]
    async fn test_count_tokens_uses_tokenize() {
        let backend = Backend::start(BackendKind::OpenAi).await;
        Mock::given(method("POST"))
            .and(path("/tokenize"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "user", "content": "count me"}]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"totalTokens": 4})),
            )
            .mount(&backend.server)
            .await;

        let request = CountTokensRequest::new("m", vec![Content::user("count me")]);
        let response = generator(&backend).count_tokens(&request).await.unwrap();

        assert_eq!(response.total_tokens, 4);
    }

    #[tokio::test]
    async fn test_embed_content_reads_first_vector() {
        let backend = Backend::start(BackendKind::OpenAi).await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(serde_json::json!({"input": "embed me"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.25, 0.75], "index": 0}]
            })))
            .mount(&backend.server)
            .await;

        let request = EmbedContentRequest::new("text-embedding-3-small", Content::user("embed me"));
        let response = generator(&backend).embed_content(&request).await.unwrap();

        assert_eq!(response.first(), Some(&[0.25, 0.75][..]));
    }
}
