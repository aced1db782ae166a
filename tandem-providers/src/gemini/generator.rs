//! Gemini content generator.

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

use super::wire::{CountBody, CountReply, EmbedBody, EmbedReply, GenerateBody, GenerateReply};
use crate::backend::BackendTransport;
use crate::oauth::OAuth2Client;

const API_VERSION: &str = "v1beta";

/// Generator for the Gemini API.
pub struct GeminiGenerator {
    transport: BackendTransport,
}

impl GeminiGenerator {
    /// Creates a generator rooted at `base_url`.
    pub fn new(auth: Arc<OAuth2Client>, http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            transport: BackendTransport::new(auth, http, base_url),
        }
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        self.transport
            .url(&format!("{API_VERSION}/models/{model}:{method}"))
    }
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    fn kind(&self) -> BackendKind {
        BackendKind::Gemini
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenerateError> {
        let url = self.model_url(&request.model, "generateContent");
        let reply: GenerateReply = self
            .transport
            .post_json(&url, &GenerateBody::from(request))
            .await?;
        Ok(reply.into_canonical())
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn generate_content_stream(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<ContentStream, GenerateError> {
        let url = self.model_url(&request.model, "streamGenerateContent?alt=sse");
        let events = self
            .transport
            .post_stream(&url, &GenerateBody::from(request))
            .await?;
        debug!("Gemini stream opened");

        let fragments = events.filter_map(|event| async move {
            match event {
                Ok(data) => parse_sse_data::<GenerateReply>(&data, "gemini")
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
        let url = self.model_url(&request.model, "countTokens");
        let body = CountBody {
            contents: &request.contents,
        };
        let reply: CountReply = self.transport.post_json(&url, &body).await?;
        Ok(reply.into_canonical())
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn embed_content(
        &self,
        request: &EmbedContentRequest,
    ) -> Result<EmbedContentResponse, GenerateError> {
        let url = self.model_url(&request.model, "embedContent");
        let model = request.model.strip_prefix("models/").unwrap_or(&request.model);
        let body = EmbedBody {
            model: format!("models/{model}"),
            content: &request.content,
        };
        let reply: EmbedReply = self.transport.post_json(&url, &body).await?;
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
    use tandem_core::{Content, FinishReason};
    use tandem_fetch::AuthError;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    fn generator(backend: &Backend) -> GeminiGenerator {
        GeminiGenerator::new(
            backend.auth.clone(),
            HttpClient::new().unwrap(),
            backend.server.uri(),
        )
    }

    #[tokio::test]
    async fn test_generate_content_posts_canonical_body() {
        let backend = Backend::start(BackendKind::Gemini).await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Hello"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Hi there"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 1, "candidatesTokenCount": 2, "totalTokenCount": 3}
            })))
            .expect(1)
            .mount(&backend.server)
            .await;

        let request = GenerateContentRequest::prompt("gemini-2.0-flash", "Hello");
        let response = generator(&backend).generate_content(&request).await.unwrap();

        assert_eq!(response.text().as_deref(), Some("Hi there"));
        assert_eq!(response.candidates[0].finish_reason, FinishReason::Stop);
        assert_eq!(response.usage_metadata.total_token_count, 3);
    }

    #[tokio::test]
    async fn test_model_prefix_is_stripped() {
        let backend = Backend::start(BackendKind::Gemini).await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .expect(1)
            .mount(&backend.server)
            .await;

        let request = GenerateContentRequest::prompt("models/gemini-pro", "Hello");
        generator(&backend).generate_content(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_backend_error_carries_status_and_body() {
        let backend = Backend::start(BackendKind::Gemini).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exhausted"))
            .mount(&backend.server)
            .await;

        let request = GenerateContentRequest::prompt("gemini-2.0-flash", "Hello");
        let err = generator(&backend).generate_content(&request).await.unwrap_err();

        match err {
            GenerateError::Backend {
                status,
                status_text,
                body,
            } => {
                assert_eq!(status, 429);
                assert_eq!(status_text, "Too Many Requests");
                assert_eq!(body, "quota exhausted");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_makes_no_backend_call() {
        let backend = Backend::unauthenticated(BackendKind::Gemini).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&backend.server)
            .await;

        let request = GenerateContentRequest::prompt("gemini-2.0-flash", "Hello");
        let err = generator(&backend).generate_content(&request).await.unwrap_err();

        assert!(matches!(
            err,
            GenerateError::Auth(AuthError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn test_stream_yields_fragments_and_skips_malformed() {
        let backend = Backend::start(BackendKind::Gemini).await;
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hel\"}]}}]}\n\n",
            "data: not json\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"lo\"}]},\"finishReason\":\"STOP\"}]}\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&backend.server)
            .await;

        let request = GenerateContentRequest::prompt("gemini-2.0-flash", "Hello");
        let stream = generator(&backend)
            .generate_content_stream(&request)
            .await
            .unwrap();
        let fragments: Vec<_> = stream.collect().await;

        assert_eq!(fragments.len(), 2);
        let text: String = fragments
            .into_iter()
            .map(|f| f.unwrap().text().unwrap_or_default())
            .collect();
        assert_eq!(text, "Hello");
    }

    #[tokio::test]
    async fn test_stream_open_failure_is_error() {
        let backend = Backend::start(BackendKind::Gemini).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&backend.server)
            .await;

        let request = GenerateContentRequest::prompt("gemini-2.0-flash", "Hello");
        let result = generator(&backend).generate_content_stream(&request).await;

        assert!(matches!(
            result,
            Err(GenerateError::Backend { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_count_tokens() {
        let backend = Backend::start(BackendKind::Gemini).await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:countTokens"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"totalTokens": 7})),
            )
            .mount(&backend.server)
            .await;

        let request =
            CountTokensRequest::new("gemini-2.0-flash", vec![Content::user("count me")]);
        let response = generator(&backend).count_tokens(&request).await.unwrap();

        assert_eq!(response.total_tokens, 7);
    }

    #[tokio::test]
    async fn test_embed_content() {
        let backend = Backend::start(BackendKind::Gemini).await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/text-embedding-004:embedContent"))
            .and(body_partial_json(
                serde_json::json!({"model": "models/text-embedding-004"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embedding": {"values": [0.5, -0.25]}
            })))
            .mount(&backend.server)
            .await;

        let request = EmbedContentRequest::new("text-embedding-004", Content::user("embed me"));
        let response = generator(&backend).embed_content(&request).await.unwrap();

        assert_eq!(response.first(), Some(&[0.5, -0.25][..]));
    }
}
