//! OpenAI backend descriptor.

use std::sync::Arc;

use tandem_core::BackendKind;
use tandem_fetch::{ContentGenerator, HttpClient};

use super::generator::OpenAiGenerator;
use crate::descriptor::{BackendDescriptor, BackendMetadata, CliConfig, Endpoints, OAuthDefaults};
use crate::oauth::OAuth2Client;

/// Creates the OpenAI backend descriptor.
pub fn openai_descriptor() -> BackendDescriptor {
    BackendDescriptor {
        id: BackendKind::OpenAi,
        metadata: BackendMetadata {
            display_name: "OpenAI",
            default_model: "gpt-4o-mini",
            default_embedding_model: "text-embedding-3-small",
        },
        endpoints: Endpoints {
            base_url: "https://api.openai.com/v1",
            auth_url: "https://auth.openai.com/oauth/authorize",
            token_url: "https://auth.openai.com/oauth/token",
            userinfo_url: "https://auth.openai.com/userinfo",
        },
        oauth: OAuthDefaults {
            scopes: &["openid", "profile", "email", "offline_access"],
            extra_auth_params: &[],
            success_url: None,
            failure_url: None,
        },
        cli: CliConfig {
            name: "openai",
            aliases: &["chatgpt", "gpt"],
        },
        build: build_openai_generator,
    }
}

fn build_openai_generator(
    auth: Arc<OAuth2Client>,
    http: HttpClient,
    base_url: String,
) -> Arc<dyn ContentGenerator> {
    Arc::new(OpenAiGenerator::new(auth, http, base_url))
}
