//! Gemini backend descriptor.

use std::sync::Arc;

use tandem_core::BackendKind;
use tandem_fetch::{ContentGenerator, HttpClient};

use super::generator::GeminiGenerator;
use crate::descriptor::{BackendDescriptor, BackendMetadata, CliConfig, Endpoints, OAuthDefaults};
use crate::oauth::OAuth2Client;

/// Creates the Gemini backend descriptor.
pub fn gemini_descriptor() -> BackendDescriptor {
    BackendDescriptor {
        id: BackendKind::Gemini,
        metadata: BackendMetadata {
            display_name: "Gemini",
            default_model: "gemini-2.0-flash",
            default_embedding_model: "text-embedding-004",
        },
        endpoints: Endpoints {
            base_url: "https://generativelanguage.googleapis.com",
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth",
            token_url: "https://oauth2.googleapis.com/token",
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo",
        },
        oauth: OAuthDefaults {
            scopes: &[
                "https://www.googleapis.com/auth/cloud-platform",
                "https://www.googleapis.com/auth/userinfo.email",
                "https://www.googleapis.com/auth/userinfo.profile",
            ],
            extra_auth_params: &[("access_type", "offline"), ("prompt", "consent")],
            success_url: Some(
                "https://developers.google.com/gemini-code-assist/auth_success_gemini",
            ),
            failure_url: Some(
                "https://developers.google.com/gemini-code-assist/auth_failure_gemini",
            ),
        },
        cli: CliConfig {
            name: "gemini",
            aliases: &["google"],
        },
        build: build_gemini_generator,
    }
}

fn build_gemini_generator(
    auth: Arc<OAuth2Client>,
    http: HttpClient,
    base_url: String,
) -> Arc<dyn ContentGenerator> {
    Arc::new(GeminiGenerator::new(auth, http, base_url))
}
