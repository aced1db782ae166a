//! Gemini (Google) backend.
//!
//! Speaks the native Gemini API, which is also the canonical wire shape.
//! Authentication uses Google OAuth with offline access so a refresh token
//! is issued.
//!
//! ## API Endpoints
//!
//! - `POST /v1beta/models/{model}:generateContent`
//! - `POST /v1beta/models/{model}:streamGenerateContent?alt=sse`
//! - `POST /v1beta/models/{model}:countTokens`
//! - `POST /v1beta/models/{model}:embedContent`

mod descriptor;
mod generator;
mod wire;

pub use descriptor::gemini_descriptor;
pub use generator::GeminiGenerator;
