//! OpenAI-compatible backend.
//!
//! Translates canonical requests into the chat completions shape. The
//! canonical `model` role maps to `assistant`, and a system instruction
//! becomes a leading `system` message.
//!
//! ## API Endpoints
//!
//! - `POST /chat/completions` (with `stream: true` for SSE)
//! - `POST /tokenize`
//! - `POST /embeddings`

mod descriptor;
mod generator;
mod wire;

pub use descriptor::openai_descriptor;
pub use generator::OpenAiGenerator;
