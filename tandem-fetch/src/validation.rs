//! Response validation applied to each attempt's successful result.

use tandem_core::{CountTokensResponse, EmbedContentResponse, GenerateContentResponse};

use crate::error::GenerateError;
use crate::generator::ContentStream;

/// Rejects results that succeeded at the HTTP level but carry nothing usable.
pub trait Validate {
    /// Returns an error if the value is semantically empty.
    fn validate(&self) -> Result<(), GenerateError>;
}

impl Validate for GenerateContentResponse {
    fn validate(&self) -> Result<(), GenerateError> {
        if self.has_candidates() {
            Ok(())
        } else {
            Err(GenerateError::InvalidResponse(
                "response contained no candidates".to_string(),
            ))
        }
    }
}

impl Validate for CountTokensResponse {
    fn validate(&self) -> Result<(), GenerateError> {
        Ok(())
    }
}

impl Validate for EmbedContentResponse {
    fn validate(&self) -> Result<(), GenerateError> {
        Ok(())
    }
}

// A stream is valid once opened; fragments are passed through as they arrive.
impl Validate for ContentStream {
    fn validate(&self) -> Result<(), GenerateError> {
        Ok(())
    }
}
