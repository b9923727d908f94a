//! API Request and Response Types
//!
//! This module defines the request bodies and the typed `data` payloads of
//! every endpoint, plus the envelope that wraps them.

use serde::{Deserialize, Serialize};

// Array types
mod array;
pub use array::*;

// ============================================================================
// RESPONSE ENVELOPE
// ============================================================================

/// Wrapper of every successful response.
///
/// Failures are rendered by [`ApiError`](crate::error::ApiError) with the
/// same `success` and `message` fields plus a `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Envelope<T> {
    /// Always `true` for this type
    pub success: bool,
    /// Human-readable outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Endpoint-specific payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `data`.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_empty_fields() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(Envelope::data(vec![1, 2]))?;
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2]}));

        let json = serde_json::to_value(Envelope::data(0).with_message("done"))?;
        assert_eq!(json["message"], "done");
        Ok(())
    }
}
