//! `?id=N` query extractor.
//!
//! Rejections are [`ApiError`]s, so a missing or malformed id is answered
//! with the regular failure envelope instead of Axum's plain-text rejection.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use sortbox_core::ArrayId;

use crate::error::{ApiError, ApiResult};
use crate::types::IdQuery;

/// Array id taken from the `id` query parameter.
///
/// # Example
///
/// ```rust,ignore
/// async fn load_array(ArrayIdParam(id): ArrayIdParam) -> ApiResult<impl IntoResponse> {
///     // id is an ArrayId
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayIdParam(pub ArrayId);

fn parse_id(raw: &str) -> ApiResult<ArrayId> {
    raw.trim()
        .parse::<ArrayId>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid array id '{}'", raw)))
}

#[async_trait]
impl<S> FromRequestParts<S> for ArrayIdParam
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query): Query<IdQuery> = Query::from_request_parts(parts, state).await?;
        let raw = query.id.ok_or_else(|| ApiError::missing_field("id"))?;
        parse_id(&raw).map(ArrayIdParam)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::http::Request;

    async fn extract(uri: &str) -> ApiResult<ArrayIdParam> {
        let (mut parts, _) = Request::builder()
            .uri(uri)
            .body(())
            .map_err(|e| ApiError::internal_error(e.to_string()))?
            .into_parts();
        ArrayIdParam::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_id() -> ApiResult<()> {
        assert_eq!(extract("/arrays/load?id=42").await?, ArrayIdParam(42));
        assert_eq!(extract("/arrays/load?id=%207").await?, ArrayIdParam(7));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_id() {
        let err = extract("/arrays/load").await.err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::MissingField));
    }

    #[tokio::test]
    async fn test_invalid_id() {
        for uri in ["/arrays/load?id=abc", "/arrays/load?id=", "/arrays/load?id=1.5"] {
            let err = extract(uri).await.err();
            assert_eq!(err.map(|e| e.code), Some(ErrorCode::InvalidInput), "{}", uri);
        }
    }
}
