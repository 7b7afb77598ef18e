use crate::error::ApiError;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Verified caller identity, as established by the fronting auth layer.
///
/// Credential verification happens outside this service; the auth
/// collaborator forwards the authenticated user id in the `x-user-id`
/// header and the core trusts it for ownership checks.
pub struct CallerId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing x-user-id header".to_string()))?;
        let id = header
            .parse::<i32>()
            .map_err(|_| ApiError::Unauthorized("invalid x-user-id header".to_string()))?;
        Ok(CallerId(id))
    }
}
