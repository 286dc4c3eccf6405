use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use contracts::system::auth::TokenClaims;

/// Пользователь запроса: claims, которые положил `require_auth`/`require_admin`.
///
/// ```rust,ignore
/// async fn handler(CurrentUser(claims): CurrentUser) -> Response
/// ```
pub struct CurrentUser(pub TokenClaims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<TokenClaims>() {
            Some(claims) => Ok(CurrentUser(claims.clone())),
            None => {
                tracing::warn!("No auth middleware on route {}", parts.uri.path());
                Err(StatusCode::UNAUTHORIZED)
            }
        }
    }
}
