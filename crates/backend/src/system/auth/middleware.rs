use axum::{body::Body, extract::Request, http::{HeaderMap, StatusCode}, middleware::Next, response::Response};
use contracts::system::auth::TokenClaims;

/// Claims из заголовка `Authorization: Bearer <token>`
async fn bearer_claims(headers: &HeaderMap, path: &str) -> Result<TokenClaims, StatusCode> {
    let token = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    super::jwt::validate_token(token).await.map_err(|e| {
        tracing::debug!("Rejected token for {}: {}", path, e);
        StatusCode::UNAUTHORIZED
    })
}

/// Любой вошедший пользователь
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let claims = bearer_claims(req.headers(), req.uri().path()).await?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Только администратор
pub async fn require_admin(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let claims = bearer_claims(req.headers(), req.uri().path()).await?;
    if !claims.is_admin() {
        tracing::warn!(
            "User '{}' ({}) denied admin route {}",
            claims.username,
            claims.role.as_str(),
            req.uri().path()
        );
        return Err(StatusCode::FORBIDDEN);
    }
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
