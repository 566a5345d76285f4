use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::convert::Infallible;
use std::sync::Arc;
use zipdrop_core::{AppError, Capability};

/// Resolve the caller's capability from `Authorization: Bearer <jwt>` and store it in
/// the request extensions.
///
/// A missing header resolves to the anonymous capability. A malformed or invalid
/// token is rejected with 401.
pub async fn capability_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    let capability = match header {
        None => Capability::anonymous(),
        Some(value) => {
            let Some(token) = value.strip_prefix("Bearer ") else {
                return HttpAppError(AppError::Unauthorized(
                    "Authorization header must use the Bearer scheme".to_string(),
                ))
                .into_response();
            };
            match state.jwt.resolve(token.trim()) {
                Ok(capability) => capability,
                Err(e) => return HttpAppError(e).into_response(),
            }
        }
    };

    tracing::debug!(
        identity = ?capability.identity(),
        privileged = capability.is_privileged(),
        "Capability resolved"
    );
    request.extensions_mut().insert(capability);
    next.run(request).await
}

/// Capability of the current caller; anonymous when the middleware did not run.
#[derive(Debug, Clone)]
pub struct Caller(pub Capability);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(
            parts
                .extensions
                .get::<Capability>()
                .cloned()
                .unwrap_or_else(Capability::anonymous),
        ))
    }
}
