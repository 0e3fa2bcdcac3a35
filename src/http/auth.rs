use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use uuid::Uuid;

use crate::app::identity::SessionResolver;
use crate::http::AppError;
use crate::AppState;

/// The user behind the request's session token, if any.
///
/// Never rejects a request for lacking a session: each operation decides
/// whether it needs an actor.
#[derive(Debug, Clone, Copy)]
pub struct Actor(pub Option<Uuid>);

#[axum::async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_actor(&state.sessions, &parts.headers).await
    }
}

async fn resolve_actor(sessions: &SessionResolver, headers: &HeaderMap) -> Result<Actor, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return Ok(Actor(None));
    };

    let user_id = sessions.resolve(token).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to resolve session");
        AppError::internal("Failed to authenticate")
    })?;

    Ok(Actor(user_id))
}
