use axum::Router;

use crate::AppState;

mod auth;
mod envelope;
mod error;
mod extract;
mod handlers;
mod routes;

pub use auth::Actor;
pub use envelope::Envelope;
pub use error::AppError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::posts())
        .merge(routes::profiles())
        .merge(routes::notifications())
        .with_state(state)
}
