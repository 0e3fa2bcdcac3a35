use axum::{routing::delete, routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route("/v1/posts/:id", delete(handlers::delete_post))
        .route("/v1/posts/:id/like", post(handlers::toggle_like))
        .route("/v1/posts/:id/comments", post(handlers::create_comment))
}

pub fn profiles() -> Router<AppState> {
    Router::new()
        .route("/v1/profiles/:username", get(handlers::get_profile))
        .route("/v1/users/:id/posts", get(handlers::list_user_posts))
        .route("/v1/users/:id/liked-posts", get(handlers::list_liked_posts))
        .route("/v1/users/:id/following", get(handlers::following_status))
}

pub fn notifications() -> Router<AppState> {
    Router::new()
        .route("/v1/notifications", get(handlers::list_notifications))
        .route(
            "/v1/notifications/read",
            post(handlers::mark_notifications_read),
        )
}
