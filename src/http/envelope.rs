use axum::Json;
use serde::Serialize;

/// Successful response body: `{"success": true, ...fields of T}`.
///
/// Failures are rendered by [`crate::http::AppError`] as
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Payload for operations that report nothing beyond success.
#[derive(Debug, Serialize)]
pub struct Empty {}
