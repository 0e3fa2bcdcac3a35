use thiserror::Error;

/// Every way a post/like/comment/profile operation can fail.
///
/// The `Display` text is what callers see in the `error` field of the
/// response envelope, so persistence faults carry a fixed message instead of
/// the underlying driver error (which is logged where it happens).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("Post not found")]
    PostNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Unauthorized - no delete permission")]
    Unauthorized,
    #[error("Content is required")]
    EmptyContent,
    #[error("{0}")]
    Persistence(&'static str),
}

impl ActionError {
    /// Resolves the acting user or fails with `Unauthenticated`.
    pub fn require_actor(actor: Option<uuid::Uuid>) -> Result<uuid::Uuid, Self> {
        actor.ok_or(Self::Unauthenticated)
    }
}
