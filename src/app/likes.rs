use anyhow::Result;
use uuid::Uuid;

use crate::app::error::ActionError;
use crate::app::invalidation::{PageInvalidator, HOME_ROUTE};
use crate::domain::engagement::LikeToggle;
use crate::domain::notification::NotificationKind;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct LikeService {
    db: Db,
    invalidator: PageInvalidator,
}

impl LikeService {
    pub fn new(db: Db, invalidator: PageInvalidator) -> Self {
        Self { db, invalidator }
    }

    /// Likes the post if the actor has not, unlikes it otherwise.
    ///
    /// A new like and its notification to the post's author commit together.
    /// Unliking never notifies, and neither does liking your own post.
    pub async fn toggle_like(
        &self,
        actor: Option<Uuid>,
        post_id: Uuid,
    ) -> Result<LikeToggle, ActionError> {
        let user_id = ActionError::require_actor(actor)?;

        let toggled = self.flip(user_id, post_id).await.map_err(|err| {
            tracing::error!(error = ?err, user_id = %user_id, post_id = %post_id, "failed to toggle like");
            ActionError::Persistence("Failed to toggle like")
        })?;
        let toggled = toggled.ok_or(ActionError::PostNotFound)?;

        self.invalidator.invalidate(HOME_ROUTE).await;
        tracing::debug!(user_id = %user_id, post_id = %post_id, outcome = ?toggled, "like toggled");

        Ok(toggled)
    }

    async fn flip(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<LikeToggle>> {
        let mut tx = self.db.begin().await?;

        let author_id: Option<Uuid> =
            sqlx::query_scalar("SELECT author_id FROM posts WHERE id = $1 FOR SHARE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(author_id) = author_id else {
            return Ok(None);
        };

        let removed = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        if removed.rows_affected() > 0 {
            tx.commit().await?;
            return Ok(Some(LikeToggle::Unliked));
        }

        // A concurrent toggle may have inserted first; the primary key makes
        // this a no-op instead of a duplicate, and only the winner notifies.
        let inserted = sqlx::query(
            "INSERT INTO likes (user_id, post_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, post_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() > 0 && author_id != user_id {
            sqlx::query(
                "INSERT INTO notifications (kind, user_id, creator_id, post_id) \
                 VALUES ($1::notification_kind, $2, $3, $4)",
            )
            .bind(NotificationKind::Like.as_db())
            .bind(author_id)
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(LikeToggle::Liked))
    }
}
