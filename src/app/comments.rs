use anyhow::Result;
use uuid::Uuid;

use crate::app::error::ActionError;
use crate::app::invalidation::{PageInvalidator, HOME_ROUTE};
use crate::app::posts::comment_from_row;
use crate::domain::engagement::CommentView;
use crate::domain::notification::NotificationKind;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct CommentService {
    db: Db,
    invalidator: PageInvalidator,
}

impl CommentService {
    pub fn new(db: Db, invalidator: PageInvalidator) -> Self {
        Self { db, invalidator }
    }

    /// Adds a comment and, unless the actor wrote the post, a notification
    /// pointing at it. Both rows commit together or not at all.
    pub async fn create_comment(
        &self,
        actor: Option<Uuid>,
        post_id: Uuid,
        content: String,
    ) -> Result<CommentView, ActionError> {
        let user_id = ActionError::require_actor(actor)?;
        if content.trim().is_empty() {
            return Err(ActionError::EmptyContent);
        }

        let comment = self
            .insert(user_id, post_id, &content)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, user_id = %user_id, post_id = %post_id, "failed to create comment");
                ActionError::Persistence("Failed to create comment")
            })?
            .ok_or(ActionError::PostNotFound)?;

        self.invalidator.invalidate(HOME_ROUTE).await;
        tracing::info!(comment_id = %comment.id, post_id = %post_id, user_id = %user_id, "comment created");

        Ok(comment)
    }

    async fn insert(&self, user_id: Uuid, post_id: Uuid, content: &str) -> Result<Option<CommentView>> {
        let mut tx = self.db.begin().await?;

        let post_author: Option<Uuid> =
            sqlx::query_scalar("SELECT author_id FROM posts WHERE id = $1 FOR SHARE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(post_author) = post_author else {
            return Ok(None);
        };

        let row = sqlx::query(
            "WITH inserted AS ( \
                INSERT INTO comments (post_id, author_id, content) \
                VALUES ($1, $2, $3) \
                RETURNING id, post_id, author_id, content, created_at \
             ) \
             SELECT c.id, c.post_id, c.author_id, c.content, c.created_at, \
                    u.name AS author_name, u.image AS author_image, u.username AS author_username \
             FROM inserted c \
             JOIN users u ON u.id = c.author_id",
        )
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;
        let comment = comment_from_row(&row);

        // The notification references the comment, so it is written second.
        if post_author != user_id {
            sqlx::query(
                "INSERT INTO notifications (kind, user_id, creator_id, post_id, comment_id) \
                 VALUES ($1::notification_kind, $2, $3, $4, $5)",
            )
            .bind(NotificationKind::Comment.as_db())
            .bind(post_author)
            .bind(user_id)
            .bind(post_id)
            .bind(comment.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(comment))
    }
}
