use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

use crate::app::error::ActionError;
use crate::domain::notification::{
    NotificationComment, NotificationKind, NotificationPost, NotificationView,
};
use crate::domain::user::AuthorSummary;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct NotificationService {
    db: Db,
}

impl NotificationService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// The actor's notifications, newest first.
    pub async fn list_notifications(
        &self,
        actor: Option<Uuid>,
    ) -> Result<Vec<NotificationView>, ActionError> {
        let user_id = ActionError::require_actor(actor)?;

        self.fetch(user_id).await.map_err(|err| {
            tracing::error!(error = ?err, user_id = %user_id, "failed to list notifications");
            ActionError::Persistence("Failed to fetch notifications")
        })
    }

    /// Ids that are not the actor's, or already read, are skipped.
    pub async fn mark_notifications_read(
        &self,
        actor: Option<Uuid>,
        notification_ids: &[Uuid],
    ) -> Result<u64, ActionError> {
        let user_id = ActionError::require_actor(actor)?;
        if notification_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "UPDATE notifications \
             SET read = true \
             WHERE user_id = $1 AND id = ANY($2) AND read = false",
        )
        .bind(user_id)
        .bind(notification_ids)
        .execute(self.db.pool())
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %user_id, "failed to mark notifications read");
            ActionError::Persistence("Failed to mark notifications as read")
        })?;

        Ok(result.rows_affected())
    }

    async fn fetch(&self, user_id: Uuid) -> Result<Vec<NotificationView>> {
        let rows = sqlx::query(
            "SELECT n.id, n.kind::text AS kind, n.read, n.created_at, \
                    u.id AS creator_id, u.name AS creator_name, u.image AS creator_image, \
                    u.username AS creator_username, \
                    p.id AS post_id, p.content AS post_content, p.image AS post_image, \
                    c.id AS comment_id, c.content AS comment_content, c.created_at AS comment_created_at \
             FROM notifications n \
             JOIN users u ON u.id = n.creator_id \
             LEFT JOIN posts p ON p.id = n.post_id \
             LEFT JOIN comments c ON c.id = n.comment_id \
             WHERE n.user_id = $1 \
             ORDER BY n.created_at DESC, n.id DESC",
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut notifications = Vec::with_capacity(rows.len());
        for row in rows {
            let kind: String = row.get("kind");
            let kind = NotificationKind::from_db(&kind)
                .ok_or_else(|| anyhow::anyhow!("unknown notification kind: {}", kind))?;

            let post_id: Option<Uuid> = row.get("post_id");
            let post = post_id.map(|id| NotificationPost {
                id,
                content: row.get("post_content"),
                image: row.get("post_image"),
            });

            let comment_id: Option<Uuid> = row.get("comment_id");
            let comment = comment_id.map(|id| NotificationComment {
                id,
                content: row.get("comment_content"),
                created_at: row.get("comment_created_at"),
            });

            notifications.push(NotificationView {
                id: row.get("id"),
                kind,
                read: row.get("read"),
                created_at: row.get("created_at"),
                creator: AuthorSummary {
                    id: row.get("creator_id"),
                    name: row.get("creator_name"),
                    image: row.get("creator_image"),
                    username: row.get("creator_username"),
                },
                post,
                comment,
            });
        }

        Ok(notifications)
    }
}
