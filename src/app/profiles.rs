use sqlx::Row;
use uuid::Uuid;

use crate::app::error::ActionError;
use crate::app::posts::{load_post_views, PostScope};
use crate::domain::post::PostView;
use crate::domain::user::Profile;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct ProfileService {
    db: Db,
}

impl ProfileService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn get_profile_by_username(&self, username: &str) -> Result<Profile, ActionError> {
        let row = sqlx::query(
            "SELECT u.id, u.username, u.name, u.image, u.bio, u.created_at, \
                    (SELECT COUNT(*) FROM follows f WHERE f.following_id = u.id) AS followers_count, \
                    (SELECT COUNT(*) FROM follows f WHERE f.follower_id = u.id) AS following_count, \
                    (SELECT COUNT(*) FROM posts p WHERE p.author_id = u.id) AS posts_count \
             FROM users u \
             WHERE u.username = $1",
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, username, "failed to fetch profile");
            ActionError::Persistence("Failed to fetch profile")
        })?
        .ok_or(ActionError::UserNotFound)?;

        Ok(Profile {
            id: row.get("id"),
            username: row.get("username"),
            name: row.get("name"),
            image: row.get("image"),
            bio: row.get("bio"),
            created_at: row.get("created_at"),
            followers_count: row.get("followers_count"),
            following_count: row.get("following_count"),
            posts_count: row.get("posts_count"),
        })
    }

    pub async fn get_user_posts(&self, user_id: Uuid) -> Result<Vec<PostView>, ActionError> {
        load_post_views(&self.db, PostScope::AuthoredBy(user_id))
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, user_id = %user_id, "failed to fetch user posts");
                ActionError::Persistence("Failed to fetch user posts")
            })
    }

    pub async fn get_user_liked_posts(&self, user_id: Uuid) -> Result<Vec<PostView>, ActionError> {
        load_post_views(&self.db, PostScope::LikedBy(user_id))
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, user_id = %user_id, "failed to fetch liked posts");
                ActionError::Persistence("Failed to fetch liked posts")
            })
    }

    /// Anonymous viewers follow nobody.
    pub async fn is_following(&self, actor: Option<Uuid>, user_id: Uuid) -> Result<bool, ActionError> {
        let Some(follower_id) = actor else {
            return Ok(false);
        };

        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2 \
             )",
        )
        .bind(follower_id)
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, follower_id = %follower_id, user_id = %user_id, "failed to check follow status");
            ActionError::Persistence("Failed to check follow status")
        })
    }
}
