use std::collections::HashMap;

use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::app::error::ActionError;
use crate::app::invalidation::{PageInvalidator, HOME_ROUTE};
use crate::domain::engagement::{CommentView, LikeRef};
use crate::domain::post::{PostSummary, PostView};
use crate::domain::user::AuthorSummary;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct PostService {
    db: Db,
    invalidator: PageInvalidator,
}

/// Which posts a listing covers.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PostScope {
    All,
    AuthoredBy(Uuid),
    LikedBy(Uuid),
}

enum Removal {
    Missing,
    NotOwner,
    Removed,
}

impl PostService {
    pub fn new(db: Db, invalidator: PageInvalidator) -> Self {
        Self { db, invalidator }
    }

    pub async fn create_post(
        &self,
        actor: Option<Uuid>,
        content: String,
        image: Option<String>,
    ) -> Result<PostSummary, ActionError> {
        let author_id = ActionError::require_actor(actor)?;

        let row = sqlx::query(
            "INSERT INTO posts (author_id, content, image) \
             VALUES ($1, $2, $3) \
             RETURNING id, content, image, author_id, created_at",
        )
        .bind(author_id)
        .bind(content)
        .bind(normalize_image(image))
        .fetch_one(self.db.pool())
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, author_id = %author_id, "failed to create post");
            ActionError::Persistence("Failed to create post")
        })?;

        let post = PostSummary {
            id: row.get("id"),
            content: row.get("content"),
            image: row.get("image"),
            created_at: row.get("created_at"),
            author_id: row.get("author_id"),
        };

        self.invalidator.invalidate(HOME_ROUTE).await;
        tracing::info!(post_id = %post.id, author_id = %author_id, "post created");

        Ok(post)
    }

    /// Every post, newest first, with author, comments and likes attached.
    pub async fn get_posts(&self) -> Result<Vec<PostView>, ActionError> {
        load_post_views(&self.db, PostScope::All)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "failed to fetch posts");
                ActionError::Persistence("Failed to fetch posts")
            })
    }

    pub async fn delete_post(&self, actor: Option<Uuid>, post_id: Uuid) -> Result<(), ActionError> {
        let user_id = ActionError::require_actor(actor)?;

        let removal = self.remove_post(user_id, post_id).await.map_err(|err| {
            tracing::error!(error = ?err, user_id = %user_id, post_id = %post_id, "failed to delete post");
            ActionError::Persistence("Failed to delete post")
        })?;

        match removal {
            Removal::Missing => Err(ActionError::PostNotFound),
            Removal::NotOwner => {
                tracing::warn!(user_id = %user_id, post_id = %post_id, "delete denied for non-author");
                Err(ActionError::Unauthorized)
            }
            Removal::Removed => {
                self.invalidator.invalidate(HOME_ROUTE).await;
                tracing::info!(user_id = %user_id, post_id = %post_id, "post deleted");
                Ok(())
            }
        }
    }

    async fn remove_post(&self, user_id: Uuid, post_id: Uuid) -> Result<Removal> {
        let author_id: Option<Uuid> =
            sqlx::query_scalar("SELECT author_id FROM posts WHERE id = $1")
                .bind(post_id)
                .fetch_optional(self.db.pool())
                .await?;

        match author_id {
            None => return Ok(Removal::Missing),
            Some(author_id) if author_id != user_id => return Ok(Removal::NotOwner),
            Some(_) => {}
        }

        // Comments, likes and notifications go with the post via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() > 0 {
            Ok(Removal::Removed)
        } else {
            Ok(Removal::Missing)
        }
    }
}

pub(crate) async fn load_post_views(db: &Db, scope: PostScope) -> Result<Vec<PostView>> {
    let rows = match scope {
        PostScope::All => {
            sqlx::query(
                "SELECT p.id, p.content, p.image, p.created_at, p.author_id, \
                        u.name AS author_name, u.image AS author_image, u.username AS author_username \
                 FROM posts p \
                 JOIN users u ON u.id = p.author_id \
                 ORDER BY p.created_at DESC, p.id DESC",
            )
            .fetch_all(db.pool())
            .await?
        }
        PostScope::AuthoredBy(author_id) => {
            sqlx::query(
                "SELECT p.id, p.content, p.image, p.created_at, p.author_id, \
                        u.name AS author_name, u.image AS author_image, u.username AS author_username \
                 FROM posts p \
                 JOIN users u ON u.id = p.author_id \
                 WHERE p.author_id = $1 \
                 ORDER BY p.created_at DESC, p.id DESC",
            )
            .bind(author_id)
            .fetch_all(db.pool())
            .await?
        }
        PostScope::LikedBy(user_id) => {
            sqlx::query(
                "SELECT p.id, p.content, p.image, p.created_at, p.author_id, \
                        u.name AS author_name, u.image AS author_image, u.username AS author_username \
                 FROM posts p \
                 JOIN users u ON u.id = p.author_id \
                 JOIN likes l ON l.post_id = p.id AND l.user_id = $1 \
                 ORDER BY p.created_at DESC, p.id DESC",
            )
            .bind(user_id)
            .fetch_all(db.pool())
            .await?
        }
    };

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<Uuid> = rows.iter().map(|row| row.get("id")).collect();
    let mut comments = load_comments(db, &post_ids).await?;
    let mut likes = load_likes(db, &post_ids).await?;

    let mut posts = Vec::with_capacity(rows.len());
    for row in rows {
        let id: Uuid = row.get("id");
        let post_likes = likes.remove(&id).unwrap_or_default();
        posts.push(PostView {
            id,
            content: row.get("content"),
            image: row.get("image"),
            created_at: row.get("created_at"),
            author_id: row.get("author_id"),
            author: author_from_row(&row),
            comments: comments.remove(&id).unwrap_or_default(),
            like_count: post_likes.len() as i64,
            likes: post_likes,
        });
    }

    Ok(posts)
}

async fn load_comments(db: &Db, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<CommentView>>> {
    let rows = sqlx::query(
        "SELECT c.id, c.post_id, c.author_id, c.content, c.created_at, \
                u.name AS author_name, u.image AS author_image, u.username AS author_username \
         FROM comments c \
         JOIN users u ON u.id = c.author_id \
         WHERE c.post_id = ANY($1) \
         ORDER BY c.created_at ASC, c.id ASC",
    )
    .bind(post_ids)
    .fetch_all(db.pool())
    .await?;

    let mut by_post: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
    for row in rows {
        let comment = comment_from_row(&row);
        by_post.entry(comment.post_id).or_default().push(comment);
    }
    Ok(by_post)
}

async fn load_likes(db: &Db, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<LikeRef>>> {
    let rows = sqlx::query(
        "SELECT user_id, post_id FROM likes \
         WHERE post_id = ANY($1) \
         ORDER BY created_at ASC, user_id ASC",
    )
    .bind(post_ids)
    .fetch_all(db.pool())
    .await?;

    let mut by_post: HashMap<Uuid, Vec<LikeRef>> = HashMap::new();
    for row in rows {
        let post_id: Uuid = row.get("post_id");
        by_post.entry(post_id).or_default().push(LikeRef {
            user_id: row.get("user_id"),
        });
    }
    Ok(by_post)
}

/// Expects `author_id`, `author_name`, `author_image` and `author_username` columns.
pub(crate) fn author_from_row(row: &PgRow) -> AuthorSummary {
    AuthorSummary {
        id: row.get("author_id"),
        name: row.get("author_name"),
        image: row.get("author_image"),
        username: row.get("author_username"),
    }
}

pub(crate) fn comment_from_row(row: &PgRow) -> CommentView {
    CommentView {
        id: row.get("id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        author_id: row.get("author_id"),
        post_id: row.get("post_id"),
        author: author_from_row(row),
    }
}

fn normalize_image(image: Option<String>) -> Option<String> {
    image
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
