use anyhow::Result;
use redis::AsyncCommands;
use serde::Serialize;
use time::OffsetDateTime;

use crate::infra::cache::RedisCache;

/// Route whose rendered output lists posts, likes and comments.
pub const HOME_ROUTE: &str = "/";

/// Channel renderers subscribe to for revalidation requests.
pub const REVALIDATE_CHANNEL: &str = "pages:revalidate";

#[derive(Debug, Serialize)]
struct RevalidateMessage<'a> {
    route: &'a str,
    #[serde(with = "time::serde::rfc3339")]
    invalidated_at: OffsetDateTime,
}

/// Marks rendered routes stale after a mutation.
#[derive(Clone)]
pub struct PageInvalidator {
    cache: RedisCache,
}

impl PageInvalidator {
    pub fn new(cache: RedisCache) -> Self {
        Self { cache }
    }

    /// Never fails the caller: the mutation already committed.
    pub async fn invalidate(&self, route: &str) {
        if let Err(err) = self.mark_stale(route).await {
            tracing::warn!(error = ?err, route, "failed to invalidate route");
        }
    }

    /// Unix timestamp of the last invalidation of `route`, if any.
    pub async fn stale_since(&self, route: &str) -> Result<Option<i64>> {
        let mut conn = self.cache.connection().await?;
        let since: Option<i64> = conn.get(stale_key(route)).await?;
        Ok(since)
    }

    async fn mark_stale(&self, route: &str) -> Result<()> {
        let message = RevalidateMessage {
            route,
            invalidated_at: OffsetDateTime::now_utc(),
        };
        let payload = serde_json::to_string(&message)?;

        let mut conn = self.cache.connection().await?;
        redis::pipe()
            .atomic()
            .set(stale_key(route), message.invalidated_at.unix_timestamp())
            .ignore()
            .publish(REVALIDATE_CHANNEL, payload)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        tracing::debug!(route, "route marked stale");
        Ok(())
    }
}

pub fn stale_key(route: &str) -> String {
    format!("page:stale:{}", route)
}
