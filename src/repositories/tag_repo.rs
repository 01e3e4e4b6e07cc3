use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use futures::future;
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{PostView, Tag};
use crate::repositories::queries;
use crate::schema::tags;

#[derive(Clone)]
pub struct TagRepository {
    pool: AsyncDbPool,
    max_concurrency: usize,
}

impl TagRepository {
    pub fn new(pool: AsyncDbPool, max_concurrency: usize) -> Self {
        Self {
            pool,
            max_concurrency,
        }
    }

    /// Ensures a tag exists for every name and returns all of them.
    ///
    /// Existing names are left as they are, so calling this repeatedly with
    /// overlapping lists never duplicates a tag. An empty list issues no query.
    /// Row order is whatever the store returns.
    #[tracing::instrument(skip(self))]
    pub async fn create_tags(&self, names: &[String]) -> AppResult<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get().await?;
        queries::insert_tags(&mut conn, names)
            .await
            .map_err(|e| AppError::database("create tags", e))
    }

    /// Labels a post with a tag. Labeling twice is a no-op.
    pub async fn create_post_tag(&self, post_id: i32, tag_id: i32) -> AppResult<()> {
        let mut conn = self.pool.get().await?;

        queries::link_tag(&mut conn, post_id, tag_id)
            .await
            .map_err(|e| AppError::database("tag post", e))?;
        Ok(())
    }

    /// Labels a post with every tag in `tags`, then returns the hydrated post.
    ///
    /// Labels are inserted concurrently, at most `max_concurrency` at a time.
    /// Returns `None` if the post does not exist once labeling is done.
    #[tracing::instrument(skip(self, tags), fields(tags = tags.len()))]
    pub async fn add_tags_to_post(&self, post_id: i32, tags: &[Tag]) -> AppResult<Option<PostView>> {
        stream::iter(tags.iter().map(|tag| tag.id))
            .map(|tag_id| self.create_post_tag(post_id, tag_id))
            .buffer_unordered(self.max_concurrency.max(1))
            .try_for_each(|_| future::ready(Ok(())))
            .await?;

        let mut conn = self.pool.get().await?;
        queries::load_post_view(&mut conn, post_id)
            .await
            .map_err(|e| AppError::database("load post", e))
    }

    /// Lists every tag by name.
    pub async fn list_all(&self) -> AppResult<Vec<Tag>> {
        let mut conn = self.pool.get().await?;

        tags::table
            .select(Tag::as_select())
            .order(tags::name.asc())
            .load(&mut conn)
            .await
            .map_err(|e| AppError::database("list tags", e))
    }
}
