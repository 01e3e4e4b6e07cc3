//! Post repository for async database operations.
//!
//! Every post handed out is hydrated with its author and tags. Writes that
//! touch more than one table run in a single transaction.

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{CreatePost, Post, PostPatch, PostView};
use crate::repositories::queries;
use crate::schema::{post_tags, posts, tags};

#[derive(Clone)]
pub struct PostRepository {
    pool: AsyncDbPool,
    max_concurrency: usize,
}

impl PostRepository {
    pub fn new(pool: AsyncDbPool, max_concurrency: usize) -> Self {
        Self {
            pool,
            max_concurrency,
        }
    }

    /// Creates a post, creates any tags it names that do not exist yet, and
    /// labels the post with all of them.
    #[tracing::instrument(skip(self, input), fields(author_id = input.author_id))]
    pub async fn create(&self, input: CreatePost) -> AppResult<PostView> {
        let (new_post, tag_names) = input.split();
        let mut conn = self.pool.get().await?;

        let view = conn
            .transaction::<_, AppError, _>(|conn| {
                async move {
                    let post: Post = diesel::insert_into(posts::table)
                        .values(&new_post)
                        .returning(Post::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(|e| AppError::database("create post", e))?;

                    let tag_rows = queries::insert_tags(conn, &tag_names)
                        .await
                        .map_err(|e| AppError::database("create tags", e))?;
                    for tag in &tag_rows {
                        queries::link_tag(conn, post.id, tag.id)
                            .await
                            .map_err(|e| AppError::database("tag post", e))?;
                    }

                    queries::load_post_view(conn, post.id)
                        .await
                        .map_err(|e| AppError::database("load post", e))?
                        .ok_or_else(|| AppError::Internal {
                            source: anyhow::anyhow!("post {} vanished inside its own transaction", post.id),
                        })
                }
                .scope_boxed()
            })
            .await?;

        tracing::info!(post_id = view.id, tags = view.tags.len(), "Post created");
        Ok(view)
    }

    /// Applies a sparse update to a post.
    ///
    /// Scalar fields are updated when present. When `patch.tags` is `Some`,
    /// the post's tag set is replaced: missing tags are created, labels not in
    /// the new set are removed, and labels for the new set are added. The
    /// whole sequence is one transaction.
    ///
    /// # Returns
    /// The hydrated post after the update, or `None` if no post has `post_id`
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, post_id: i32, patch: PostPatch) -> AppResult<Option<PostView>> {
        let (changes, tag_names) = patch.split();
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                if !queries::post_exists(conn, post_id)
                    .await
                    .map_err(|e| AppError::database("find post", e))?
                {
                    return Ok(None);
                }

                if !changes.is_empty() {
                    diesel::update(posts::table.find(post_id))
                        .set(&changes)
                        .execute(conn)
                        .await
                        .map_err(|e| AppError::database("update post", e))?;
                }

                if let Some(tag_names) = tag_names {
                    let tag_rows = queries::insert_tags(conn, &tag_names)
                        .await
                        .map_err(|e| AppError::database("create tags", e))?;
                    let keep: Vec<i32> = tag_rows.iter().map(|tag| tag.id).collect();

                    let removed = queries::unlink_tags_except(conn, post_id, &keep)
                        .await
                        .map_err(|e| AppError::database("untag post", e))?;
                    for tag_id in &keep {
                        queries::link_tag(conn, post_id, *tag_id)
                            .await
                            .map_err(|e| AppError::database("tag post", e))?;
                    }
                    tracing::debug!(removed, kept = keep.len(), "Post tag set replaced");
                }

                queries::load_post_view(conn, post_id)
                    .await
                    .map_err(|e| AppError::database("load post", e))
            }
            .scope_boxed()
        })
        .await
    }

    /// Lists every post, hydrated, in id order.
    ///
    /// A post deleted while the list is being hydrated is left out, so the
    /// result can be shorter than the matching id set.
    pub async fn list_all(&self) -> AppResult<Vec<PostView>> {
        let mut conn = self.pool.get().await?;
        let post_ids: Vec<i32> = posts::table
            .select(posts::id)
            .order(posts::id.asc())
            .load(&mut conn)
            .await
            .map_err(|e| AppError::database("list posts", e))?;
        drop(conn);

        queries::hydrate_posts(&self.pool, post_ids, self.max_concurrency).await
    }

    /// Lists the posts written by `author_id`, hydrated, in id order.
    ///
    /// A post deleted while the list is being hydrated is left out, so the
    /// result can be shorter than the matching id set.
    pub async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<PostView>> {
        let mut conn = self.pool.get().await?;
        let post_ids = queries::post_ids_by_author(&mut conn, author_id)
            .await
            .map_err(|e| AppError::database("list posts by author", e))?;
        drop(conn);

        queries::hydrate_posts(&self.pool, post_ids, self.max_concurrency).await
    }

    /// Lists the posts labeled with the tag called `tag_name`, hydrated, in id order.
    ///
    /// A post deleted while the list is being hydrated is left out, so the
    /// result can be shorter than the matching id set.
    pub async fn list_by_tag_name(&self, tag_name: &str) -> AppResult<Vec<PostView>> {
        let mut conn = self.pool.get().await?;
        let post_ids: Vec<i32> = posts::table
            .inner_join(post_tags::table)
            .inner_join(tags::table.on(tags::id.eq(post_tags::tag_id)))
            .filter(tags::name.eq(tag_name))
            .select(posts::id)
            .order(posts::id.asc())
            .load(&mut conn)
            .await
            .map_err(|e| AppError::database("list posts by tag", e))?;
        drop(conn);

        queries::hydrate_posts(&self.pool, post_ids, self.max_concurrency).await
    }

    /// Finds a post by ID with its author and tags attached.
    ///
    /// # Returns
    /// `Some(PostView)` if found, `None` otherwise
    pub async fn find_by_id(&self, post_id: i32) -> AppResult<Option<PostView>> {
        let mut conn = self.pool.get().await?;

        queries::load_post_view(&mut conn, post_id)
            .await
            .map_err(|e| AppError::database("find post", e))
    }
}
