//! Connection-level queries shared by the repositories.
//!
//! Every helper takes a bare connection so the same code runs on a pooled
//! connection or inside an open transaction.

use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use futures::stream::{self, StreamExt, TryStreamExt};

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Author, NewTag, Post, PostTag, PostView, Tag, unique_tag_names};
use crate::schema::{post_tags, posts, tags, users};

/// Loads one post with its tags and author attached.
///
/// Returns `None` when no post has `post_id`.
pub(crate) async fn load_post_view(
    conn: &mut AsyncPgConnection,
    post_id: i32,
) -> QueryResult<Option<PostView>> {
    let Some(post) = posts::table
        .find(post_id)
        .select(Post::as_select())
        .first(conn)
        .await
        .optional()?
    else {
        return Ok(None);
    };

    let tag_rows = tags::table
        .inner_join(post_tags::table)
        .filter(post_tags::post_id.eq(post_id))
        .select(Tag::as_select())
        .order(tags::id.asc())
        .load(conn)
        .await?;

    let author = users::table
        .find(post.author_id)
        .select(Author::as_select())
        .first(conn)
        .await?;

    Ok(Some(PostView::new(post, author, tag_rows)))
}

/// Inserts every missing tag name and returns the rows for all of `names`.
pub(crate) async fn insert_tags(
    conn: &mut AsyncPgConnection,
    names: &[String],
) -> QueryResult<Vec<Tag>> {
    let names = unique_tag_names(names);
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<NewTag<'_>> = names.iter().map(|&name| NewTag { name }).collect();
    diesel::insert_into(tags::table)
        .values(&rows)
        .on_conflict(tags::name)
        .do_nothing()
        .execute(conn)
        .await?;

    tags::table
        .filter(tags::name.eq_any(names))
        .select(Tag::as_select())
        .load(conn)
        .await
}

/// Labels a post with a tag; a no-op when the pair already exists.
pub(crate) async fn link_tag(
    conn: &mut AsyncPgConnection,
    post_id: i32,
    tag_id: i32,
) -> QueryResult<usize> {
    diesel::insert_into(post_tags::table)
        .values(&PostTag { post_id, tag_id })
        .on_conflict((post_tags::post_id, post_tags::tag_id))
        .do_nothing()
        .execute(conn)
        .await
}

/// Removes every label on the post whose tag is not in `keep`.
pub(crate) async fn unlink_tags_except(
    conn: &mut AsyncPgConnection,
    post_id: i32,
    keep: &[i32],
) -> QueryResult<usize> {
    diesel::delete(
        post_tags::table
            .filter(post_tags::post_id.eq(post_id))
            .filter(post_tags::tag_id.ne_all(keep.to_vec())),
    )
    .execute(conn)
    .await
}

pub(crate) async fn post_exists(conn: &mut AsyncPgConnection, post_id: i32) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(posts::table.find(post_id)))
        .get_result(conn)
        .await
}

pub(crate) async fn post_ids_by_author(
    conn: &mut AsyncPgConnection,
    author_id: i32,
) -> QueryResult<Vec<i32>> {
    posts::table
        .filter(posts::author_id.eq(author_id))
        .select(posts::id)
        .order(posts::id.asc())
        .load(conn)
        .await
}

/// Hydrates `post_ids` with at most `max_concurrency` lookups in flight.
///
/// Each lookup checks out its own connection. Results keep the order of
/// `post_ids`; ids that no longer exist are skipped.
pub(crate) async fn hydrate_posts(
    pool: &AsyncDbPool,
    post_ids: Vec<i32>,
    max_concurrency: usize,
) -> AppResult<Vec<PostView>> {
    tracing::debug!(count = post_ids.len(), max_concurrency, "Hydrating posts");

    let views: Vec<Option<PostView>> = stream::iter(post_ids)
        .map(|post_id| async move {
            let mut conn = pool.get().await?;
            let view = load_post_view(&mut conn, post_id).await?;
            Ok::<_, AppError>(view)
        })
        .buffered(max_concurrency.max(1))
        .try_collect()
        .await?;

    Ok(views.into_iter().flatten().collect())
}
