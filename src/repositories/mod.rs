//! Repository layer for data access operations.
//!
//! Provides async create, read, and update operations for users, posts, and
//! tags, plus the post/tag labeling kept in `post_tags`.

mod post_repo;
mod queries;
mod tag_repo;
mod user_repo;

pub use post_repo::PostRepository;
pub use tag_repo::TagRepository;
pub use user_repo::UserRepository;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Since `AsyncDbPool` uses `Arc` internally, cloning is cheap.
#[derive(Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub posts: PostRepository,
    pub tags: TagRepository,
}

impl Repositories {
    /// Creates a new Repositories instance with all repositories initialized.
    ///
    /// # Arguments
    /// * `pool` - The async database connection pool
    /// * `max_concurrency` - Cap on concurrent lookups when hydrating lists of posts
    pub fn new(pool: AsyncDbPool, max_concurrency: usize) -> Self {
        Self {
            users: UserRepository::new(pool.clone(), max_concurrency),
            posts: PostRepository::new(pool.clone(), max_concurrency),
            tags: TagRepository::new(pool, max_concurrency),
        }
    }
}
