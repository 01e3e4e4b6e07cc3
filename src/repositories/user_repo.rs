//! User repository for async database operations.
//!
//! Provides create, read, and sparse update for the users table using diesel_async.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, PublicUser, User, UserPatch, UserWithPosts};
use crate::repositories::queries;
use crate::schema::users;

/// User repository holding an async connection pool.
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap
/// (just reference count increment). No need for `Arc<UserRepository>`.
#[derive(Clone)]
pub struct UserRepository {
    pool: AsyncDbPool,
    max_concurrency: usize,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool, max_concurrency: usize) -> Self {
        Self {
            pool,
            max_concurrency,
        }
    }

    /// Creates a new user in the database.
    ///
    /// # Returns
    /// The created user, or `None` when the username is already taken
    /// (nothing is inserted in that case)
    #[tracing::instrument(skip(self, password))]
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        name: &str,
        location: &str,
    ) -> AppResult<Option<User>> {
        let new_user = NewUser {
            username: username.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            location: location.to_string(),
        };
        let mut conn = self.pool.get().await?;

        let created = diesel::insert_into(users::table)
            .values(&new_user)
            .on_conflict(users::username)
            .do_nothing()
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| AppError::database("create user", e))?;

        match &created {
            Some(user) => tracing::info!(user_id = user.id, "User created"),
            None => tracing::debug!("Username already taken, nothing inserted"),
        }
        Ok(created)
    }

    /// Applies a sparse update to a user.
    ///
    /// # Returns
    /// The updated user; `None` if the patch is empty (no query is issued)
    /// or no user has `user_id`
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, user_id: i32, patch: UserPatch) -> AppResult<Option<User>> {
        if patch.is_empty() {
            tracing::debug!("Empty user patch, skipping update");
            return Ok(None);
        }

        let mut conn = self.pool.get().await?;

        diesel::update(users::table.find(user_id))
            .set(&patch)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| AppError::database("update user", e))
    }

    /// Lists every user without passwords.
    pub async fn list_all(&self) -> AppResult<Vec<PublicUser>> {
        let mut conn = self.pool.get().await?;

        users::table
            .select(PublicUser::as_select())
            .order(users::id.asc())
            .load(&mut conn)
            .await
            .map_err(|e| AppError::database("list users", e))
    }

    /// Finds a user by ID, with every post they authored hydrated.
    ///
    /// # Returns
    /// `Some(UserWithPosts)` if found, `None` otherwise
    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, user_id: i32) -> AppResult<Option<UserWithPosts>> {
        let mut conn = self.pool.get().await?;

        let Some(user) = users::table
            .find(user_id)
            .select(PublicUser::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| AppError::database("find user", e))?
        else {
            return Ok(None);
        };

        let post_ids = queries::post_ids_by_author(&mut conn, user_id)
            .await
            .map_err(|e| AppError::database("list user posts", e))?;
        drop(conn);

        let posts = queries::hydrate_posts(&self.pool, post_ids, self.max_concurrency).await?;
        Ok(Some(UserWithPosts { user, posts }))
    }

    /// Finds a user by their username, password included.
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let mut conn = self.pool.get().await?;

        users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| AppError::database("find user by username", e))
    }
}
