//! Throwaway PostgreSQL databases for repository tests.
//!
//! Each [`TestDb`] creates its own database on the server named by
//! `JUICEBOX_TEST_DATABASE_URL`, lays down the schema, and drops the database
//! again when it goes out of scope. Tests using it are `#[ignore]`d; run them
//! with `cargo test -- --ignored`.

#![allow(dead_code)]

use diesel::{Connection, PgConnection, RunQueryDsl, sql_query};
use diesel_async::{AsyncConnection, AsyncPgConnection, SimpleAsyncConnection};
use juicebox::config::DatabaseConfig;
use juicebox::db::establish_async_connection_pool;
use juicebox::models::User;
use juicebox::repositories::Repositories;

pub const TEST_DATABASE_URL_ENV: &str = "JUICEBOX_TEST_DATABASE_URL";

const SCHEMA_SQL: &str = r#"
CREATE TABLE users (
    id SERIAL PRIMARY KEY,
    username VARCHAR(255) UNIQUE NOT NULL,
    password VARCHAR(255) NOT NULL,
    name VARCHAR(255) NOT NULL,
    location VARCHAR(255) NOT NULL,
    active BOOLEAN NOT NULL DEFAULT true
);
CREATE TABLE posts (
    id SERIAL PRIMARY KEY,
    "authorId" INTEGER NOT NULL REFERENCES users(id),
    title VARCHAR(255) NOT NULL,
    content TEXT NOT NULL,
    active BOOLEAN NOT NULL DEFAULT true
);
CREATE TABLE tags (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) UNIQUE NOT NULL
);
CREATE TABLE post_tags (
    "postId" INTEGER NOT NULL REFERENCES posts(id),
    "tagId" INTEGER NOT NULL REFERENCES tags(id),
    PRIMARY KEY ("postId", "tagId")
);
"#;

/// A database of its own, with repositories over a pool on it.
pub struct TestDb {
    pub repos: Repositories,
    server_url: String,
    name: String,
}

impl TestDb {
    /// # Panics
    ///
    /// When `JUICEBOX_TEST_DATABASE_URL` is unset or the server refuses the
    /// new database.
    pub async fn new(max_concurrency: usize) -> Self {
        let server_url = std::env::var(TEST_DATABASE_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| panic!("{} must be set for database tests", TEST_DATABASE_URL_ENV));
        let name = format!("juicebox_test_{}", uuid::Uuid::new_v4().simple());

        let mut admin = AsyncPgConnection::establish(&server_url)
            .await
            .expect("Failed to connect to test database server");
        admin
            .batch_execute(&format!("CREATE DATABASE {}", name))
            .await
            .unwrap_or_else(|e| panic!("Failed to create test database {}: {}", name, e));

        let url = database_url(&server_url, &name);
        let mut conn = AsyncPgConnection::establish(&url)
            .await
            .expect("Failed to connect to test database");
        conn.batch_execute(SCHEMA_SQL)
            .await
            .expect("Failed to create test schema");

        let config = DatabaseConfig {
            url,
            max_connections: 8,
            min_connections: 1,
            connection_timeout: 10,
            max_concurrency,
        };
        let pool = establish_async_connection_pool(&config)
            .await
            .expect("Failed to build test pool");

        Self {
            repos: Repositories::new(pool, max_concurrency),
            server_url,
            name,
        }
    }
}

impl Drop for TestDb {
    /// Drops the database; a failing test leaves it behind for inspection.
    fn drop(&mut self) {
        if std::thread::panicking() {
            eprintln!("Keeping test database '{}' after panic", self.name);
            return;
        }

        let mut conn = match PgConnection::establish(&self.server_url) {
            Ok(conn) => conn,
            Err(e) => {
                eprintln!("Failed to connect for cleanup of '{}': {}", self.name, e);
                return;
            }
        };
        // The pool is still open at this point
        if let Err(e) =
            sql_query(format!("DROP DATABASE IF EXISTS {} WITH (FORCE)", self.name)).execute(&mut conn)
        {
            eprintln!("Failed to drop test database '{}': {}", self.name, e);
        }
    }
}

/// Swaps the database name in `server_url` for `name`, keeping any query string.
fn database_url(server_url: &str, name: &str) -> String {
    let (base, query) = match server_url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (server_url, None),
    };
    let authority = base.find("://").map_or(0, |i| i + 3);
    let path = base[authority..]
        .find('/')
        .map_or(base.len(), |i| authority + i);
    let mut url = format!("{}/{}", &base[..path], name);
    if let Some(query) = query {
        url.push('?');
        url.push_str(query);
    }
    url
}

#[test]
fn test_database_url_replaces_only_the_database_name() {
    assert_eq!(
        database_url("postgres://u:p@localhost:5432/postgres", "t1"),
        "postgres://u:p@localhost:5432/t1"
    );
    assert_eq!(
        database_url("postgres://localhost/postgres?sslmode=disable", "t1"),
        "postgres://localhost/t1?sslmode=disable"
    );
    assert_eq!(database_url("postgres://localhost:5432", "t1"), "postgres://localhost:5432/t1");
}

/// A name no other row in this test is using.
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

pub async fn create_user(repos: &Repositories, prefix: &str) -> User {
    repos
        .users
        .create(&unique(prefix), "pw", "Name", "Loc")
        .await
        .expect("create user failed")
        .expect("fresh username was rejected")
}
