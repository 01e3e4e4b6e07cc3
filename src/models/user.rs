use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppResult;
use crate::models::PostView;
use crate::models::patch::parse_fields;

/// User model for reading from database, password included.
/// Never serialized; use `PublicUser` or `Author` for outward shapes.
#[derive(Debug, Queryable, Selectable, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub name: String,
    pub location: String,
    pub active: bool,
}

/// NewUser model for inserting new records
#[derive(Debug, Insertable, Deserialize, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub location: String,
}

/// Sparse update for a user. `None` fields are left unchanged.
#[derive(Debug, AsChangeset, Deserialize, Clone, Default, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub active: Option<bool>,
}

impl UserPatch {
    /// Field names a user patch may touch.
    pub const FIELDS: &'static [&'static str] =
        &["username", "password", "name", "location", "active"];

    /// Builds a patch from a loose field map, rejecting keys outside [`Self::FIELDS`].
    pub fn from_fields(fields: Map<String, Value>) -> AppResult<Self> {
        parse_fields("user", Self::FIELDS, fields)
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.name.is_none()
            && self.location.is_none()
            && self.active.is_none()
    }
}

/// User fields safe to hand to any caller.
#[derive(Debug, Queryable, Selectable, Serialize, Deserialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub location: String,
    pub active: bool,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            location: user.location,
            active: user.active,
        }
    }
}

/// Author summary embedded in every hydrated post.
#[derive(Debug, Queryable, Selectable, Serialize, Deserialize, Clone, PartialEq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Author {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub location: String,
}

/// A user together with every post they authored.
#[derive(Debug, Serialize, Clone)]
pub struct UserWithPosts {
    #[serde(flatten)]
    pub user: PublicUser,
    pub posts: Vec<PostView>,
}
