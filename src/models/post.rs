use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppResult;
use crate::models::patch::parse_fields;
use crate::models::{Author, Tag};

/// Post row as stored, including the raw author reference.
#[derive(Debug, Queryable, Selectable, Identifiable, Clone, PartialEq)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub content: String,
    pub active: bool,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::posts)]
pub struct NewPost {
    pub author_id: i32,
    pub title: String,
    pub content: String,
}

/// Input for creating a post together with its tag names.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub author_id: i32,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreatePost {
    pub(crate) fn split(self) -> (NewPost, Vec<String>) {
        (
            NewPost {
                author_id: self.author_id,
                title: self.title,
                content: self.content,
            },
            self.tags,
        )
    }
}

/// Scalar post columns a patch may change.
#[derive(Debug, AsChangeset, Clone, Default, PartialEq)]
#[diesel(table_name = crate::schema::posts)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub active: Option<bool>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.active.is_none()
    }
}

/// Sparse update for a post.
///
/// `tags: None` leaves the tag set alone; `Some(list)` replaces it with
/// exactly `list` (an empty list removes every tag).
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub active: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl PostPatch {
    /// Field names a post patch may touch. The author cannot be reassigned.
    pub const FIELDS: &'static [&'static str] = &["title", "content", "active", "tags"];

    /// Builds a patch from a loose field map, rejecting keys outside [`Self::FIELDS`].
    pub fn from_fields(fields: Map<String, Value>) -> AppResult<Self> {
        parse_fields("post", Self::FIELDS, fields)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.title.is_none() && self.content.is_none() && self.active.is_none()
    }

    pub(crate) fn split(self) -> (PostChanges, Option<Vec<String>>) {
        (
            PostChanges {
                title: self.title,
                content: self.content,
                active: self.active,
            },
            self.tags,
        )
    }
}

/// A post with its author and tags attached. Carries no raw author id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PostView {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub active: bool,
    pub author: Author,
    pub tags: Vec<Tag>,
}

impl PostView {
    pub fn new(post: Post, author: Author, tags: Vec<Tag>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            active: post.active,
            author,
            tags,
        }
    }

    /// Tag names on this post, sorted.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.iter().map(|tag| tag.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}
