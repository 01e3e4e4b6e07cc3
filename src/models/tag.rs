use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[diesel(table_name = crate::schema::tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag<'a> {
    pub name: &'a str,
}

/// Join row labeling a post with a tag.
#[derive(Debug, Queryable, Selectable, Insertable, Clone, Copy, PartialEq, Eq)]
#[diesel(table_name = crate::schema::post_tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostTag {
    pub post_id: i32,
    pub tag_id: i32,
}

/// Distinct tag names in first-seen order.
pub fn unique_tag_names<S: AsRef<str>>(names: &[S]) -> Vec<&str> {
    let mut unique: Vec<&str> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique
}
