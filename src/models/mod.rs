mod patch;
mod post;
mod tag;
mod user;

pub use post::{CreatePost, NewPost, Post, PostChanges, PostPatch, PostView};
pub use tag::{NewTag, PostTag, Tag, unique_tag_names};
pub use user::{Author, NewUser, PublicUser, User, UserPatch, UserWithPosts};
