//! Posts command handler

use crate::cli::executor::CommandOutput;
use crate::cli::parser::PostCommand;
use crate::error::AppResult;
use crate::models::{CreatePost, PostPatch};
use crate::repositories::PostRepository;

pub struct PostCommandHandler<'a> {
    posts: &'a PostRepository,
}

impl<'a> PostCommandHandler<'a> {
    pub fn new(posts: &'a PostRepository) -> Self {
        Self { posts }
    }

    pub async fn execute(&self, action: PostCommand) -> AppResult<CommandOutput> {
        match action {
            PostCommand::List { author, tag } => {
                let posts = match (author, tag) {
                    (Some(author_id), _) => self.posts.list_by_author(author_id).await?,
                    (None, Some(tag_name)) => self.posts.list_by_tag_name(&tag_name).await?,
                    (None, None) => self.posts.list_all().await?,
                };
                CommandOutput::json(&posts)
            }
            PostCommand::Show { id } => match self.posts.find_by_id(id).await? {
                Some(post) => CommandOutput::json(&post),
                None => Ok(CommandOutput::missing(format!("post {} not found", id))),
            },
            PostCommand::Create {
                author,
                title,
                content,
                tags,
            } => {
                let post = self
                    .posts
                    .create(CreatePost {
                        author_id: author,
                        title,
                        content,
                        tags,
                    })
                    .await?;
                CommandOutput::json(&post)
            }
            PostCommand::Update {
                id,
                title,
                content,
                active,
                tags,
                clear_tags,
            } => {
                let patch = PostPatch {
                    title,
                    content,
                    active,
                    tags: replacement_tags(tags, clear_tags),
                };
                if patch.is_empty() {
                    return Ok(CommandOutput::missing("nothing to update"));
                }

                match self.posts.update(id, patch).await? {
                    Some(post) => CommandOutput::json(&post),
                    None => Ok(CommandOutput::missing(format!("post {} not found", id))),
                }
            }
        }
    }
}

/// `--clear-tags` empties the set, `--tag` replaces it, neither leaves it alone.
fn replacement_tags(tags: Vec<String>, clear_tags: bool) -> Option<Vec<String>> {
    if clear_tags {
        Some(Vec::new())
    } else if tags.is_empty() {
        None
    } else {
        Some(tags)
    }
}
