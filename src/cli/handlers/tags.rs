//! Tags command handler

use crate::cli::executor::CommandOutput;
use crate::cli::parser::TagCommand;
use crate::error::AppResult;
use crate::repositories::TagRepository;

pub struct TagCommandHandler<'a> {
    tags: &'a TagRepository,
}

impl<'a> TagCommandHandler<'a> {
    pub fn new(tags: &'a TagRepository) -> Self {
        Self { tags }
    }

    pub async fn execute(&self, action: TagCommand) -> AppResult<CommandOutput> {
        match action {
            TagCommand::List => CommandOutput::json(&self.tags.list_all().await?),
        }
    }
}
