//! Users command handler

use crate::cli::executor::CommandOutput;
use crate::cli::parser::UserCommand;
use crate::error::AppResult;
use crate::models::{PublicUser, UserPatch};
use crate::repositories::UserRepository;

pub struct UserCommandHandler<'a> {
    users: &'a UserRepository,
}

impl<'a> UserCommandHandler<'a> {
    pub fn new(users: &'a UserRepository) -> Self {
        Self { users }
    }

    pub async fn execute(&self, action: UserCommand) -> AppResult<CommandOutput> {
        match action {
            UserCommand::List => CommandOutput::json(&self.users.list_all().await?),
            UserCommand::Show { id } => match self.users.find_by_id(id).await? {
                Some(user) => CommandOutput::json(&user),
                None => Ok(CommandOutput::missing(format!("user {} not found", id))),
            },
            UserCommand::Create {
                username,
                password,
                name,
                location,
            } => {
                let created = self
                    .users
                    .create(&username, &password, &name, &location)
                    .await?;
                match created {
                    Some(user) => CommandOutput::json(&PublicUser::from(user)),
                    None => Ok(CommandOutput::missing(format!(
                        "username '{}' is already taken",
                        username
                    ))),
                }
            }
            UserCommand::Update {
                id,
                username,
                password,
                name,
                location,
                active,
            } => {
                let patch = UserPatch {
                    username,
                    password,
                    name,
                    location,
                    active,
                };
                if patch.is_empty() {
                    return Ok(CommandOutput::missing("nothing to update"));
                }

                match self.users.update(id, patch).await? {
                    Some(user) => CommandOutput::json(&PublicUser::from(user)),
                    None => Ok(CommandOutput::missing(format!("user {} not found", id))),
                }
            }
        }
    }
}
