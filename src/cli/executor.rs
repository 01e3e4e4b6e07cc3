//! Command executor for dispatching CLI commands
//!
//! Routes a parsed command to its handler and renders the result.

use std::error::Error as _;

use serde::Serialize;
use serde_json::Value;

use super::handlers::{PostCommandHandler, TagCommandHandler, UserCommandHandler};
use super::parser::Commands;
use crate::error::{AppError, AppResult};
use crate::repositories::Repositories;

/// What a command produced
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    /// A result to print on stdout
    Json(Value),
    /// The command matched nothing (unknown id, taken username, empty patch)
    Missing(String),
}

impl CommandOutput {
    pub fn json<T: Serialize>(value: &T) -> AppResult<Self> {
        serde_json::to_value(value)
            .map(CommandOutput::Json)
            .map_err(|e| AppError::Internal { source: e.into() })
    }

    pub fn missing(message: impl Into<String>) -> Self {
        CommandOutput::Missing(message.into())
    }

    /// Pretty JSON for stdout; `None` for [`CommandOutput::Missing`].
    pub fn render(&self) -> AppResult<Option<String>> {
        match self {
            CommandOutput::Json(value) => serde_json::to_string_pretty(value)
                .map(Some)
                .map_err(|e| AppError::Internal { source: e.into() }),
            CommandOutput::Missing(_) => Ok(None),
        }
    }
}

/// Execute a CLI command against the repositories
pub async fn execute_command(command: Commands, repos: &Repositories) -> AppResult<CommandOutput> {
    match command {
        Commands::Users { action } => UserCommandHandler::new(&repos.users).execute(action).await,
        Commands::Posts { action } => PostCommandHandler::new(&repos.posts).execute(action).await,
        Commands::Tags { action } => TagCommandHandler::new(&repos.tags).execute(action).await,
    }
}

/// One-line description of a failure, naming the violated constraint when known
pub fn describe_error(error: &AppError) -> String {
    if let Some(violation) = error.constraint_violation() {
        let value = violation
            .value
            .map(|v| format!(" = '{}'", v))
            .unwrap_or_default();
        return format!(
            "{:?} constraint violated on {}.{}{}",
            violation.kind, violation.entity, violation.field, value
        );
    }

    match error.source() {
        Some(source) => format!("{}: {}", error, source),
        None => error.to_string(),
    }
}
