//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Environment;

/// Command-line access to the juicebox blog store
#[derive(Parser, Debug)]
#[command(name = "juicebox")]
#[command(about = "Command-line access to the juicebox blog store")]
#[command(long_about = "
Juicebox reads and writes the users, posts and tags of a PostgreSQL-backed blog.
Every command prints its result as pretty JSON on stdout; logs go to stderr.

EXAMPLES:
    # List every user (passwords are never printed)
    juicebox users list

    # Create a post with two tags
    juicebox posts create --author 1 --title \"First\" --content \"Hello\" --tag rust --tag db

    # Replace the tags of post 3 and deactivate it
    juicebox posts update 3 --active false --tag news

    # Posts labelled with a tag
    juicebox posts list --tag rust

    # Use a specific configuration file and verbose logging
    juicebox --config /etc/juicebox/production.toml --verbose tags list
")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Load exactly this TOML file instead of the layered configuration directory.
    /// The file must exist and be readable.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` layer is loaded.
    /// Available values: development (dev), production (prod), test
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error log output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Top-level entity groups
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read and write users
    Users {
        #[command(subcommand)]
        action: UserCommand,
    },
    /// Read and write posts and their tags
    Posts {
        #[command(subcommand)]
        action: PostCommand,
    },
    /// Read tags
    Tags {
        #[command(subcommand)]
        action: TagCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// List every user without passwords
    List,
    /// Show one user together with their posts
    Show {
        #[arg(value_parser = super::validation::validate_id)]
        id: i32,
    },
    /// Create a user; fails if the username is taken
    Create {
        #[arg(long, value_parser = super::validation::validate_non_empty)]
        username: String,
        #[arg(long, env = "JUICEBOX_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
    },
    /// Change some fields of a user
    Update {
        #[arg(value_parser = super::validation::validate_id)]
        id: i32,
        #[arg(long, value_parser = super::validation::validate_non_empty)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, value_name = "BOOL")]
        active: Option<bool>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PostCommand {
    /// List posts, optionally filtered by author or tag
    List {
        /// Only posts written by this user id
        #[arg(long, value_name = "ID", value_parser = super::validation::validate_id, conflicts_with = "tag")]
        author: Option<i32>,
        /// Only posts labelled with this tag name
        #[arg(long, value_name = "NAME")]
        tag: Option<String>,
    },
    /// Show one post with its author and tags
    Show {
        #[arg(value_parser = super::validation::validate_id)]
        id: i32,
    },
    /// Create a post, creating any tags that do not exist yet
    Create {
        #[arg(long, value_name = "ID", value_parser = super::validation::validate_id)]
        author: i32,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Tag name; repeat for several tags
        #[arg(long = "tag", value_name = "NAME", value_parser = super::validation::validate_non_empty)]
        tags: Vec<String>,
    },
    /// Change some fields of a post and optionally replace its tag set
    Update {
        #[arg(value_parser = super::validation::validate_id)]
        id: i32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_name = "BOOL")]
        active: Option<bool>,
        /// Replace the tag set with these names; repeat for several tags
        #[arg(long = "tag", value_name = "NAME", value_parser = super::validation::validate_non_empty, conflicts_with = "clear_tags")]
        tags: Vec<String>,
        /// Remove every tag from the post
        #[arg(long)]
        clear_tags: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    /// List every tag
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_flag() {
        let err = Cli::try_parse_from(["juicebox", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["juicebox", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["juicebox"]).is_err());
    }

    #[test]
    fn test_users_show() {
        let cli = Cli::try_parse_from(["juicebox", "users", "show", "42"]).unwrap();
        match cli.command {
            Commands::Users {
                action: UserCommand::Show { id },
            } => assert_eq!(id, 42),
            other => panic!("Expected users show, got {:?}", other),
        }
    }

    #[test]
    fn test_users_show_rejects_zero_id() {
        assert!(Cli::try_parse_from(["juicebox", "users", "show", "0"]).is_err());
    }

    #[test]
    fn test_posts_create_repeated_tags() {
        let cli = Cli::try_parse_from([
            "juicebox", "posts", "create", "--author", "1", "--title", "T", "--content", "C",
            "--tag", "rust", "--tag", "db",
        ])
        .unwrap();
        match cli.command {
            Commands::Posts {
                action: PostCommand::Create { author, tags, .. },
            } => {
                assert_eq!(author, 1);
                assert_eq!(tags, vec!["rust", "db"]);
            }
            other => panic!("Expected posts create, got {:?}", other),
        }
    }

    #[test]
    fn test_posts_update_flags() {
        let cli = Cli::try_parse_from([
            "juicebox", "posts", "update", "3", "--active", "false", "--clear-tags",
        ])
        .unwrap();
        match cli.command {
            Commands::Posts {
                action:
                    PostCommand::Update {
                        id,
                        active,
                        tags,
                        clear_tags,
                        title,
                        ..
                    },
            } => {
                assert_eq!(id, 3);
                assert_eq!(active, Some(false));
                assert!(tags.is_empty());
                assert!(clear_tags);
                assert!(title.is_none());
            }
            other => panic!("Expected posts update, got {:?}", other),
        }
    }

    #[test]
    fn test_posts_update_tags_conflict_with_clear() {
        let err = Cli::try_parse_from([
            "juicebox", "posts", "update", "3", "--tag", "a", "--clear-tags",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_posts_list_author_conflicts_with_tag() {
        let err = Cli::try_parse_from(["juicebox", "posts", "list", "--author", "1", "--tag", "x"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_global_env_flag() {
        let cli = Cli::try_parse_from(["juicebox", "--env", "prod", "tags", "list"]).unwrap();
        assert_eq!(cli.env, Some(Environment::Production));
        assert!(matches!(
            cli.command,
            Commands::Tags {
                action: TagCommand::List
            }
        ));
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["juicebox", "--verbose", "--quiet", "tags", "list"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
