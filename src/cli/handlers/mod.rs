//! Command handlers for CLI operations
//!
//! One handler per entity group, each turning a parsed subcommand into
//! repository calls and a [`CommandOutput`](super::executor::CommandOutput).

pub mod posts;
pub mod tags;
pub mod users;

pub use posts::PostCommandHandler;
pub use tags::TagCommandHandler;
pub use users::UserCommandHandler;
