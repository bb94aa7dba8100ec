//! Command dispatch: bridges CLI args -> form sessions -> output formatting.
//!
//! Handlers that talk to the controller connect lazily, so offline paths
//! (`schema`, `validate`, `--dry-run` creates) never need a profile.

pub mod apps;
pub mod auth;
pub mod config_cmd;
pub mod nodes;
pub mod policies;
pub mod schema;
pub mod util;
pub mod validate;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Schema(args) => schema::handle(args, global),
        Command::Validate(args) => validate::handle(&args, global),
        Command::Apps(args) => apps::handle(args, global).await,
        Command::Policies(args) => policies::handle(args, global).await,
        Command::Nodes(args) => nodes::handle(args, global).await,
        Command::Login(args) => auth::login(args, global).await,
        Command::Logout => auth::logout(global),
        Command::Config(args) => config_cmd::handle(args, global),
        // Completions are generated in main, where the clap command is built
        Command::Completions(_) => Ok(()),
    }
}
