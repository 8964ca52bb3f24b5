//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::{CreateCommandHandler, DemoCommandHandler, ListCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::{AppError, AppResult};

/// Execute a CLI command with the given settings
///
/// This function dispatches to the appropriate command handler based on
/// the parsed CLI arguments. Running without a subcommand lists products.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    if let Err(msg) = cli.validate() {
        return Err(AppError::Validation {
            field: "cli_arguments".to_string(),
            reason: msg,
        });
    }

    match &cli.command {
        None => ListCommandHandler::new(settings).execute(None).await,
        Some(Commands::List { limit }) => ListCommandHandler::new(settings).execute(*limit).await,
        Some(Commands::Create { title, price }) => {
            CreateCommandHandler::new(settings)
                .execute(title.clone(), *price)
                .await
        }
        Some(Commands::Demo { mode }) => DemoCommandHandler::new(settings).execute(*mode).await,
    }
}
