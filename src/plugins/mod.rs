//! Command and callback plugins.

pub mod start;
pub mod verify;
pub mod welcome;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::verification::text::UNMUTE_PREFIX;

/// All bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Show what this bot does")]
    Start(String),

    #[command(description = "Show what this bot does")]
    Help,

    #[command(description = "Set this chat's welcome message")]
    Setwelcome(String),
}

/// Build the combined command handler.
pub fn command_handler() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start(args)].endpoint(start::start_command))
        .branch(case![Command::Help].endpoint(start::start_command))
        .branch(case![Command::Setwelcome(args)].endpoint(welcome::setwelcome_command))
}

/// Build the callback query handler.
pub fn callback_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|q: CallbackQuery| {
        q.data
            .as_deref()
            .is_some_and(|d| d.starts_with(UNMUTE_PREFIX))
    })
    .endpoint(verify::verify_callback_handler)
}
