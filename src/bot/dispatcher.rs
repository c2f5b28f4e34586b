//! Message dispatcher setup.
//!
//! Builds the dispatcher with the command, service-message and callback
//! handlers.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::Chat;

use crate::events;
use crate::permissions::Permissions;
use crate::plugins;
use crate::verification::Gatekeeper;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Capabilities used by the verification handlers.
    pub gatekeeper: Gatekeeper,

    /// Admin checker for configuration commands.
    pub permissions: Permissions,

    /// Group chats the bot serves; empty means all.
    pub allowed_chats: Arc<[i64]>,
}

impl AppState {
    pub fn new(gatekeeper: Gatekeeper, allowed_chats: Vec<i64>) -> Self {
        let permissions = Permissions::new(gatekeeper.gateway.clone());

        Self {
            gatekeeper,
            permissions,
            allowed_chats: allowed_chats.into(),
        }
    }

    /// Whether updates from this chat should be handled.
    /// Private chats are always served.
    pub fn accepts_chat(&self, chat: &Chat) -> bool {
        chat.is_private() || self.allowed_chats.is_empty() || self.allowed_chats.contains(&chat.id.0)
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    state: AppState,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    let message_handler = Update::filter_message()
        .chain(dptree::filter(|msg: Message, state: AppState| {
            state.accepts_chat(&msg.chat)
        }))
        .branch(plugins::command_handler())
        .branch(events::message_event_handler());

    let callback_handler = Update::filter_callback_query()
        .chain(dptree::filter(|q: CallbackQuery, state: AppState| {
            q.message
                .as_ref()
                .is_none_or(|m| state.accepts_chat(m.chat()))
        }))
        .branch(plugins::callback_handler());

    dptree::entry()
        .branch(message_handler)
        .branch(callback_handler)
}
