//! Event handler system.
//!
//! Turns Telegram service messages into verification events. Each handler
//! logs its own failures so one bad event never affects another.

pub mod join;
pub mod leave;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

/// Build the service-message handler (joins and departures).
pub fn message_event_handler() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(dptree::filter(|msg: Message| msg.new_chat_members().is_some()).endpoint(join::handler))
        .branch(dptree::filter(|msg: Message| msg.left_chat_member().is_some()).endpoint(leave::handler))
}
