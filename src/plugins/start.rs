//! /start and /help command plugin.

use teloxide::prelude::*;

use crate::bot::AppState;
use crate::verification::{Gatekeeper, GatewayError, OutgoingMessage, describe_window};

/// Send the introduction text. Only answers in private chats.
pub async fn send_intro(gk: &Gatekeeper, chat: &teloxide::types::Chat) -> Result<bool, GatewayError> {
    if !chat.is_private() {
        return Ok(false);
    }

    let window = describe_window(gk.settings.challenge_timeout);
    let text = gk.text.render("start", &[("window", window.as_str())]);
    gk.gateway
        .send_message(chat.id, OutgoingMessage::html(text))
        .await?;
    Ok(true)
}

/// Handle /start and /help.
pub async fn start_command(msg: Message, state: AppState) -> anyhow::Result<()> {
    send_intro(&state.gatekeeper, &msg.chat).await?;
    Ok(())
}
