//! /setwelcome command plugin.

use teloxide::prelude::*;
use teloxide::types::Chat;
use tracing::info;

use crate::bot::AppState;
use crate::permissions::Permissions;
use crate::utils::command_args_html;
use crate::verification::{Gatekeeper, OutgoingMessage, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetWelcomeOutcome {
    /// The chat's welcome text was replaced.
    Updated,
    /// No text followed the command; usage was shown.
    Usage,
    /// The sender may not change the welcome text here.
    Denied,
}

/// Store `html` as the welcome text of `chat` on behalf of `sender`.
///
/// In groups only administrators may change the text. Private chats have a
/// single member, so anyone talking to the bot configures their own chat.
pub async fn apply_setwelcome(
    gk: &Gatekeeper,
    permissions: &Permissions,
    chat: &Chat,
    sender: Option<UserId>,
    html: &str,
) -> Result<SetWelcomeOutcome, StoreError> {
    if !chat.is_private() {
        let Some(sender) = sender else {
            return Ok(SetWelcomeOutcome::Denied);
        };

        if !permissions.is_admin(chat.id, sender).await.unwrap_or(false) {
            // The member may have been promoted since the cached lookup.
            permissions.invalidate(chat.id, sender);
            return Ok(SetWelcomeOutcome::Denied);
        }
    }

    if html.trim().is_empty() {
        return Ok(SetWelcomeOutcome::Usage);
    }

    gk.store.upsert_welcome_message(chat.id, html).await?;
    info!("Welcome message set in chat {}", chat.id);
    Ok(SetWelcomeOutcome::Updated)
}

/// Handle /setwelcome.
pub async fn setwelcome_command(msg: Message, state: AppState) -> anyhow::Result<()> {
    let html = command_args_html(msg.text().unwrap_or(""), msg.entities().unwrap_or(&[]));
    let sender = msg.from.as_ref().map(|u| u.id);

    let gk = &state.gatekeeper;
    let key = match apply_setwelcome(gk, &state.permissions, &msg.chat, sender, &html).await? {
        SetWelcomeOutcome::Updated => "welcome_updated",
        SetWelcomeOutcome::Usage => "setwelcome_usage",
        SetWelcomeOutcome::Denied => "admin_only",
    };

    let reply = OutgoingMessage::html(gk.text.render(key, &[])).reply_to(msg.id);
    gk.gateway.send_message(msg.chat.id, reply).await?;

    Ok(())
}
