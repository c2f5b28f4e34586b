//! Verification control clicks.

use chrono::Utc;
use teloxide::types::{ChatId, MessageId, UserId};
use tracing::{debug, info, warn};

use super::{Gatekeeper, StoreError, parse_unmute_payload};

/// A click on a verification control.
#[derive(Debug, Clone)]
pub struct VerifyClick {
    pub query_id: String,
    pub clicker_id: UserId,
    pub payload: String,
    /// Chat of the challenge message, when the message is still accessible.
    pub chat_id: Option<ChatId>,
    pub challenge_message_id: Option<MessageId>,
    /// Join message the challenge replied to, when known.
    pub join_message_id: Option<MessageId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The clicker was the challenged member and has been let in.
    Verified,
    /// Someone else clicked; they were told so.
    WrongMember,
    /// The payload or message context was unusable.
    Ignored,
}

/// Handle a click on an `unmute.<id>` control.
///
/// Only the challenged member can verify themselves. Message cleanup is
/// best-effort: a partially cleaned up chat is acceptable.
pub async fn on_verify_click(gk: &Gatekeeper, click: &VerifyClick) -> Result<ClickOutcome, StoreError> {
    let Some(pending_id) = parse_unmute_payload(&click.payload) else {
        debug!("Ignoring malformed verification payload {:?}", click.payload);
        return Ok(ClickOutcome::Ignored);
    };

    if click.clicker_id != pending_id {
        let notice = gk.text.render("user_must_click", &[]);
        if let Err(e) = gk.gateway.acknowledge_click(&click.query_id, Some(notice)).await {
            debug!("Failed to answer click {}: {}", click.query_id, e);
        }
        return Ok(ClickOutcome::WrongMember);
    }

    let Some(chat_id) = click.chat_id else {
        acknowledge_silently(gk, click).await;
        return Ok(ClickOutcome::Ignored);
    };

    let until = Utc::now()
        + chrono::Duration::from_std(gk.settings.unmute_grace).unwrap_or(chrono::Duration::minutes(15));
    if let Err(e) = gk
        .gateway
        .restrict_member(chat_id, pending_id, true, Some(until))
        .await
    {
        warn!("Failed to unmute {} in chat {}: {}", pending_id, chat_id, e);
    }

    for message in [click.challenge_message_id, click.join_message_id].into_iter().flatten() {
        if let Err(e) = gk.gateway.delete_message(chat_id, message).await {
            debug!("Could not delete message {:?} in chat {}: {}", message, chat_id, e);
        }
    }

    gk.store.remove_pending(chat_id, pending_id).await?;
    acknowledge_silently(gk, click).await;

    info!("Member {} verified in chat {}", pending_id, chat_id);
    Ok(ClickOutcome::Verified)
}

async fn acknowledge_silently(gk: &Gatekeeper, click: &VerifyClick) {
    if let Err(e) = gk.gateway.acknowledge_click(&click.query_id, None).await {
        debug!("Failed to answer click {}: {}", click.query_id, e);
    }
}
