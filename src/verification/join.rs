//! New member handling.
//!
//! Restricts the newcomer, records them as pending, posts the challenge in
//! reply to the join message and arms the expiry timer.

use chrono::Utc;
use futures::FutureExt;
use teloxide::types::{ChatId, MessageId, UserId};
use tracing::{debug, error, info, warn};

use super::expiry::on_challenge_expired;
use super::{
    Gatekeeper, GatewayError, OutgoingMessage, PendingChallenge, StoreError, describe_window,
};
use crate::utils::{fill_placeholders, html_escape};

/// A member appearing in a "new chat members" service message.
#[derive(Debug, Clone)]
pub struct JoinEvent {
    pub chat_id: ChatId,
    pub chat_title: Option<String>,
    pub member_id: UserId,
    pub first_name: String,
    /// The service message announcing the join.
    pub join_message_id: MessageId,
    /// Whoever added the member, if it was not a self-join.
    pub inviter: Option<Inviter>,
}

#[derive(Debug, Clone)]
pub struct Inviter {
    pub id: UserId,
    pub first_name: String,
}

/// Result of handling a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The bot was added with moderation rights.
    BotAccepted,
    /// The bot was added without moderation rights and left.
    BotLeft,
    /// A challenge was posted and the timer armed.
    Challenged { challenge_message_id: MessageId },
    /// The member created the chat; a notice was posted.
    SkippedCreator,
    /// The member is an administrator.
    SkippedAdmin,
    /// Restriction failed for another reason; the bot reported it and left.
    RestrictionFailed,
}

#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("gateway failure: {0}")]
    Gateway(#[from] GatewayError),
}

/// Handle one joining member.
pub async fn on_member_joined(gk: &Gatekeeper, event: &JoinEvent) -> Result<JoinOutcome, JoinError> {
    if event.member_id == gk.settings.bot_id {
        return on_bot_joined(gk, event).await;
    }

    let chat_id = event.chat_id;
    let member_id = event.member_id;

    if let Err(err) = gk.gateway.restrict_member(chat_id, member_id, false, None).await {
        return on_restriction_failed(gk, event, err).await;
    }
    debug!("Restricted new member {} in chat {}", member_id, chat_id);

    let text = challenge_text(gk, event).await?;

    gk.store.add_pending(chat_id, member_id).await?;

    let message = OutgoingMessage::html(text)
        .reply_to(event.join_message_id)
        .with_control(gk.controls.verification_control(member_id));

    let challenge_message_id = match gk.gateway.send_message(chat_id, message).await {
        Ok(id) => id,
        Err(err) => {
            // Without a challenge nobody can resolve the entry.
            if let Err(e) = gk.store.remove_pending(chat_id, member_id).await {
                error!("Failed to roll back pending {} in chat {}: {}", member_id, chat_id, e);
            }
            return Err(err.into());
        }
    };

    let challenge = PendingChallenge {
        chat_id,
        member_id,
        challenge_message_id,
        join_message_id: event.join_message_id,
        armed_at: Utc::now(),
    };
    arm_expiry(gk, challenge);

    info!("Challenged new member {} in chat {}", member_id, chat_id);

    Ok(JoinOutcome::Challenged {
        challenge_message_id,
    })
}

/// The bot itself was added. Stay only with moderation rights.
async fn on_bot_joined(gk: &Gatekeeper, event: &JoinEvent) -> Result<JoinOutcome, JoinError> {
    let chat_id = event.chat_id;
    let membership = gk.gateway.membership(chat_id, gk.settings.bot_id).await?;

    if membership.role.is_privileged() {
        info!("Added to chat {} with moderation rights", chat_id);
        return Ok(JoinOutcome::BotAccepted);
    }

    let (inviter_name, inviter_id) = match &event.inviter {
        Some(inviter) => (html_escape(&inviter.first_name), inviter.id.0.to_string()),
        None => (String::new(), String::new()),
    };
    let notice = gk.text.render(
        "not_admin",
        &[("first_name", &inviter_name), ("user_id", &inviter_id)],
    );

    if let Err(e) = gk.gateway.send_message(chat_id, OutgoingMessage::html(notice)).await {
        warn!("Failed to send rights notice to chat {}: {}", chat_id, e);
    }
    gk.gateway.leave_chat(chat_id).await?;

    info!("Left chat {}: added without moderation rights", chat_id);
    Ok(JoinOutcome::BotLeft)
}

async fn on_restriction_failed(
    gk: &Gatekeeper,
    event: &JoinEvent,
    err: GatewayError,
) -> Result<JoinOutcome, JoinError> {
    let chat_id = event.chat_id;

    match err {
        GatewayError::TargetIsCreator => {
            let notice = gk.text.render("creator", &[]);
            gk.gateway
                .send_message(chat_id, OutgoingMessage::html(notice))
                .await?;
            Ok(JoinOutcome::SkippedCreator)
        }
        GatewayError::TargetIsAdmin => {
            debug!("Member {} in chat {} is an administrator", event.member_id, chat_id);
            Ok(JoinOutcome::SkippedAdmin)
        }
        other => {
            error!(
                "Cannot restrict {} in chat {}, leaving: {}",
                event.member_id, chat_id, other
            );
            if let Err(e) = gk
                .gateway
                .send_message(chat_id, OutgoingMessage::plain(other.to_string()))
                .await
            {
                warn!("Failed to report restriction failure to chat {}: {}", chat_id, e);
            }
            gk.gateway.leave_chat(chat_id).await?;
            Ok(JoinOutcome::RestrictionFailed)
        }
    }
}

/// The chat's custom welcome, or the default template.
async fn challenge_text(gk: &Gatekeeper, event: &JoinEvent) -> Result<String, StoreError> {
    let first_name = html_escape(&event.first_name);
    let title = html_escape(event.chat_title.as_deref().unwrap_or_default());
    let window = describe_window(gk.settings.challenge_timeout);
    let params = [
        ("first_name", first_name.as_str()),
        ("title", title.as_str()),
        ("window", window.as_str()),
    ];

    let custom = gk
        .store
        .welcome_message(event.chat_id)
        .await?
        .filter(|t| !t.trim().is_empty());

    Ok(match custom {
        Some(template) => fill_placeholders(&template, &params),
        None => gk.text.render("welcome", &params),
    })
}

fn arm_expiry(gk: &Gatekeeper, challenge: PendingChallenge) {
    let gateway = gk.gateway.clone();
    let store = gk.store.clone();

    gk.timer.arm(
        gk.settings.challenge_timeout,
        async move {
            if let Err(e) = on_challenge_expired(gateway.as_ref(), store.as_ref(), &challenge).await {
                error!(
                    "Expiry for member {} in chat {} failed: {}",
                    challenge.member_id, challenge.chat_id, e
                );
            }
        }
        .boxed(),
    );
}
