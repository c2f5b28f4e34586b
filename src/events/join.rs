//! New member event handler.

use teloxide::prelude::*;
use tracing::{debug, error};

use crate::bot::AppState;
use crate::verification::{Inviter, JoinEvent, on_member_joined};

/// Build one [`JoinEvent`] per member listed in a join service message.
pub fn join_events(msg: &Message) -> Vec<JoinEvent> {
    let inviter = msg.from.as_ref().map(|u| Inviter {
        id: u.id,
        first_name: u.first_name.clone(),
    });

    msg.new_chat_members()
        .unwrap_or(&[])
        .iter()
        .map(|member| JoinEvent {
            chat_id: msg.chat.id,
            chat_title: msg.chat.title().map(str::to_string),
            member_id: member.id,
            first_name: member.first_name.clone(),
            join_message_id: msg.id,
            inviter: inviter.clone(),
        })
        .collect()
}

/// Handle a "new chat members" service message.
pub async fn handler(msg: Message, state: AppState) -> anyhow::Result<()> {
    for event in join_events(&msg) {
        match on_member_joined(&state.gatekeeper, &event).await {
            Ok(outcome) => debug!(
                "Join of {} in chat {}: {:?}",
                event.member_id, event.chat_id, outcome
            ),
            Err(e) => error!(
                "Failed to handle join of {} in chat {}: {}",
                event.member_id, event.chat_id, e
            ),
        }
    }

    Ok(())
}
