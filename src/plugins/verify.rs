//! Verification button callback plugin.

use teloxide::prelude::*;
use teloxide::types::MaybeInaccessibleMessage;
use tracing::{debug, error};

use crate::bot::AppState;
use crate::verification::{VerifyClick, on_verify_click};

/// Describe a callback query as a [`VerifyClick`].
///
/// The join message id comes from the message the challenge replied to; it
/// is unknown once the challenge message is no longer accessible.
pub fn click_from_query(q: &CallbackQuery) -> VerifyClick {
    let join_message_id = match &q.message {
        Some(MaybeInaccessibleMessage::Regular(m)) => m.reply_to_message().map(|r| r.id),
        _ => None,
    };

    VerifyClick {
        query_id: q.id.clone(),
        clicker_id: q.from.id,
        payload: q.data.clone().unwrap_or_default(),
        chat_id: q.message.as_ref().map(|m| m.chat().id),
        challenge_message_id: q.message.as_ref().map(|m| m.id()),
        join_message_id,
    }
}

/// Handle a press of the "I am not a bot" button.
pub async fn verify_callback_handler(q: CallbackQuery, state: AppState) -> anyhow::Result<()> {
    let click = click_from_query(&q);

    match on_verify_click(&state.gatekeeper, &click).await {
        Ok(outcome) => debug!("Click {} by {}: {:?}", click.query_id, click.clicker_id, outcome),
        Err(e) => error!("Failed to handle click {} by {}: {}", click.query_id, click.clicker_id, e),
    }

    Ok(())
}
