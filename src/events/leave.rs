//! Member departure event handler.

use teloxide::prelude::*;

use crate::bot::AppState;
use crate::verification::on_member_left;

/// Handle a "left chat member" service message.
pub async fn handler(msg: Message, state: AppState) -> anyhow::Result<()> {
    // Nothing to clean up in a chat the bot itself just left.
    if msg
        .left_chat_member()
        .is_some_and(|u| u.id == state.gatekeeper.settings.bot_id)
    {
        return Ok(());
    }

    on_member_left(state.gatekeeper.gateway.as_ref(), msg.chat.id, msg.id).await;
    Ok(())
}
