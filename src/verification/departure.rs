//! Member departures.

use teloxide::types::{ChatId, MessageId};
use tracing::debug;

use super::MessagingGateway;

/// Delete the "member left" service message.
///
/// The pending set is not consulted: a member who leaves mid-challenge keeps
/// their entry until the expiry fires.
pub async fn on_member_left(gateway: &dyn MessagingGateway, chat: ChatId, message: MessageId) {
    if let Err(e) = gateway.delete_message(chat, message).await {
        debug!("Could not delete leave message in chat {}: {}", chat, e);
    }
}
