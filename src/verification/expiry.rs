//! Challenge expiry.
//!
//! Runs when a challenge window closes. The decision to act is taken here,
//! from the store, not when the timer was armed.

use tracing::{debug, info, warn};

use super::{GatewayError, MessagingGateway, PendingChallenge, StoreError, VerificationStore};

/// What the expiry handler did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryOutcome {
    /// The member was no longer pending; nothing was touched.
    AlreadyResolved,
    /// The member was removed and the ban lifted.
    Expelled,
}

/// Failure that prevented the member from being removed.
#[derive(Debug, thiserror::Error)]
pub enum ExpiryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not expel member: {0}")]
    Expel(#[source] GatewayError),
}

/// Expel a member whose challenge went unanswered.
///
/// The pending entry is not removed afterwards; a later click from the same
/// id would simply not find a challenge to answer.
pub async fn on_challenge_expired(
    gateway: &dyn MessagingGateway,
    store: &dyn VerificationStore,
    challenge: &PendingChallenge,
) -> Result<ExpiryOutcome, ExpiryError> {
    let chat_id = challenge.chat_id;
    let member_id = challenge.member_id;

    if !store.is_pending(chat_id, member_id).await? {
        debug!("Member {} in chat {} already resolved", member_id, chat_id);
        return Ok(ExpiryOutcome::AlreadyResolved);
    }

    for message in [challenge.join_message_id, challenge.challenge_message_id] {
        if let Err(e) = gateway.delete_message(chat_id, message).await {
            debug!("Could not delete message {:?} in chat {}: {}", message, chat_id, e);
        }
    }

    gateway
        .expel_member(chat_id, member_id)
        .await
        .map_err(ExpiryError::Expel)?;

    if let Err(e) = gateway.lift_expulsion(chat_id, member_id).await {
        warn!("Failed to unban {} in chat {}: {}", member_id, chat_id, e);
    }

    info!(
        "Removed unverified member {} from chat {} (challenge armed at {})",
        member_id, chat_id, challenge.armed_at
    );

    Ok(ExpiryOutcome::Expelled)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use teloxide::types::{ChatId, MessageId, UserId};

    use super::*;
    use crate::verification::testing::{Call, FakeGateway, MemoryStore};

    fn challenge(chat: i64, member: u64) -> PendingChallenge {
        PendingChallenge {
            chat_id: ChatId(chat),
            member_id: UserId(member),
            challenge_message_id: MessageId(11),
            join_message_id: MessageId(10),
            armed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn expels_then_unbans_pending_member() {
        let gateway = FakeGateway::new();
        let store = MemoryStore::new();
        store.add_pending(ChatId(-2), UserId(2)).await.unwrap();

        let outcome = on_challenge_expired(&gateway, &store, &challenge(-2, 2))
            .await
            .unwrap();

        assert_eq!(outcome, ExpiryOutcome::Expelled);
        assert_eq!(
            gateway.calls(),
            vec![
                Call::Delete { chat: ChatId(-2), message: MessageId(10) },
                Call::Delete { chat: ChatId(-2), message: MessageId(11) },
                Call::Expel { chat: ChatId(-2), member: UserId(2) },
                Call::LiftExpulsion { chat: ChatId(-2), member: UserId(2) },
            ]
        );
        // The entry lingers after expulsion.
        assert_eq!(store.pending_members(ChatId(-2)), vec![UserId(2)]);
    }

    #[tokio::test]
    async fn resolved_member_is_left_alone() {
        let gateway = FakeGateway::new();
        let store = MemoryStore::new();

        let outcome = on_challenge_expired(&gateway, &store, &challenge(-2, 2))
            .await
            .unwrap();

        assert_eq!(outcome, ExpiryOutcome::AlreadyResolved);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn deletion_failures_do_not_stop_expulsion() {
        let gateway = FakeGateway::new();
        gateway.fail_delete(GatewayError::Api("Bad Request: message to delete not found".into()));
        let store = MemoryStore::new();
        store.add_pending(ChatId(-2), UserId(2)).await.unwrap();

        let outcome = on_challenge_expired(&gateway, &store, &challenge(-2, 2))
            .await
            .unwrap();

        assert_eq!(outcome, ExpiryOutcome::Expelled);
        assert!(gateway.calls().contains(&Call::LiftExpulsion {
            chat: ChatId(-2),
            member: UserId(2)
        }));
    }

    #[tokio::test]
    async fn failed_expulsion_skips_unban() {
        let gateway = FakeGateway::new();
        gateway.fail_expel(GatewayError::Transport("timed out".into()));
        let store = MemoryStore::new();
        store.add_pending(ChatId(-2), UserId(2)).await.unwrap();

        let result = on_challenge_expired(&gateway, &store, &challenge(-2, 2)).await;

        assert!(matches!(result, Err(ExpiryError::Expel(_))));
        assert!(!gateway
            .calls()
            .iter()
            .any(|c| matches!(c, Call::LiftExpulsion { .. })));
    }

    #[tokio::test]
    async fn repeated_firing_after_resolution_is_a_no_op() {
        let gateway = FakeGateway::new();
        let store = MemoryStore::new();
        store.add_pending(ChatId(-2), UserId(2)).await.unwrap();
        store.remove_pending(ChatId(-2), UserId(2)).await.unwrap();

        for _ in 0..2 {
            let outcome = on_challenge_expired(&gateway, &store, &challenge(-2, 2))
                .await
                .unwrap();
            assert_eq!(outcome, ExpiryOutcome::AlreadyResolved);
        }
        assert!(gateway.calls().is_empty());
    }
}
