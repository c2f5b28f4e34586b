//! Join verification.
//!
//! Lifecycle of a pending member: the join handler restricts the member,
//! records them as pending and posts a challenge; the member resolves it by
//! clicking the control, or the timer expels them when the window closes.
//!
//! Handlers receive every capability through [`Gatekeeper`], so the whole
//! state machine runs against fakes in tests.

pub mod action;
pub mod departure;
pub mod expiry;
pub mod gateway;
pub mod join;
pub mod store;
pub mod text;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, MessageId, UserId};

pub use action::{VerifyClick, on_verify_click};
pub use departure::on_member_left;
pub use gateway::{
    GatewayError, MemberRole, Membership, MessagingGateway, OutgoingMessage, TextFormat,
};
pub use join::{Inviter, JoinEvent, on_member_joined};
pub use store::{StoreError, VerificationStore};
pub use text::{ControlBuilder, TextProvider, UnmuteControls, describe_window, parse_unmute_payload};
pub use timer::{Timer, TokioTimer};

/// Default length of the challenge window.
pub const DEFAULT_CHALLENGE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Default length of the post-verification send window.
pub const DEFAULT_UNMUTE_GRACE: Duration = Duration::from_secs(15 * 60);

/// Timing and identity settings for the handlers.
#[derive(Debug, Clone, Copy)]
pub struct GateSettings {
    /// The bot's own user id, used to detect self-joins.
    pub bot_id: UserId,
    pub challenge_timeout: Duration,
    pub unmute_grace: Duration,
}

impl GateSettings {
    pub fn new(bot_id: UserId) -> Self {
        Self {
            bot_id,
            challenge_timeout: DEFAULT_CHALLENGE_TIMEOUT,
            unmute_grace: DEFAULT_UNMUTE_GRACE,
        }
    }
}

/// Capabilities shared by all verification handlers.
#[derive(Clone)]
pub struct Gatekeeper {
    pub gateway: Arc<dyn MessagingGateway>,
    pub store: Arc<dyn VerificationStore>,
    pub text: Arc<dyn TextProvider>,
    pub controls: Arc<dyn ControlBuilder>,
    pub timer: Arc<dyn Timer>,
    pub settings: GateSettings,
}

/// An outstanding challenge, owned by its expiry task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChallenge {
    pub chat_id: ChatId,
    pub member_id: UserId,
    pub challenge_message_id: MessageId,
    pub join_message_id: MessageId,
    pub armed_at: DateTime<Utc>,
}
