//! Messaging gateway capability.
//!
//! The verification core never talks to Telegram directly. Everything it
//! needs from the transport goes through [`MessagingGateway`], which the bot
//! layer implements over the throttled teloxide client and tests replace
//! with a recording fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, MessageId, UserId};
use thiserror::Error;

/// Failure of a gateway call, classified by what the handlers branch on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The target member created the chat and cannot be restricted.
    #[error("target is the chat creator")]
    TargetIsCreator,

    /// The target member is an administrator and cannot be restricted.
    #[error("target is an administrator of the chat")]
    TargetIsAdmin,

    /// Any other API-level rejection, with Telegram's description.
    #[error("{0}")]
    Api(String),

    /// Network, timeout or decoding failure.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl GatewayError {
    /// Classify a Telegram error description.
    ///
    /// Telegram only reports these conditions as free text, so matching is
    /// done on the lowercase description.
    pub fn from_description(description: &str) -> Self {
        let lower = description.to_lowercase();
        if lower.contains("chat creator") || lower.contains("chat owner") {
            Self::TargetIsCreator
        } else if lower.contains("is an administrator") {
            Self::TargetIsAdmin
        } else {
            Self::Api(description.to_string())
        }
    }
}

/// Role of a member inside a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberRole {
    /// Whether this role carries moderation rights.
    pub fn is_privileged(self) -> bool {
        matches!(self, Self::Owner | Self::Administrator)
    }
}

/// Membership status as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Membership {
    pub role: MemberRole,
}

/// Text format of an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Html,
    Plain,
}

/// Inline button attached to a message, carrying a callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: String,
    pub payload: String,
}

/// A message to be sent through the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub format: TextFormat,
    pub reply_to: Option<MessageId>,
    pub control: Option<Control>,
}

impl OutgoingMessage {
    /// An HTML message with no reply target and no control.
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Html,
            reply_to: None,
            control: None,
        }
    }

    /// A plain-text message, used for raw API error descriptions.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::Plain,
            ..Self::html(text)
        }
    }

    #[must_use]
    pub fn reply_to(mut self, message: MessageId) -> Self {
        self.reply_to = Some(message);
        self
    }

    #[must_use]
    pub fn with_control(mut self, control: Control) -> Self {
        self.control = Some(control);
        self
    }
}

/// Operations the verification core needs from the messaging transport.
///
/// Every call is a suspension point; implementations must not assume the
/// caller holds any lock.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a message and return its identifier.
    async fn send_message(
        &self,
        chat: ChatId,
        message: OutgoingMessage,
    ) -> Result<MessageId, GatewayError>;

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), GatewayError>;

    /// Set whether `member` may send messages. `until` bounds the change;
    /// `None` makes it indefinite.
    async fn restrict_member(
        &self,
        chat: ChatId,
        member: UserId,
        can_send: bool,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), GatewayError>;

    /// Remove a member from the chat (a ban).
    async fn expel_member(&self, chat: ChatId, member: UserId) -> Result<(), GatewayError>;

    /// Lift a ban so the member may rejoin.
    async fn lift_expulsion(&self, chat: ChatId, member: UserId) -> Result<(), GatewayError>;

    async fn membership(&self, chat: ChatId, member: UserId) -> Result<Membership, GatewayError>;

    /// Answer a control click, optionally with a transient notice.
    async fn acknowledge_click(
        &self,
        query_id: &str,
        text: Option<String>,
    ) -> Result<(), GatewayError>;

    async fn leave_chat(&self, chat: ChatId) -> Result<(), GatewayError>;
}
