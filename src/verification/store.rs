//! Verification store contract.
//!
//! The store is the only authority on whether a member is still pending.
//! Timers and click handlers consult it; they never keep their own copy.

use async_trait::async_trait;
use teloxide::types::{ChatId, UserId};
use thiserror::Error;

/// Storage failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("stored record is malformed: {0}")]
    Malformed(String),
}

/// Durable, chat-scoped verification state.
///
/// Every operation touches a single chat record and is atomic for it.
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Set the chat's welcome template, creating the record if needed.
    /// An existing pending set is left untouched.
    async fn upsert_welcome_message(&self, chat: ChatId, text: &str) -> Result<(), StoreError>;

    /// Mark a member as pending. Idempotent; creates the record if needed.
    async fn add_pending(&self, chat: ChatId, member: UserId) -> Result<(), StoreError>;

    /// Clear a member's pending mark. Absent entries are not an error.
    async fn remove_pending(&self, chat: ChatId, member: UserId) -> Result<(), StoreError>;

    async fn is_pending(&self, chat: ChatId, member: UserId) -> Result<bool, StoreError>;

    async fn welcome_message(&self, chat: ChatId) -> Result<Option<String>, StoreError>;
}
