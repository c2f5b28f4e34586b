//! Chat repository: the durable verification store.
//!
//! Each operation is a single-document update, so MongoDB applies it
//! atomically. Welcome templates are cached (5min TTL) and invalidated on
//! write; pending membership is always read from the database.

use async_trait::async_trait;
use mongodb::Collection;
use mongodb::bson::{Document, doc};
use mongodb::options::UpdateOptions;
use teloxide::types::{ChatId, UserId};
use tracing::debug;

use crate::cache::{CacheConfig, TypedCache};
use crate::database::Database;
use crate::database::models::ChatRecord;
use crate::database::mongo::CHATS_COLLECTION;
use crate::verification::{StoreError, VerificationStore};

/// MongoDB-backed [`VerificationStore`].
pub struct ChatRepository {
    collection: Collection<ChatRecord>,
    welcome_cache: TypedCache<i64, Option<String>>,
}

impl ChatRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(CHATS_COLLECTION),
            welcome_cache: TypedCache::new("welcome_messages", CacheConfig::chat_settings()),
        }
    }

    fn upsert() -> UpdateOptions {
        UpdateOptions::builder().upsert(true).build()
    }
}

/// Members are stored as i64, which is what BSON supports natively.
fn member_key(member: UserId) -> Result<i64, StoreError> {
    i64::try_from(member.0)
        .map_err(|_| StoreError::Malformed(format!("member id {} out of range", member.0)))
}

fn chat_filter(chat: ChatId) -> Document {
    doc! { "chat_id": chat.0 }
}

/// Replaces the welcome text. `pending_members` is only written when the
/// record is created, so in-flight challenges survive.
fn set_welcome_update(text: &str) -> Document {
    doc! {
        "$set": { "welcome_message": text },
        "$setOnInsert": { "pending_members": [] },
    }
}

fn add_pending_update(member: i64) -> Document {
    doc! { "$addToSet": { "pending_members": member } }
}

fn remove_pending_update(member: i64) -> Document {
    doc! { "$pull": { "pending_members": member } }
}

#[async_trait]
impl VerificationStore for ChatRepository {
    async fn upsert_welcome_message(&self, chat: ChatId, text: &str) -> Result<(), StoreError> {
        self.collection
            .update_one(chat_filter(chat), set_welcome_update(text))
            .with_options(Self::upsert())
            .await?;

        self.welcome_cache.invalidate(&chat.0);
        debug!("Saved welcome message for chat {}", chat);
        Ok(())
    }

    async fn add_pending(&self, chat: ChatId, member: UserId) -> Result<(), StoreError> {
        let key = member_key(member)?;
        self.collection
            .update_one(chat_filter(chat), add_pending_update(key))
            .with_options(Self::upsert())
            .await?;

        debug!("Member {} pending in chat {}", member, chat);
        Ok(())
    }

    async fn remove_pending(&self, chat: ChatId, member: UserId) -> Result<(), StoreError> {
        let key = member_key(member)?;
        let result = self
            .collection
            .update_one(chat_filter(chat), remove_pending_update(key))
            .await?;

        debug!(
            "Member {} cleared in chat {} (modified: {})",
            member, chat, result.modified_count
        );
        Ok(())
    }

    async fn is_pending(&self, chat: ChatId, member: UserId) -> Result<bool, StoreError> {
        let member = member_key(member)?;
        let filter = doc! { "chat_id": chat.0, "pending_members": member };
        let record = self.collection.find_one(filter).await?;

        Ok(record.is_some_and(|r| r.is_pending(member)))
    }

    async fn welcome_message(&self, chat: ChatId) -> Result<Option<String>, StoreError> {
        if let Some(cached) = self.welcome_cache.get(&chat.0) {
            return Ok(cached);
        }

        let welcome = self
            .collection
            .find_one(chat_filter(chat))
            .await?
            .and_then(|r| r.welcome_message);

        debug!(
            "{} cache miss for chat {}: configured={}",
            self.welcome_cache.name(),
            chat,
            welcome.is_some()
        );
        self.welcome_cache.insert(chat.0, welcome.clone());

        Ok(welcome)
    }
}
