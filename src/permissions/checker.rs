//! Admin checker with caching.

use std::sync::Arc;

use teloxide::types::{ChatId, UserId};
use tracing::debug;

use crate::cache::{CacheConfig, TypedCache};
use crate::verification::{GatewayError, MessagingGateway};

/// Cache key for admin lookups: (chat_id, user_id).
type AdminCacheKey = (i64, u64);

/// Answers "is this user an admin of this chat", caching the gateway's answer.
#[derive(Clone)]
pub struct Permissions {
    gateway: Arc<dyn MessagingGateway>,
    cache: TypedCache<AdminCacheKey, bool>,
}

impl Permissions {
    pub fn new(gateway: Arc<dyn MessagingGateway>) -> Self {
        Self {
            gateway,
            cache: TypedCache::new("admin_permissions", CacheConfig::admin_lookups()),
        }
    }

    /// Check if a user is the owner or an administrator of a chat.
    pub async fn is_admin(&self, chat_id: ChatId, user_id: UserId) -> Result<bool, GatewayError> {
        let cache_key = (chat_id.0, user_id.0);

        if let Some(cached) = self.cache.get(&cache_key) {
            debug!("Admin cache hit for user {} in chat {}", user_id, chat_id);
            return Ok(cached);
        }

        debug!("Admin cache miss for user {} in chat {}", user_id, chat_id);

        let is_admin = self
            .gateway
            .membership(chat_id, user_id)
            .await?
            .role
            .is_privileged();

        self.cache.insert(cache_key, is_admin);
        Ok(is_admin)
    }

    /// Forget a cached answer, e.g. after the bot sees a role change.
    pub fn invalidate(&self, chat_id: ChatId, user_id: UserId) {
        self.cache.invalidate(&(chat_id.0, user_id.0));
        debug!("Invalidated admin cache for user {} in chat {}", user_id, chat_id);
    }
}
