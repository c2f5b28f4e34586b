//! Per-chat verification record.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One document per managed chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Telegram chat ID (unique index)
    pub chat_id: i64,

    /// Custom challenge template (HTML). `None` means the default text.
    #[serde(default)]
    pub welcome_message: Option<String>,

    /// Members with an outstanding challenge. Maintained with `$addToSet`
    /// and `$pull`, so it never holds duplicates.
    #[serde(default)]
    pub pending_members: Vec<i64>,
}

impl ChatRecord {
    pub fn is_pending(&self, member: i64) -> bool {
        self.pending_members.contains(&member)
    }
}
