//! In-process fakes for exercising the handlers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use teloxide::types::{ChatId, MessageId, UserId};

use super::{
    GateSettings, Gatekeeper, GatewayError, MemberRole, Membership, MessagingGateway,
    OutgoingMessage, StoreError, TextProvider, Timer, UnmuteControls, VerificationStore,
};

pub const BOT_ID: UserId = UserId(1);

/// A gateway call as observed by [`FakeGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send { chat: ChatId, message: OutgoingMessage },
    Delete { chat: ChatId, message: MessageId },
    Restrict { chat: ChatId, member: UserId, can_send: bool, until: Option<DateTime<Utc>> },
    Expel { chat: ChatId, member: UserId },
    LiftExpulsion { chat: ChatId, member: UserId },
    Membership { chat: ChatId, member: UserId },
    Acknowledge { query_id: String, text: Option<String> },
    Leave { chat: ChatId },
}

/// Gateway that records calls and fails on demand.
pub struct FakeGateway {
    calls: Mutex<Vec<Call>>,
    next_message_id: AtomicI32,
    roles: Mutex<HashMap<(i64, u64), MemberRole>>,
    restrict_error: Mutex<Option<GatewayError>>,
    send_error: Mutex<Option<GatewayError>>,
    delete_error: Mutex<Option<GatewayError>>,
    expel_error: Mutex<Option<GatewayError>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_message_id: AtomicI32::new(1000),
            roles: Mutex::new(HashMap::new()),
            restrict_error: Mutex::new(None),
            send_error: Mutex::new(None),
            delete_error: Mutex::new(None),
            expel_error: Mutex::new(None),
        }
    }

    pub fn set_role(&self, chat: ChatId, member: UserId, role: MemberRole) {
        self.roles.lock().insert((chat.0, member.0), role);
    }

    pub fn fail_restrict(&self, err: GatewayError) {
        *self.restrict_error.lock() = Some(err);
    }

    pub fn fail_send(&self, err: GatewayError) {
        *self.send_error.lock() = Some(err);
    }

    pub fn fail_delete(&self, err: GatewayError) {
        *self.delete_error.lock() = Some(err);
    }

    pub fn fail_expel(&self, err: GatewayError) {
        *self.expel_error.lock() = Some(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn restrictions(&self) -> Vec<(UserId, bool, Option<DateTime<Utc>>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Restrict { member, can_send, until, .. } => Some((member, can_send, until)),
                _ => None,
            })
            .collect()
    }

    pub fn left(&self) -> bool {
        self.calls().iter().any(|c| matches!(c, Call::Leave { .. }))
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl MessagingGateway for FakeGateway {
    async fn send_message(
        &self,
        chat: ChatId,
        message: OutgoingMessage,
    ) -> Result<MessageId, GatewayError> {
        self.record(Call::Send { chat, message });
        if let Some(err) = self.send_error.lock().clone() {
            return Err(err);
        }
        Ok(MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), GatewayError> {
        self.record(Call::Delete { chat, message });
        match self.delete_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn restrict_member(
        &self,
        chat: ChatId,
        member: UserId,
        can_send: bool,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), GatewayError> {
        self.record(Call::Restrict { chat, member, can_send, until });
        match self.restrict_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn expel_member(&self, chat: ChatId, member: UserId) -> Result<(), GatewayError> {
        self.record(Call::Expel { chat, member });
        match self.expel_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn lift_expulsion(&self, chat: ChatId, member: UserId) -> Result<(), GatewayError> {
        self.record(Call::LiftExpulsion { chat, member });
        Ok(())
    }

    async fn membership(&self, chat: ChatId, member: UserId) -> Result<Membership, GatewayError> {
        self.record(Call::Membership { chat, member });
        let role = self
            .roles
            .lock()
            .get(&(chat.0, member.0))
            .copied()
            .unwrap_or(MemberRole::Member);
        Ok(Membership { role })
    }

    async fn acknowledge_click(
        &self,
        query_id: &str,
        text: Option<String>,
    ) -> Result<(), GatewayError> {
        self.record(Call::Acknowledge {
            query_id: query_id.to_string(),
            text,
        });
        Ok(())
    }

    async fn leave_chat(&self, chat: ChatId) -> Result<(), GatewayError> {
        self.record(Call::Leave { chat });
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
struct ChatEntry {
    welcome: Option<String>,
    pending: HashSet<u64>,
}

/// Store kept in memory, with an optional write failure switch.
#[derive(Default)]
pub struct MemoryStore {
    chats: DashMap<i64, ChatEntry>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn has_record(&self, chat: ChatId) -> bool {
        self.chats.contains_key(&chat.0)
    }

    pub fn pending_members(&self, chat: ChatId) -> Vec<UserId> {
        let mut members: Vec<UserId> = self
            .chats
            .get(&chat.0)
            .map(|e| e.pending.iter().copied().map(UserId).collect())
            .unwrap_or_default();
        members.sort_by_key(|m| m.0);
        members
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Malformed("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationStore for MemoryStore {
    async fn upsert_welcome_message(&self, chat: ChatId, text: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.chats.entry(chat.0).or_default().welcome = Some(text.to_string());
        Ok(())
    }

    async fn add_pending(&self, chat: ChatId, member: UserId) -> Result<(), StoreError> {
        self.check_writable()?;
        self.chats.entry(chat.0).or_default().pending.insert(member.0);
        Ok(())
    }

    async fn remove_pending(&self, chat: ChatId, member: UserId) -> Result<(), StoreError> {
        self.check_writable()?;
        if let Some(mut entry) = self.chats.get_mut(&chat.0) {
            entry.pending.remove(&member.0);
        }
        Ok(())
    }

    async fn is_pending(&self, chat: ChatId, member: UserId) -> Result<bool, StoreError> {
        Ok(self
            .chats
            .get(&chat.0)
            .is_some_and(|e| e.pending.contains(&member.0)))
    }

    async fn welcome_message(&self, chat: ChatId) -> Result<Option<String>, StoreError> {
        Ok(self.chats.get(&chat.0).and_then(|e| e.welcome.clone()))
    }
}

/// Timer that holds tasks until the test fires them.
#[derive(Default)]
pub struct ManualTimer {
    armed: Mutex<Vec<(Duration, BoxFuture<'static, ()>)>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.armed.lock().iter().map(|(d, _)| *d).collect()
    }

    /// Run every armed task to completion.
    pub async fn fire_all(&self) {
        let tasks: Vec<_> = self.armed.lock().drain(..).collect();
        for (_, task) in tasks {
            task.await;
        }
    }
}

impl Timer for ManualTimer {
    fn arm(&self, delay: Duration, task: BoxFuture<'static, ()>) {
        self.armed.lock().push((delay, task));
    }
}

/// Renders `key` followed by `|name=value` for each parameter.
pub struct EchoText;

impl TextProvider for EchoText {
    fn render(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut out = key.to_string();
        for (name, value) in params {
            out.push_str(&format!("|{name}={value}"));
        }
        out
    }
}

pub struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub store: Arc<MemoryStore>,
    pub timer: Arc<ManualTimer>,
    pub gatekeeper: Gatekeeper,
}

impl Harness {
    pub fn new() -> Self {
        let gateway = Arc::new(FakeGateway::new());
        let store = Arc::new(MemoryStore::new());
        let timer = Arc::new(ManualTimer::new());
        let text: Arc<dyn TextProvider> = Arc::new(EchoText);

        let gatekeeper = Gatekeeper {
            gateway: gateway.clone(),
            store: store.clone(),
            text: text.clone(),
            controls: Arc::new(UnmuteControls::new(text)),
            timer: timer.clone(),
            settings: GateSettings::new(BOT_ID),
        };

        Self {
            gateway,
            store,
            timer,
            gatekeeper,
        }
    }
}
