//! Telegram implementation of the messaging gateway.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{
    ChatPermissions, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode,
    ReplyParameters,
};

use super::dispatcher::ThrottledBot;
use crate::verification::{
    GatewayError, MemberRole, Membership, MessagingGateway, OutgoingMessage, TextFormat,
};

/// [`MessagingGateway`] over the throttled teloxide client.
#[derive(Clone)]
pub struct TelegramGateway {
    bot: ThrottledBot,
}

impl TelegramGateway {
    pub fn new(bot: ThrottledBot) -> Self {
        Self { bot }
    }
}

fn classify(err: RequestError) -> GatewayError {
    match err {
        RequestError::Api(api) => GatewayError::from_description(&api.to_string()),
        other => GatewayError::Transport(other.to_string()),
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send_message(
        &self,
        chat: ChatId,
        message: OutgoingMessage,
    ) -> Result<MessageId, GatewayError> {
        let mut req = self.bot.send_message(chat, message.text);

        if message.format == TextFormat::Html {
            req = req.parse_mode(ParseMode::Html);
        }

        if let Some(reply_to) = message.reply_to {
            req = req.reply_parameters(ReplyParameters::new(reply_to));
        }

        if let Some(control) = message.control {
            req = req.reply_markup(InlineKeyboardMarkup::new(vec![vec![
                InlineKeyboardButton::callback(control.label, control.payload),
            ]]));
        }

        let sent = req.await.map_err(classify)?;
        Ok(sent.id)
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<(), GatewayError> {
        self.bot
            .delete_message(chat, message)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn restrict_member(
        &self,
        chat: ChatId,
        member: UserId,
        can_send: bool,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), GatewayError> {
        let permissions = if can_send {
            ChatPermissions::SEND_MESSAGES
        } else {
            ChatPermissions::empty() // No rights = Muted
        };

        let req = self.bot.restrict_chat_member(chat, member, permissions);
        let req = match until {
            Some(dt) => req.until_date(dt),
            None => req,
        };

        req.await.map_err(classify)?;
        Ok(())
    }

    async fn expel_member(&self, chat: ChatId, member: UserId) -> Result<(), GatewayError> {
        self.bot
            .ban_chat_member(chat, member)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn lift_expulsion(&self, chat: ChatId, member: UserId) -> Result<(), GatewayError> {
        self.bot
            .unban_chat_member(chat, member)
            .only_if_banned(true)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn membership(&self, chat: ChatId, member: UserId) -> Result<Membership, GatewayError> {
        let member = self
            .bot
            .get_chat_member(chat, member)
            .await
            .map_err(classify)?;

        let kind = &member.kind;
        let role = if kind.is_owner() {
            MemberRole::Owner
        } else if kind.is_administrator() {
            MemberRole::Administrator
        } else if kind.is_restricted() {
            MemberRole::Restricted
        } else if kind.is_left() {
            MemberRole::Left
        } else if kind.is_banned() {
            MemberRole::Banned
        } else {
            MemberRole::Member
        };

        Ok(Membership { role })
    }

    async fn acknowledge_click(
        &self,
        query_id: &str,
        text: Option<String>,
    ) -> Result<(), GatewayError> {
        let req = self.bot.answer_callback_query(query_id.to_string());
        let req = match text {
            Some(text) => req.text(text),
            None => req,
        };

        req.await.map_err(classify)?;
        Ok(())
    }

    async fn leave_chat(&self, chat: ChatId) -> Result<(), GatewayError> {
        self.bot.leave_chat(chat).await.map_err(classify)?;
        Ok(())
    }
}
