//! Inbound update handling: reduce Telegram messages to relay input and
//! map relay errors back to chat replies.

use {
    anyhow::{Context, Result},
    async_trait::async_trait,
    teloxide::{
        prelude::*,
        types::{ChatId, MediaKind, MessageKind, User},
    },
    tracing::{debug, error},
};

use tally_ledger::{InboundMessage, RelayContext, ReplySink, handle_message};

/// Handle a single inbound Telegram message (called from the polling
/// loop).
///
/// Non-text updates and messages without a sender are ignored. Relay
/// errors become replies in the originating chat; only a failure to
/// deliver that reply propagates to the caller.
pub async fn handle_update(msg: Message, bot: &Bot, ctx: &RelayContext) -> Result<()> {
    let Some(text) = extract_text(&msg) else {
        debug!(chat_id = msg.chat.id.0, "ignoring non-text message");
        return Ok(());
    };
    let Some(from) = msg.from.as_ref() else {
        debug!(chat_id = msg.chat.id.0, "ignoring message without a sender");
        return Ok(());
    };

    let inbound = InboundMessage {
        sender_id: from.id.0.to_string(),
        sender_name: sender_name(from),
        text,
    };
    let replies = TelegramReplies {
        bot: bot.clone(),
        chat_id: msg.chat.id,
    };

    if let Err(err) = handle_message(ctx, &inbound, &replies).await {
        if err.is_user_error() {
            debug!(sender = %inbound.sender_id, error = %err, "message rejected");
        } else {
            error!(sender = %inbound.sender_id, error = ?err, "failed to process message");
        }
        replies.send(&err.user_message()).await?;
    }
    Ok(())
}

/// Replies bound to the chat the message arrived from.
pub struct TelegramReplies {
    bot: Bot,
    chat_id: ChatId,
}

#[async_trait]
impl ReplySink for TelegramReplies {
    async fn send(&self, text: &str) -> Result<()> {
        self.bot
            .send_message(self.chat_id, text)
            .await
            .context("failed to send telegram reply")?;
        Ok(())
    }
}

/// Display name recorded on created records. The username is preferred;
/// accounts without one fall back to their profile name.
fn sender_name(user: &User) -> String {
    if let Some(username) = &user.username {
        return username.clone();
    }
    let last = user.last_name.as_deref().unwrap_or("");
    format!("{} {}", user.first_name, last).trim().to_string()
}

fn extract_text(msg: &Message) -> Option<String> {
    match &msg.kind {
        MessageKind::Common(common) => match &common.media_kind {
            MediaKind::Text(t) => Some(t.text.clone()),
            _ => None,
        },
        _ => None,
    }
}
