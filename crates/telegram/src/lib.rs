//! Telegram transport for the tally relay.
//!
//! Long-polls the Bot API with teloxide, reduces each update to a relay
//! message, and sends handler replies back into the originating chat.

pub mod bot;
pub mod handlers;

pub use {bot::start_polling, handlers::TelegramReplies};
