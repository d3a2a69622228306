//! Domain core of the tally relay.
//!
//! Authorization, command parsing, the relation cache, and the
//! record-creation flows live here, behind two seams: [`LedgerStore`]
//! for the remote database and [`ReplySink`] for outbound replies.
//! Transports hand the core plain [`InboundMessage`] values and map
//! returned [`LedgerError`]s to user-visible replies.

pub mod auth;
pub mod commands;
pub mod error;
pub mod handler;
pub mod message;
pub mod relations;
pub mod store;

pub use {
    error::{LedgerError, RemoteAction},
    handler::{RelayContext, RelayMode, ReplySink, handle_message},
    message::InboundMessage,
    relations::{RelationOption, RelationSnapshot},
    store::{LedgerStore, NewRecord, NewRelation},
};
