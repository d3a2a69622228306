//! Notion storage backend for the tally relay.
//!
//! Implements `LedgerStore` against the Notion REST API: relation pages
//! are queried and created in one database, record pages in another.

pub mod store;

pub use store::NotionStore;
