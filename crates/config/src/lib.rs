//! Configuration loading for the tally relay.
//!
//! Config files: `tally.toml`, `tally.yaml`, or `tally.json`,
//! searched in `./` then `~/.config/tally/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values, plus a fixed
//! set of environment overrides applied after the file is parsed.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{apply_env_overrides, discover_and_load, load_config},
    schema::{LedgerConfig, MissingConfig, NotionConfig, TallyConfig, TelegramConfig},
};
