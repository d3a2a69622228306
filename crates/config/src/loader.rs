use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use tally_ledger::RelayMode;

use crate::{env_subst::substitute_env, schema::TallyConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["tally.toml", "tally.yaml", "tally.yml", "tally.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<TallyConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./tally.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/tally/tally.{toml,yaml,yml,json}` (user-global)
///
/// Returns `TallyConfig::default()` if no config file is found; required
/// values can still arrive through environment overrides.
pub fn discover_and_load() -> TallyConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            }
        }
    } else {
        debug!("no config file found, using defaults");
    }
    TallyConfig::default()
}

/// Apply environment variable overrides on top of the loaded config.
///
/// `BOT_TOKEN`, `TELEGRAM_ALLOWED_USERS` (comma-separated ids),
/// `NOTION_TOKEN`, `NOTION_DB_ID`, `NOTION_RELATED_DB_ID`, and
/// `TALLY_MODE` each replace their file counterpart when set.
pub fn apply_env_overrides(config: &mut TallyConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(config: &mut TallyConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(token) = lookup("BOT_TOKEN") {
        config.telegram.token = Secret::new(token);
    }
    if let Some(users) = lookup("TELEGRAM_ALLOWED_USERS") {
        config.telegram.allowed_users = users
            .split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
    }
    if let Some(token) = lookup("NOTION_TOKEN") {
        config.notion.token = Secret::new(token);
    }
    if let Some(id) = lookup("NOTION_DB_ID") {
        config.notion.records_db = id;
    }
    if let Some(id) = lookup("NOTION_RELATED_DB_ID") {
        config.notion.relations_db = id;
    }
    if let Some(mode) = lookup("TALLY_MODE") {
        match mode.trim() {
            "inline" => config.ledger.mode = RelayMode::Inline,
            "two-step" => config.ledger.mode = RelayMode::TwoStep,
            other => warn!(mode = %other, "unrecognized TALLY_MODE, keeping configured mode"),
        }
    }
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/tally/
    if let Some(dirs) = directories::ProjectDirs::from("", "", "tally") {
        let config_dir = dirs.config_dir();
        for name in CONFIG_FILENAMES {
            let p = config_dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<TallyConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
