//! Config schema for the relay.

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

use tally_ledger::RelayMode;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    pub telegram: TelegramConfig,
    pub notion: NotionConfig,
    pub ledger: LedgerConfig,
}

/// Telegram transport section.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Telegram user ids allowed to use the bot. An empty list denies
    /// everyone.
    pub allowed_users: Vec<String>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("allowed_users", &self.allowed_users)
            .finish()
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            allowed_users: Vec::new(),
        }
    }
}

/// Notion backend section.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Integration token.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Database holding record pages.
    pub records_db: String,

    /// Database holding relation pages.
    pub relations_db: String,

    /// Records-database property that links a record to its relation.
    /// When unset, the mode's conventional name is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_property: Option<String>,
}

impl std::fmt::Debug for NotionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionConfig")
            .field("token", &"[REDACTED]")
            .field("records_db", &self.records_db)
            .field("relations_db", &self.relations_db)
            .field("relation_property", &self.relation_property)
            .finish()
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            records_db: String::new(),
            relations_db: String::new(),
            relation_property: None,
        }
    }
}

/// Relay behavior section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Which submission design the relay runs.
    pub mode: RelayMode,
}

impl TallyConfig {
    /// Check that every value required to start the relay is present.
    ///
    /// All missing keys are reported together so a single restart fixes
    /// the lot. The allow-list is not required here: an empty list is a
    /// valid configuration that denies every sender.
    pub fn ensure_complete(&self) -> Result<(), MissingConfig> {
        let mut keys = Vec::new();
        if self.telegram.token.expose_secret().is_empty() {
            keys.push("telegram.token");
        }
        if self.notion.token.expose_secret().is_empty() {
            keys.push("notion.token");
        }
        if self.notion.records_db.is_empty() {
            keys.push("notion.records_db");
        }
        if self.notion.relations_db.is_empty() {
            keys.push("notion.relations_db");
        }
        if keys.is_empty() {
            Ok(())
        } else {
            Err(MissingConfig { keys })
        }
    }

    /// The records-database relation property, falling back to the
    /// mode's conventional name.
    #[must_use]
    pub fn relation_property(&self) -> &str {
        match &self.notion.relation_property {
            Some(name) => name,
            None => match self.ledger.mode {
                RelayMode::Inline => "Accountant",
                RelayMode::TwoStep => "When",
            },
        }
    }
}

/// Required configuration values that are absent.
#[derive(Debug, thiserror::Error)]
#[error("missing required configuration: {}", .keys.join(", "))]
pub struct MissingConfig {
    pub keys: Vec<&'static str>,
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = TallyConfig::default();
        assert!(cfg.telegram.allowed_users.is_empty());
        assert_eq!(cfg.ledger.mode, RelayMode::Inline);
        assert_eq!(cfg.relation_property(), "Accountant");
    }

    #[test]
    fn deserialize_from_toml() {
        let toml = r#"
            [telegram]
            token = "123:ABC"
            allowed_users = ["947871123", "911093644"]

            [notion]
            token = "secret_x"
            records_db = "db-records"
            relations_db = "db-relations"

            [ledger]
            mode = "two-step"
        "#;
        let cfg: TallyConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.telegram.token.expose_secret(), "123:ABC");
        assert_eq!(cfg.telegram.allowed_users, vec!["947871123", "911093644"]);
        assert_eq!(cfg.notion.records_db, "db-records");
        assert_eq!(cfg.ledger.mode, RelayMode::TwoStep);
        assert_eq!(cfg.relation_property(), "When");
        assert!(cfg.ensure_complete().is_ok());
    }

    #[test]
    fn serialize_roundtrip() {
        let cfg = TallyConfig {
            telegram: TelegramConfig {
                token: Secret::new("tok".into()),
                allowed_users: vec!["1".into()],
            },
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: TallyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg2.telegram.token.expose_secret(), "tok");
        assert_eq!(cfg2.telegram.allowed_users, vec!["1"]);
    }

    #[test]
    fn missing_values_are_reported_together() {
        let err = TallyConfig::default().ensure_complete().unwrap_err();
        assert_eq!(
            err.keys,
            [
                "telegram.token",
                "notion.token",
                "notion.records_db",
                "notion.relations_db",
            ]
        );
        assert!(err.to_string().contains("telegram.token"));
    }

    #[test]
    fn empty_allowlist_is_still_complete() {
        let cfg = TallyConfig {
            telegram: TelegramConfig {
                token: Secret::new("tok".into()),
                allowed_users: Vec::new(),
            },
            notion: NotionConfig {
                token: Secret::new("tok".into()),
                records_db: "db-1".into(),
                relations_db: "db-2".into(),
                relation_property: None,
            },
            ..Default::default()
        };
        assert!(cfg.ensure_complete().is_ok());
    }

    #[test]
    fn explicit_relation_property_wins() {
        let mut cfg = TallyConfig::default();
        cfg.notion.relation_property = Some("Linked".into());
        assert_eq!(cfg.relation_property(), "Linked");
    }

    #[test]
    fn debug_redacts_tokens() {
        let cfg = TallyConfig {
            telegram: TelegramConfig {
                token: Secret::new("tg-secret".into()),
                allowed_users: Vec::new(),
            },
            notion: NotionConfig {
                token: Secret::new("notion-secret".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let debug_output = format!("{cfg:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("tg-secret"));
        assert!(!debug_output.contains("notion-secret"));
    }
}
