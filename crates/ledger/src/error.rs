//! Typed errors for the relay core.
//!
//! Handlers return [`LedgerError`] and transports map each variant to a
//! user-visible reply with [`LedgerError::user_message`]. Remote failures
//! keep their source chained for logs while the reply stays generic.

use std::error::Error as StdError;

/// Which remote interaction failed. Selects the user-facing reply and
/// gives log lines their context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteAction {
    /// Querying the relations database.
    RefreshRelations,
    /// Creating a relation or record page.
    SubmitRecord,
    /// Delivering a reply through the chat transport.
    Reply,
}

impl std::fmt::Display for RemoteAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RefreshRelations => write!(f, "refreshing relations"),
            Self::SubmitRecord => write!(f, "submitting the record"),
            Self::Reply => write!(f, "sending the reply"),
        }
    }
}

/// Everything that can go wrong while handling one inbound message.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Sender is not on the configured allow-list.
    #[error("sender is not on the allow-list")]
    NotAuthorized,

    /// Message text does not match the expected field layout.
    #[error("invalid command format, expected: {usage}")]
    InvalidFormat {
        /// Layout shown back to the sender.
        usage: &'static str,
    },

    /// The in/out fields did not parse as integers.
    #[error("in/out fields are not integers")]
    InvalidNumber,

    /// The relation field was empty after trimming.
    #[error("relation name is empty")]
    EmptyRelation,

    /// A record arrived before any relation was selected with `/when`.
    #[error("no pending relation selected")]
    NoPendingRelation,

    /// Slash command not recognized in the active mode.
    #[error("unknown command: /{name}")]
    UnknownCommand {
        /// Command token without the leading slash.
        name: String,
        /// Commands the active mode accepts.
        available: &'static str,
    },

    /// A relation was created remotely but still missing after a refresh.
    #[error("relation {name:?} not found after refresh")]
    RelationUnresolved { name: String },

    /// A remote call failed.
    #[error("remote call failed while {action}")]
    Remote {
        action: RemoteAction,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl LedgerError {
    /// Wrap a remote failure, keeping the source chain for logs.
    #[must_use]
    pub fn remote(action: RemoteAction, source: anyhow::Error) -> Self {
        Self::Remote {
            action,
            source: source.into(),
        }
    }

    /// Whether the sender caused this error, as opposed to a failure in
    /// the relay or a remote service. Drives log severity.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Remote { .. } | Self::RelationUnresolved { .. })
    }

    /// The reply shown to the sender for this error.
    ///
    /// Remote failures collapse to a generic apology; the chained
    /// source only ever reaches the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthorized => "You are not authorized to use this bot.".into(),
            Self::InvalidFormat { usage } => format!("Invalid command format. Use: {usage}"),
            Self::InvalidNumber => r#"Invalid input: "in" and "out" must be numbers."#.into(),
            Self::EmptyRelation => r#"Invalid input: "when" must not be empty."#.into(),
            Self::NoPendingRelation => {
                "No Time selected. Please first add Time with the /when command.".into()
            }
            Self::UnknownCommand { available, .. } => {
                format!("Unknown command. Available commands: {available}")
            }
            Self::Remote {
                action: RemoteAction::RefreshRelations,
                ..
            } => "An error occurred while refreshing relations. Please try again later.".into(),
            Self::Remote { .. } | Self::RelationUnresolved { .. } => {
                "An error occurred while processing your request. Please try again later.".into()
            }
        }
    }
}
