//! Message handling: authorization, command dispatch, relation
//! resolution, and record creation.
//!
//! Everything a handler touches lives in [`RelayContext`] and is passed
//! explicitly; the module owns no global state. Outbound replies go
//! through the [`ReplySink`] seam so the flows are testable without a
//! live chat transport.

use std::sync::Arc;

use {
    anyhow::Result,
    async_trait::async_trait,
    chrono::Local,
    serde::{Deserialize, Serialize},
    tokio::sync::{Mutex, RwLock},
    tracing::{debug, error, info},
};

use crate::{
    auth,
    commands::{self, Command, USAGE_INLINE, USAGE_TWO_STEP, USAGE_WHEN},
    error::{LedgerError, RemoteAction},
    message::InboundMessage,
    relations::{RelationOption, RelationSnapshot},
    store::{LedgerStore, NewRecord, NewRelation},
};

/// Which submission design the relay runs.
///
/// The modes are alternate designs for linking a record to a relation,
/// not layers of one pipeline; a process runs exactly one of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelayMode {
    /// Four-field submissions name the relation inline.
    #[default]
    Inline,
    /// `/when` selects a pending relation consumed by three-field
    /// submissions.
    TwoStep,
}

impl RelayMode {
    /// Slash commands available in this mode, for user-facing hints.
    #[must_use]
    pub fn command_list(self) -> &'static str {
        match self {
            Self::Inline => "/refresh",
            Self::TwoStep => "/refresh, /when",
        }
    }
}

/// Outbound reply seam.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Deliver one reply to the sender's chat.
    async fn send(&self, text: &str) -> Result<()>;
}

/// Shared state and collaborators for message handling.
pub struct RelayContext {
    mode: RelayMode,
    allowed_users: Vec<String>,
    store: Arc<dyn LedgerStore>,
    relations: RwLock<Arc<RelationSnapshot>>,
    /// Single-slot pending relation, used only in two-step mode.
    pending: Mutex<Option<RelationOption>>,
}

impl RelayContext {
    #[must_use]
    pub fn new(mode: RelayMode, allowed_users: Vec<String>, store: Arc<dyn LedgerStore>) -> Self {
        Self {
            mode,
            allowed_users,
            store,
            relations: RwLock::new(Arc::new(RelationSnapshot::default())),
            pending: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn mode(&self) -> RelayMode {
        self.mode
    }

    /// The current cache generation.
    pub async fn snapshot(&self) -> Arc<RelationSnapshot> {
        Arc::clone(&*self.relations.read().await)
    }

    /// Query the store and install a fresh snapshot.
    ///
    /// The previous generation stays installed if the query fails, so a
    /// flaky remote never clobbers a usable cache.
    pub async fn refresh_relations(&self) -> Result<Arc<RelationSnapshot>> {
        let options = self.store.list_relations().await?;
        let snapshot = Arc::new(RelationSnapshot::new(options));
        *self.relations.write().await = Arc::clone(&snapshot);
        debug!(relations = snapshot.len(), "relation cache refreshed");
        Ok(snapshot)
    }

    /// Prime the cache at startup.
    ///
    /// Failures are logged and the relay starts with an empty cache; the
    /// first successful refresh fills it.
    pub async fn warm(&self) {
        match self.refresh_relations().await {
            Ok(snapshot) => {
                let names: Vec<&str> = snapshot.names().collect();
                info!(
                    relations = snapshot.len(),
                    "available relations: {}",
                    names.join(", ")
                );
            }
            Err(err) => {
                error!(error = %err, "initial relation fetch failed, starting with an empty cache");
            }
        }
    }

    async fn pending_relation(&self) -> Option<RelationOption> {
        self.pending.lock().await.clone()
    }

    async fn set_pending(&self, option: RelationOption) {
        *self.pending.lock().await = Some(option);
    }

    async fn clear_pending(&self) {
        *self.pending.lock().await = None;
    }
}

/// Handle one inbound message end to end.
///
/// Happy-path replies are delivered through `replies`; on error the
/// caller sends [`LedgerError::user_message`] back instead. The
/// allow-list check runs before any parsing, so unauthorized text is
/// never interpreted.
pub async fn handle_message(
    ctx: &RelayContext,
    msg: &InboundMessage,
    replies: &dyn ReplySink,
) -> Result<(), LedgerError> {
    if !auth::is_authorized(&ctx.allowed_users, &msg.sender_id) {
        return Err(LedgerError::NotAuthorized);
    }

    if let Some(command) = Command::parse(&msg.text) {
        return match command {
            Command::Refresh => handle_refresh(ctx, replies).await,
            Command::When(arg) if ctx.mode() == RelayMode::TwoStep => {
                handle_when(ctx, msg, &arg, replies).await
            }
            Command::When(_) => Err(LedgerError::UnknownCommand {
                name: "when".into(),
                available: ctx.mode().command_list(),
            }),
            Command::Unknown(name) => Err(LedgerError::UnknownCommand {
                name,
                available: ctx.mode().command_list(),
            }),
        };
    }

    match ctx.mode() {
        RelayMode::Inline => handle_inline(ctx, msg, replies).await,
        RelayMode::TwoStep => handle_two_step(ctx, msg, replies).await,
    }
}

async fn handle_refresh(ctx: &RelayContext, replies: &dyn ReplySink) -> Result<(), LedgerError> {
    let snapshot = ctx
        .refresh_relations()
        .await
        .map_err(|e| LedgerError::remote(RemoteAction::RefreshRelations, e))?;
    let names: Vec<&str> = snapshot.names().collect();
    send(
        replies,
        &format!("Relations refreshed. Available options are: {}", names.join(", ")),
    )
    .await
}

async fn handle_inline(
    ctx: &RelayContext,
    msg: &InboundMessage,
    replies: &dyn ReplySink,
) -> Result<(), LedgerError> {
    let fields = commands::split_fields(&msg.text);
    let [name, in_field, out_field, when] = fields.as_slice() else {
        return Err(LedgerError::InvalidFormat {
            usage: USAGE_INLINE,
        });
    };
    let in_value = commands::parse_amount(in_field)?;
    let out_value = commands::parse_amount(out_field)?;
    if when.is_empty() {
        return Err(LedgerError::EmptyRelation);
    }

    let missing = NewRelation {
        day: when.clone(),
        date: None,
        banker: None,
    };
    let relation = resolve_relation(ctx, when, missing, replies).await?;

    let record = NewRecord {
        name: name.clone(),
        in_value,
        out_value,
        relation_id: relation.id.clone(),
        added_by: msg.sender_name.clone(),
    };
    ctx.store
        .create_record(&record)
        .await
        .map_err(|e| LedgerError::remote(RemoteAction::SubmitRecord, e))?;
    info!(sender = %msg.sender_id, record = %record.name, relation = %relation.name, "record added");
    send(replies, "Record added successfully to Notion database.").await
}

async fn handle_two_step(
    ctx: &RelayContext,
    msg: &InboundMessage,
    replies: &dyn ReplySink,
) -> Result<(), LedgerError> {
    let fields = commands::split_fields(&msg.text);
    let [name, in_field, out_field] = fields.as_slice() else {
        return Err(LedgerError::InvalidFormat {
            usage: USAGE_TWO_STEP,
        });
    };
    let in_value = commands::parse_amount(in_field)?;
    let out_value = commands::parse_amount(out_field)?;

    let Some(relation) = ctx.pending_relation().await else {
        return Err(LedgerError::NoPendingRelation);
    };

    let record = NewRecord {
        name: name.clone(),
        in_value,
        out_value,
        relation_id: relation.id.clone(),
        added_by: msg.sender_name.clone(),
    };
    ctx.store
        .create_record(&record)
        .await
        .map_err(|e| LedgerError::remote(RemoteAction::SubmitRecord, e))?;
    // Consumed only after the record lands; a failed submission keeps the
    // selection so the sender can simply retry.
    ctx.clear_pending().await;
    info!(sender = %msg.sender_id, record = %record.name, relation = %relation.name, "record added");
    send(replies, "Record added successfully to Notion database.").await
}

async fn handle_when(
    ctx: &RelayContext,
    msg: &InboundMessage,
    arg: &str,
    replies: &dyn ReplySink,
) -> Result<(), LedgerError> {
    if arg.is_empty() {
        return Err(LedgerError::InvalidFormat { usage: USAGE_WHEN });
    }

    let missing = NewRelation {
        day: arg.to_string(),
        date: Some(Local::now().date_naive()),
        banker: Some(msg.sender_name.clone()),
    };
    let relation = resolve_relation(ctx, arg, missing, replies).await?;

    ctx.set_pending(relation.clone()).await;
    info!(sender = %msg.sender_id, relation = %relation.name, "pending relation selected");
    send(replies, &format!("Time set to {}.", relation.name)).await
}

/// Find `name` in the current snapshot; when it is missing, create the
/// relation remotely, refresh the cache, and look again.
///
/// Lookups never create duplicates: an existing name, whatever its case,
/// is reused as-is.
async fn resolve_relation(
    ctx: &RelayContext,
    name: &str,
    missing: NewRelation,
    replies: &dyn ReplySink,
) -> Result<RelationOption, LedgerError> {
    let snapshot = ctx.snapshot().await;
    if let Some(option) = snapshot.find(name) {
        return Ok(option.clone());
    }

    ctx.store
        .create_relation(&missing)
        .await
        .map_err(|e| LedgerError::remote(RemoteAction::SubmitRecord, e))?;
    send(replies, "New relation added to the database.").await?;

    let refreshed = ctx
        .refresh_relations()
        .await
        .map_err(|e| LedgerError::remote(RemoteAction::SubmitRecord, e))?;
    refreshed
        .find(name)
        .cloned()
        .ok_or_else(|| LedgerError::RelationUnresolved {
            name: name.to_string(),
        })
}

async fn send(replies: &dyn ReplySink, text: &str) -> Result<(), LedgerError> {
    replies
        .send(text)
        .await
        .map_err(|e| LedgerError::remote(RemoteAction::Reply, e))
}
