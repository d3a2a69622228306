//! Storage seam between the relay core and the remote database.

use {anyhow::Result, async_trait::async_trait, chrono::NaiveDate};

use crate::relations::RelationOption;

/// Payload for creating one relation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelation {
    /// Title text, the name records are matched against.
    pub day: String,
    /// Date stamp, set when a `/when` command creates the relation.
    pub date: Option<NaiveDate>,
    /// Sender display name, set when a `/when` command creates the
    /// relation.
    pub banker: Option<String>,
}

/// Payload for creating one record page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub name: String,
    pub in_value: i64,
    pub out_value: i64,
    /// Resolved relation page id the record links to.
    pub relation_id: String,
    /// Sender display name stamped on the record.
    pub added_by: String,
}

/// Remote database operations the relay depends on.
///
/// The Notion client implements this for production; handler tests swap
/// in an in-memory recording store.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Every relation option, ordered by title ascending.
    async fn list_relations(&self) -> Result<Vec<RelationOption>>;

    /// Create one relation page.
    async fn create_relation(&self, relation: &NewRelation) -> Result<()>;

    /// Create one record page.
    async fn create_record(&self, record: &NewRecord) -> Result<()>;
}
