//! Notion-backed [`LedgerStore`] implementation.
//!
//! Records and relations are pages in two Notion databases. Relations
//! carry their name in a `Day` title property; records carry `Name`,
//! `In`, `Out`, an `AddedBy` rich-text stamp, and a relation link whose
//! property name is configurable per deployment.

use {
    anyhow::{Context, Result, anyhow},
    async_trait::async_trait,
    reqwest::Client,
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    serde_json::json,
    tracing::{debug, warn},
};

use tally_ledger::{LedgerStore, NewRecord, NewRelation, RelationOption};

/// Notion API base URL.
const API_BASE: &str = "https://api.notion.com/v1";

/// Pinned Notion API revision.
const NOTION_VERSION: &str = "2022-06-28";

/// Title property of the relations database.
const DAY_PROPERTY: &str = "Day";

/// Notion API client for the records and relations databases.
#[derive(Clone)]
pub struct NotionStore {
    client: Client,
    token: Secret<String>,
    records_db: String,
    relations_db: String,
    relation_property: String,
    base_url: String,
}

impl std::fmt::Debug for NotionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionStore")
            .field("token", &"[REDACTED]")
            .field("records_db", &self.records_db)
            .field("relations_db", &self.relations_db)
            .field("relation_property", &self.relation_property)
            .finish()
    }
}

impl NotionStore {
    /// Create a client for the given databases.
    ///
    /// `relation_property` names the records-database property that
    /// links a record to its relation page.
    #[must_use]
    pub fn new(
        token: Secret<String>,
        records_db: impl Into<String>,
        relations_db: impl Into<String>,
        relation_property: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token,
            records_db: records_db.into(),
            relations_db: relations_db.into(),
            relation_property: relation_property.into(),
            base_url: API_BASE.into(),
        }
    }

    /// Create with custom base URL (for testing).
    #[cfg(test)]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        what: &str,
    ) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.token.expose_secret()))
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to send Notion {what} request"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Notion {} request failed: {} - {}", what, status, body));
        }
        Ok(response)
    }
}

#[async_trait]
impl LedgerStore for NotionStore {
    async fn list_relations(&self) -> Result<Vec<RelationOption>> {
        let url = format!("{}/databases/{}/query", self.base_url, self.relations_db);
        let body = json!({
            "sorts": [{ "property": DAY_PROPERTY, "direction": "ascending" }],
        });

        let response = self.post_json(&url, &body, "query").await?;
        let query: QueryResponse = response
            .json()
            .await
            .context("failed to parse Notion query response")?;

        if query.has_more {
            warn!(
                database = %self.relations_db,
                "relations database has more pages than one query returns"
            );
        }
        Ok(collect_options(query.results))
    }

    async fn create_relation(&self, relation: &NewRelation) -> Result<()> {
        let url = format!("{}/pages", self.base_url);
        let mut body = json!({
            "parent": { "database_id": self.relations_db },
            "properties": {
                DAY_PROPERTY: { "title": [{ "text": { "content": relation.day } }] },
            },
        });
        if let Some(date) = relation.date {
            body["properties"]["Date"] = json!({ "date": { "start": date.to_string() } });
        }
        if let Some(banker) = &relation.banker {
            body["properties"]["Banker"] =
                json!({ "rich_text": [{ "text": { "content": banker } }] });
        }

        self.post_json(&url, &body, "relation create").await?;
        debug!(day = %relation.day, "relation page created");
        Ok(())
    }

    async fn create_record(&self, record: &NewRecord) -> Result<()> {
        let url = format!("{}/pages", self.base_url);
        let mut body = json!({
            "parent": { "database_id": self.records_db },
            "properties": {
                "Name": { "title": [{ "text": { "content": record.name } }] },
                "In": { "number": record.in_value },
                "Out": { "number": record.out_value },
                "AddedBy": { "rich_text": [{ "text": { "content": record.added_by } }] },
            },
        });
        body["properties"][self.relation_property.as_str()] =
            json!({ "relation": [{ "id": record.relation_id }] });

        self.post_json(&url, &body, "record create").await?;
        debug!(name = %record.name, "record page created");
        Ok(())
    }
}

/// Turn query results into lookup options, skipping pages whose title is
/// empty. An untitled relation can never be matched by name, so keeping
/// it would only pad the cache.
fn collect_options(pages: Vec<Page>) -> Vec<RelationOption> {
    pages
        .into_iter()
        .filter_map(|page| {
            let name: String = page
                .properties
                .day
                .map(|title| {
                    title
                        .title
                        .iter()
                        .map(|fragment| fragment.plain_text.as_str())
                        .collect()
                })
                .unwrap_or_default();
            if name.trim().is_empty() {
                debug!(page = %page.id, "skipping relation page without a title");
                return None;
            }
            Some(RelationOption { id: page.id, name })
        })
        .collect()
}

// ── API Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Page>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct Page {
    id: String,
    properties: PageProperties,
}

#[derive(Debug, Deserialize)]
struct PageProperties {
    #[serde(rename = "Day", default)]
    day: Option<TitleProperty>,
}

#[derive(Debug, Deserialize)]
struct TitleProperty {
    #[serde(default)]
    title: Vec<RichTextFragment>,
}

#[derive(Debug, Deserialize)]
struct RichTextFragment {
    plain_text: String,
}
