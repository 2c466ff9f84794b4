use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

pub type Document = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredProfile {
    pub id: String,
    pub document: Document,
}

/// Keyed document storage for profiles. `external_id` is unique.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_external_id(&self, external_id: &str) -> anyhow::Result<Option<StoredProfile>>;

    /// Inserts a new document and returns the generated record id.
    async fn insert(&self, external_id: &str, document: Document) -> anyhow::Result<String>;

    /// Overwrites the given top-level fields, leaving the rest alone.
    async fn merge(&self, external_id: &str, fields: Document) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct SqliteProfileStore {
    pub(super) db_pool: SqlitePool,
}

impl SqliteProfileStore {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }
}

fn parse_document(raw: &str) -> anyhow::Result<Document> {
    match serde_json::from_str(raw)? {
        Value::Object(document) => Ok(document),
        other => Err(anyhow!("stored profile is not an object: {other}")),
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn find_by_external_id(&self, external_id: &str) -> anyhow::Result<Option<StoredProfile>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT id,document FROM profiles WHERE external_id=?")
                .bind(external_id)
                .fetch_optional(&self.db_pool)
                .await?;

        let Some((id, document)) = row else {
            return Ok(None);
        };

        Ok(Some(StoredProfile { id, document: parse_document(&document)? }))
    }

    async fn insert(&self, external_id: &str, document: Document) -> anyhow::Result<String> {
        let id = Uuid::now_v7().to_string();
        sqlx::query("INSERT INTO profiles (id,external_id,document) VALUES (?,?,?)")
            .bind(&id)
            .bind(external_id)
            .bind(serde_json::to_string(&document)?)
            .execute(&self.db_pool)
            .await?;

        Ok(id)
    }

    async fn merge(&self, external_id: &str, fields: Document) -> anyhow::Result<()> {
        let mut tx = self.db_pool.begin().await?;

        let Some((raw,)): Option<(String,)> =
            sqlx::query_as("SELECT document FROM profiles WHERE external_id=?")
                .bind(external_id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Err(anyhow!("no profile for {external_id}"));
        };

        let mut document = parse_document(&raw)?;
        document.extend(fields);

        sqlx::query("UPDATE profiles SET document=? WHERE external_id=?")
            .bind(serde_json::to_string(&document)?)
            .bind(external_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
