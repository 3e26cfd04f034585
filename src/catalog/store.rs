// Document persistence for catalog collections

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::models::{Document, Stored};
use crate::error::ApiError;
use crate::query::{DocumentQueryBuilder, Page};

/// Exact match on a top-level string field
#[derive(Debug, Clone)]
pub struct FieldFilter {
    pub field: &'static str,
    pub value: String,
}

impl FieldFilter {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Storage for one collection of documents
#[async_trait]
pub trait DocumentStore<D: Document>: Send + Sync {
    /// Find a document by id
    async fn find(&self, id: Uuid) -> Result<Option<Stored<D>>, ApiError>;

    /// List documents in insertion order, optionally filtered
    async fn list(&self, filter: Option<FieldFilter>, page: Page)
        -> Result<Vec<Stored<D>>, ApiError>;

    /// Store a new document under a fresh id
    async fn insert(&self, document: D) -> Result<Stored<D>, ApiError>;

    /// Shallow-merge `patch` into the document; `None` if the id is unknown
    async fn update(&self, id: Uuid, patch: Map<String, Value>)
        -> Result<Option<Stored<D>>, ApiError>;

    /// Delete a document; `false` if the id is unknown
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Shared handle to a collection, used as handler state
pub struct Collection<D: Document>(Arc<dyn DocumentStore<D>>);

impl<D: Document> Collection<D> {
    pub fn new(store: Arc<dyn DocumentStore<D>>) -> Self {
        Self(store)
    }
}

impl<D: Document> Clone for Collection<D> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<D: Document> Deref for Collection<D> {
    type Target = dyn DocumentStore<D>;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

/// Decode a `(id, body)` row into a typed document
fn decode<D: Document>((id, body): (Uuid, Value)) -> Result<Stored<D>, ApiError> {
    Ok(Stored {
        id,
        document: serde_json::from_value(body)?,
    })
}

/// PostgreSQL-backed collection: one table of `(id, body JSONB, created_at)`
pub struct PgCollection<D> {
    pool: PgPool,
    _document: PhantomData<fn() -> D>,
}

impl<D: Document> PgCollection<D> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _document: PhantomData,
        }
    }
}

#[async_trait]
impl<D: Document> DocumentStore<D> for PgCollection<D> {
    async fn find(&self, id: Uuid) -> Result<Option<Stored<D>>, ApiError> {
        let sql = format!("SELECT id, body FROM {} WHERE id = $1", D::COLLECTION);
        let row = sqlx::query_as::<_, (Uuid, Value)>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(decode::<D>).transpose()
    }

    async fn list(
        &self,
        filter: Option<FieldFilter>,
        page: Page,
    ) -> Result<Vec<Stored<D>>, ApiError> {
        let mut builder = DocumentQueryBuilder::new(D::COLLECTION);
        if let Some(filter) = &filter {
            builder.add_field_filter(filter.field, &filter.value);
        }
        builder.set_pagination(page);
        let (sql, params) = builder.build();

        let mut query = sqlx::query_as::<_, (Uuid, Value)>(&sql);
        for param in params {
            query = query.bind(param);
        }
        let rows = query.fetch_all(&self.pool).await?;

        rows.into_iter().map(decode::<D>).collect()
    }

    async fn insert(&self, document: D) -> Result<Stored<D>, ApiError> {
        let id = Uuid::new_v4();
        let body = serde_json::to_value(&document)?;
        let sql = format!("INSERT INTO {} (id, body) VALUES ($1, $2)", D::COLLECTION);
        sqlx::query(&sql)
            .bind(id)
            .bind(body)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Inserted {} {}", D::RESOURCE, id);
        Ok(Stored { id, document })
    }

    async fn update(
        &self,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Option<Stored<D>>, ApiError> {
        // jsonb || jsonb replaces top-level keys present on the right
        let sql = format!(
            "UPDATE {} SET body = body || $2 WHERE id = $1 RETURNING id, body",
            D::COLLECTION
        );
        let row = sqlx::query_as::<_, (Uuid, Value)>(&sql)
            .bind(id)
            .bind(Value::Object(patch))
            .fetch_optional(&self.pool)
            .await?;

        row.map(decode::<D>).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", D::COLLECTION);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
