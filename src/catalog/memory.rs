// In-memory collection used by handler tests

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::catalog::models::{Document, Stored};
use crate::catalog::store::{DocumentStore, FieldFilter};
use crate::error::ApiError;
use crate::query::Page;

/// Keeps documents as JSON in insertion order, like the jsonb tables
pub struct MemoryCollection<D> {
    rows: Mutex<Vec<(Uuid, Value)>>,
    _document: PhantomData<fn() -> D>,
}

impl<D> Default for MemoryCollection<D> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            _document: PhantomData,
        }
    }
}

impl<D> MemoryCollection<D> {
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }
}

fn decode<D: Document>(id: Uuid, body: &Value) -> Result<Stored<D>, ApiError> {
    Ok(Stored {
        id,
        document: serde_json::from_value(body.clone())?,
    })
}

#[async_trait]
impl<D: Document> DocumentStore<D> for MemoryCollection<D> {
    async fn find(&self, id: Uuid) -> Result<Option<Stored<D>>, ApiError> {
        let rows = self.rows.lock();
        rows.iter()
            .find(|(row_id, _)| *row_id == id)
            .map(|(row_id, body)| decode(*row_id, body))
            .transpose()
    }

    async fn list(
        &self,
        filter: Option<FieldFilter>,
        page: Page,
    ) -> Result<Vec<Stored<D>>, ApiError> {
        let rows = self.rows.lock();
        rows.iter()
            .filter(|(_, body)| match &filter {
                Some(filter) => body.get(filter.field).and_then(Value::as_str)
                    == Some(filter.value.as_str()),
                None => true,
            })
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .map(|(id, body)| decode(*id, body))
            .collect()
    }

    async fn insert(&self, document: D) -> Result<Stored<D>, ApiError> {
        let id = Uuid::new_v4();
        let body = serde_json::to_value(&document)?;
        self.rows.lock().push((id, body));
        Ok(Stored { id, document })
    }

    async fn update(
        &self,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> Result<Option<Stored<D>>, ApiError> {
        let mut rows = self.rows.lock();
        let Some((_, body)) = rows.iter_mut().find(|(row_id, _)| *row_id == id) else {
            return Ok(None);
        };
        if let Value::Object(fields) = body {
            fields.extend(patch);
        }
        decode(id, body).map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|(row_id, _)| *row_id != id);
        Ok(rows.len() < before)
    }
}

/// Fails every call, for exercising the 500 path
pub struct FailingCollection;

#[async_trait]
impl<D: Document> DocumentStore<D> for FailingCollection {
    async fn find(&self, _id: Uuid) -> Result<Option<Stored<D>>, ApiError> {
        Err(ApiError::DatabaseError(sqlx::Error::PoolTimedOut))
    }

    async fn list(
        &self,
        _filter: Option<FieldFilter>,
        _page: Page,
    ) -> Result<Vec<Stored<D>>, ApiError> {
        Err(ApiError::DatabaseError(sqlx::Error::PoolTimedOut))
    }

    async fn insert(&self, _document: D) -> Result<Stored<D>, ApiError> {
        Err(ApiError::DatabaseError(sqlx::Error::PoolTimedOut))
    }

    async fn update(
        &self,
        _id: Uuid,
        _patch: Map<String, Value>,
    ) -> Result<Option<Stored<D>>, ApiError> {
        Err(ApiError::DatabaseError(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, ApiError> {
        Err(ApiError::DatabaseError(sqlx::Error::PoolTimedOut))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::{Comment, Movie};
    use serde_json::json;

    fn movie(title: &str) -> Movie {
        Movie {
            title: title.to_string(),
            release_date: "2010-07-16".to_string(),
            genre: "Drama".to_string(),
        }
    }

    #[tokio::test]
    async fn test_update_merges_top_level_fields() {
        let store = MemoryCollection::<Movie>::default();
        let stored = store.insert(movie("Inception")).await.unwrap();

        let patch = json!({"genre": "Thriller"}).as_object().cloned().unwrap();
        let updated = store.update(stored.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.document.title, "Inception");
        assert_eq!(updated.document.genre, "Thriller");
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let store = MemoryCollection::<Movie>::default();
        assert!(store.find(Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.update(Uuid::new_v4(), Map::new()).await.unwrap().is_none());
        assert!(!store.delete(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_filters_and_pages_in_insertion_order() {
        let store = MemoryCollection::<Comment>::default();
        let movie_id = Uuid::new_v4().to_string();
        for i in 0..5 {
            store
                .insert(Comment {
                    movie_id: movie_id.clone(),
                    text: format!("comment {}", i),
                })
                .await
                .unwrap();
        }
        store
            .insert(Comment {
                movie_id: Uuid::new_v4().to_string(),
                text: "elsewhere".to_string(),
            })
            .await
            .unwrap();

        let filter = Some(FieldFilter::new("movie_id", movie_id));
        let page = store.list(filter, Page { page: 2, limit: 2 }).await.unwrap();

        let texts: Vec<_> = page.iter().map(|c| c.document.text.as_str()).collect();
        assert_eq!(texts, vec!["comment 2", "comment 3"]);
    }
}
