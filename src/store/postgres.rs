//! PostgreSQL document store: one `documents` table of JSONB bodies

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Pool, Postgres};

use super::{assign_id, pin_id, ConditionalDelete, Dependents, DocumentStore, Filter, ID_FIELD};
use crate::error::{StoreError, StoreResult};

/// Matches a scalar field equal to the value, or an array field containing it.
const FIELD_MATCH: &str = "body -> $2::text @> to_jsonb($3::text)";

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: Pool<Postgres>,
}

impl PgDocumentStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {}", e)))
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find_all(&self, collection: &str, sort: Option<&str>) -> StoreResult<Vec<Value>> {
        let documents = sqlx::query_scalar::<_, Value>(
            r#"
            SELECT body FROM documents
            WHERE collection = $1
            ORDER BY (body ->> $2::text) COLLATE "C" NULLS FIRST, created_at, id
            "#,
        )
        .bind(collection)
        .bind(sort)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let document = sqlx::query_scalar::<_, Value>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    async fn find_by_filter(
        &self,
        collection: &str,
        filter: &Filter,
        projection: Option<&[&str]>,
    ) -> StoreResult<Vec<Value>> {
        // $4 NULL keeps the whole body; otherwise only `id` and the listed keys.
        let query = format!(
            r#"
            SELECT CASE WHEN $4::text[] IS NULL THEN body ELSE COALESCE(
                (SELECT jsonb_object_agg(e.key, e.value) FROM jsonb_each(body) e
                 WHERE e.key = '{}' OR e.key = ANY($4::text[])),
                '{{}}'::jsonb
            ) END
            FROM documents
            WHERE collection = $1 AND {}
            ORDER BY created_at, id
            "#,
            ID_FIELD, FIELD_MATCH
        );
        let documents = sqlx::query_scalar::<_, Value>(&query)
            .bind(collection)
            .bind(&filter.field)
            .bind(&filter.value)
            .bind(projection.map(|fields| {
                fields.iter().map(|f| f.to_string()).collect::<Vec<String>>()
            }))
            .fetch_all(&self.pool)
            .await?;

        Ok(documents)
    }

    async fn insert(&self, collection: &str, mut document: Value) -> StoreResult<Value> {
        let id = assign_id(&mut document)?;
        let stored = sqlx::query_scalar::<_, Value>(
            "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3) RETURNING body",
        )
        .bind(collection)
        .bind(&id)
        .bind(&document)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        mut document: Value,
    ) -> StoreResult<Option<Value>> {
        pin_id(&mut document, id)?;
        let stored = sqlx::query_scalar::<_, Value>(
            r#"
            UPDATE documents SET body = $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING body
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&document)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, collection: &str, filter: Option<&Filter>) -> StoreResult<u64> {
        let query = format!(
            "SELECT COUNT(*) FROM documents WHERE collection = $1 AND ($2::text IS NULL OR {})",
            FIELD_MATCH
        );
        let count: i64 = sqlx::query_scalar(&query)
            .bind(collection)
            .bind(filter.map(|f| f.field.as_str()))
            .bind(filter.map(|f| f.value.as_str()))
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn delete_unreferenced(
        &self,
        collection: &str,
        id: &str,
        dependents: Dependents<'_>,
    ) -> StoreResult<ConditionalDelete> {
        // A dependent may vanish between a refused delete and the follow-up read; retry then.
        for _ in 0..3 {
            let result = sqlx::query(
                r#"
                DELETE FROM documents d
                WHERE d.collection = $1 AND d.id = $2
                  AND NOT EXISTS (
                      SELECT 1 FROM documents r
                      WHERE r.collection = $3 AND r.body -> $4::text @> to_jsonb($2::text)
                  )
                "#,
            )
            .bind(collection)
            .bind(id)
            .bind(dependents.collection)
            .bind(dependents.field)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                return Ok(ConditionalDelete::Deleted);
            }
            if self.find_by_id(collection, id).await?.is_none() {
                return Ok(ConditionalDelete::NotFound);
            }
            let blocking = self
                .find_by_filter(dependents.collection, &dependents.filter(id), None)
                .await?;
            if !blocking.is_empty() {
                return Ok(ConditionalDelete::Blocked(blocking));
            }
        }

        Err(StoreError::Backend(format!(
            "conditional delete of {} {} kept racing with its dependents",
            collection, id
        )))
    }
}
