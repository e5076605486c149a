use std::time::Duration;

use serde_json::{Map, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use super::notify::Subscribers;
use super::{path, tree, ChangeCallback, RecordStore, StoreError, StoreResult, Subscription};

/// Segments that select one stored document (`users/<uid>`).
const ROOT_DEPTH: usize = 2;

const MAX_CONNECTIONS: u32 = 20;

/// Postgres-backed store: each `users/<uid>` subtree is one JSONB row, edited
/// read-modify-write under a row lock so concurrent writers to the same user
/// serialize.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    subscribers: Subscribers,
}

fn split_root<'a>(segments: &'a [&'a str]) -> StoreResult<(String, &'a [&'a str])> {
    if segments.len() < ROOT_DEPTH {
        return Err(StoreError::InvalidPath(format!(
            "{:?} is above a user document",
            segments.join("/")
        )));
    }
    let (root, rest) = segments.split_at(ROOT_DEPTH);
    Ok((root.join("/"), rest))
}

impl PgStore {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            subscribers: Subscribers::new(),
        }
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    async fn load_for_update(
        tx: &mut Transaction<'_, Postgres>,
        root: &str,
    ) -> StoreResult<Value> {
        let doc = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT doc FROM documents WHERE root = $1 FOR UPDATE",
        )
        .bind(root)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(doc.map(|d| d.0).unwrap_or_else(|| Value::Object(Map::new())))
    }

    async fn save(tx: &mut Transaction<'_, Postgres>, root: &str, doc: &Value) -> StoreResult<()> {
        let empty = match doc {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if empty {
            sqlx::query("DELETE FROM documents WHERE root = $1")
                .bind(root)
                .execute(&mut **tx)
                .await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO documents (root, doc, updated_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (root) DO UPDATE SET
                    doc = EXCLUDED.doc,
                    updated_at = NOW()
                "#,
            )
            .bind(root)
            .bind(Json(doc))
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Apply `edit` to the document holding `path` inside one transaction.
    async fn edit<F>(&self, path: &str, edit: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Value, &[&str]) + Send,
    {
        let segments = path::segments(path)?;
        let (root, rest) = split_root(&segments)?;

        let mut tx = self.pool.begin().await?;
        let mut doc = Self::load_for_update(&mut tx, &root).await?;
        edit(&mut doc, rest);
        Self::save(&mut tx, &root, &doc).await?;
        tx.commit().await?;

        for (watched, callback) in self.subscribers.affected(&segments) {
            let value = self.read_path(&watched).await.ok().flatten();
            callback(value.as_ref());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for PgStore {
    async fn read_path(&self, path: &str) -> StoreResult<Option<Value>> {
        let segments = path::segments(path)?;
        let (root, rest) = split_root(&segments)?;
        let doc = sqlx::query_scalar::<_, Json<Value>>("SELECT doc FROM documents WHERE root = $1")
            .bind(&root)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc.and_then(|d| tree::get(&d.0, rest).cloned()))
    }

    async fn upsert(&self, path: &str, partial: Value) -> StoreResult<()> {
        self.edit(path, move |doc, rest| tree::merge(doc, rest, partial))
            .await?;
        tracing::debug!(path = %path, "Record upserted");
        Ok(())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.edit(path, |doc, rest| {
            tree::remove(doc, rest);
        })
        .await?;
        tracing::debug!(path = %path, "Record deleted");
        Ok(())
    }

    async fn on_change(&self, path: &str, callback: ChangeCallback) -> StoreResult<Subscription> {
        let segments = path::segments(path)?;
        split_root(&segments)?;
        let subscription = self.subscribers.register(&segments, callback.clone());
        let current = self.read_path(path).await?;
        callback(current.as_ref());
        Ok(subscription)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
