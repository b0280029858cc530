use {
    super::{ConnectionState, ContentStore},
    crate::{DatabaseConfig, Result},
    serde_json::Value,
    sqlx::types::Json,
    sqlx_postgres::{PgPool, PgPoolOptions},
    std::sync::atomic::{AtomicU8, Ordering},
};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS content_documents (
    id          BIGSERIAL PRIMARY KEY,
    collection  TEXT        NOT NULL,
    body        JSONB       NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)"#;

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS content_documents_collection_idx ON content_documents (collection, id)";

///
/// Postgres-backed document store.
///
/// Every document is a JSONB row tagged with its collection name. The pool is
/// created once at startup, shared by all requests and closed by
/// [`PgContentStore::disconnect`].
///
#[derive(Debug)]
pub struct PgContentStore {
    pool: PgPool,
    state: AtomicU8,
}

impl PgContentStore {
    ///
    /// Creates the pool and verifies the credentials with a round trip.
    ///
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let store = Self::connect_lazy(config)?;
        store.set_state(ConnectionState::Connecting);
        tracing::info!(url = %config.redacted_url(), "Connecting to document store");

        match store.ping().await {
            Ok(()) => {
                store.set_state(ConnectionState::Connected);
                tracing::info!("Connected to document store");
                Ok(store)
            }
            Err(e) => {
                store.set_state(ConnectionState::Disconnected);
                tracing::error!(error = %e, "Document store connection failed");
                Err(e)
            }
        }
    }

    ///
    /// Creates the pool without touching the network. The first query opens
    /// the first connection.
    ///
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_pool_size)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(config.connect_options()?);
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            state: AtomicU8::new(ConnectionState::Disconnected as u8),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    ///
    /// Closes every pooled connection. Waits for checked-out connections to
    /// be returned first.
    ///
    pub async fn disconnect(&self) {
        if self.pool.is_closed() {
            return;
        }
        self.set_state(ConnectionState::Disconnecting);
        self.pool.close().await;
        self.set_state(ConnectionState::Disconnected);
        tracing::info!("Disconnected from document store");
    }

    /// Creates the documents table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    ///
    /// Replaces the whole content of `collection` with `documents` in one
    /// transaction. Returns the number of inserted documents.
    ///
    pub async fn replace_collection(&self, collection: &str, documents: &[Value]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM content_documents WHERE collection = $1")
            .bind(collection)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for document in documents {
            sqlx::query("INSERT INTO content_documents (collection, body) VALUES ($1, $2)")
                .bind(collection)
                .bind(Json(document.clone()))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::debug!(collection, removed, inserted = documents.len(), "Collection replaced");
        Ok(documents.len())
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

impl ContentStore for PgContentStore {
    async fn find_one(&self, collection: &str) -> Result<Option<Value>> {
        let body = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT body FROM content_documents WHERE collection = $1 ORDER BY id LIMIT 1",
        )
        .bind(collection)
        .fetch_optional(&self.pool)
        .await?;
        Ok(body.map(|Json(value)| value))
    }

    async fn find(&self, collection: &str) -> Result<Vec<Value>> {
        let bodies = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT body FROM content_documents WHERE collection = $1 ORDER BY id",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;
        Ok(bodies.into_iter().map(|Json(value)| value).collect())
    }

    fn status(&self) -> ConnectionState {
        if self.pool.is_closed() {
            return ConnectionState::Disconnected;
        }
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    async fn close(&self) {
        self.disconnect().await;
    }
}
