//! Embedded `SurrealDB` connection with a process-wide write lock.
//!
//! The store is shared by many concurrent tasks (router, queue, scheduler,
//! approval manager all touch it). `SurrealDB`'s per-statement transactions
//! are not enough on their own: two tasks racing a multi-statement write
//! could interleave so that one task's rollback silently erases another's
//! uncommitted work. Every write path in this crate therefore goes through
//! [`Db::write`], which serializes writers behind a single async mutex and
//! wraps the body in an explicit `BEGIN`/`COMMIT` transaction.

use std::sync::Arc;

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tokio::sync::Mutex;

use crate::error::{StorageError, StorageResult};

/// Namespace/database pair every connection is pinned to.
const NAMESPACE: &str = "astrid";
const DATABASE: &str = "main";

/// Embedded `SurrealDB` handle plus the write-serialization lock.
#[derive(Clone)]
pub struct Db {
    inner: Surreal<Any>,
    write_lock: Arc<Mutex<()>>,
}

impl Db {
    /// Connect to an embedded, disk-backed `SurrealDB` rooted at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or namespace/database selection
    /// fails.
    pub async fn connect_embedded(path: &str) -> StorageResult<Self> {
        let endpoint = format!("surrealkv://{path}");
        Self::connect(&endpoint).await
    }

    /// Connect to an in-memory `SurrealDB` instance. Intended for tests and
    /// ephemeral deploys.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or namespace/database selection
    /// fails.
    pub async fn connect_memory() -> StorageResult<Self> {
        Self::connect("mem://").await
    }

    async fn connect(endpoint: &str) -> StorageResult<Self> {
        let db: Surreal<Any> = Surreal::init();
        db.connect(endpoint)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self {
            inner: db,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Direct access to the underlying client for read-only queries, which
    /// may run concurrently with each other.
    #[must_use]
    pub fn client(&self) -> &Surreal<Any> {
        &self.inner
    }

    /// Run `body` with exclusive write access, inside an explicit
    /// transaction. Only one writer runs at a time across the whole store.
    ///
    /// # Errors
    ///
    /// Returns whatever error `body` returns; the transaction is rolled
    /// back whenever `body` fails or when the commit itself fails.
    pub async fn write<F, Fut, T>(&self, body: F) -> StorageResult<T>
    where
        F: FnOnce(Surreal<Any>) -> Fut,
        Fut: std::future::Future<Output = StorageResult<T>>,
    {
        let _guard = self.write_lock.lock().await;
        self.inner
            .query("BEGIN TRANSACTION")
            .await
            .map_err(StorageError::Query)?;
        match body(self.inner.clone()).await {
            Ok(value) => {
                self.inner
                    .query("COMMIT TRANSACTION")
                    .await
                    .map_err(StorageError::Query)?;
                Ok(value)
            },
            Err(e) => {
                let _ = self.inner.query("CANCEL TRANSACTION").await;
                Err(e)
            },
        }
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db").finish_non_exhaustive()
    }
}
