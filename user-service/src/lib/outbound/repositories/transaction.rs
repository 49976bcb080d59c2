use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::Transaction;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::context::RequestContext;
use crate::context::TransactionHandle;
use crate::domain::user::errors::TransactionError;
use crate::domain::user::ports::TransactionManager;

/// Shared slot holding the live transaction of one unit of work.
///
/// The guard empties it when the unit of work ends, so a context that
/// outlives its unit of work sees `None`.
pub(crate) type TransactionSlot = Mutex<Option<Transaction<'static, Postgres>>>;

/// The transaction carried by `ctx`, if any.
pub(crate) fn ambient_transaction(ctx: &RequestContext) -> Option<&TransactionSlot> {
    ctx.transaction()
        .and_then(|handle| handle.downcast_ref::<TransactionSlot>())
}

/// Isolation level applied to every transaction the manager opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadCommitted,
    #[default]
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    fn set_statement(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "SET TRANSACTION ISOLATION LEVEL READ COMMITTED",
            IsolationLevel::RepeatableRead => "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ",
            IsolationLevel::Serializable => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        }
    }
}

/// Transaction guard over a Postgres pool.
pub struct PostgresTransactionManager {
    pool: PgPool,
    isolation: IsolationLevel,
}

impl PostgresTransactionManager {
    pub fn new(pool: PgPool, isolation: IsolationLevel) -> Self {
        Self { pool, isolation }
    }

    async fn begin(
        &self,
        deadline: Option<Instant>,
    ) -> Result<Transaction<'static, Postgres>, TransactionError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| TransactionError::Begin(e.to_string()))?;

        sqlx::query(self.isolation.set_statement())
            .execute(&mut *tx)
            .await
            .map_err(|e| TransactionError::Begin(e.to_string()))?;

        // A waiter dropped on the client side would still hold its connection
        // until the lock is granted, so the server must give up on its own.
        if let Some(deadline) = deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            sqlx::query(&lock_timeout_statement(remaining))
                .persistent(false)
                .execute(&mut *tx)
                .await
                .map_err(|e| TransactionError::Begin(e.to_string()))?;
        }

        Ok(tx)
    }
}

/// `SET LOCAL lock_timeout` for the time left; zero would disable it.
fn lock_timeout_statement(remaining: Duration) -> String {
    format!("SET LOCAL lock_timeout = {}", remaining.as_millis().max(1))
}

/// Await `future`, giving up at `deadline` when there is one.
async fn within<F: Future>(deadline: Option<Instant>, future: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, future).await.ok(),
        None => Some(future.await),
    }
}

async fn rollback(tx: Transaction<'static, Postgres>) {
    if let Err(e) = tx.rollback().await {
        tracing::error!(error = %e, "Failed to roll back transaction");
    }
}

impl TransactionManager for PostgresTransactionManager {
    fn run_in_transaction<'a, T, E, F, Fut>(
        &'a self,
        ctx: &'a RequestContext,
        work: F,
    ) -> impl Future<Output = Result<T, E>> + Send + 'a
    where
        T: Send + 'a,
        E: From<TransactionError> + Send + 'a,
        F: FnOnce(RequestContext) -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a,
    {
        async move {
            let deadline = ctx.transaction_deadline(Instant::now());

            // Dropping the transaction mid-begin leaves nothing to roll back.
            let tx = within(deadline, self.begin(deadline))
                .await
                .ok_or(TransactionError::TimedOut)??;

            let slot: Arc<TransactionSlot> = Arc::new(Mutex::new(Some(tx)));
            let tx_ctx = ctx.with_transaction(TransactionHandle::new(Arc::clone(&slot)));

            let outcome = within(deadline, AssertUnwindSafe(work(tx_ctx)).catch_unwind()).await;

            let tx = slot.lock().await.take().ok_or(TransactionError::Closed)?;

            match outcome {
                // Not bounded: dropping an in-flight COMMIT leaves its outcome unknown.
                Some(Ok(Ok(value))) => tx
                    .commit()
                    .await
                    .map(|()| value)
                    .map_err(|e| TransactionError::Commit(e.to_string()).into()),
                Some(Ok(Err(e))) => {
                    rollback(tx).await;
                    Err(e)
                }
                Some(Err(panic)) => {
                    tracing::error!("Unit of work panicked, rolling back");
                    rollback(tx).await;
                    std::panic::resume_unwind(panic)
                }
                None => {
                    tracing::warn!("Transaction deadline exceeded, rolling back");
                    rollback(tx).await;
                    Err(TransactionError::TimedOut.into())
                }
            }
        }
    }
}
