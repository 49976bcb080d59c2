use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::postgres::PgQueryResult;
use sqlx::postgres::PgRow;
use sqlx::query::Query;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::Row;

use super::transaction::ambient_transaction;
use crate::context::RequestContext;
use crate::domain::user::errors::TransactionError;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// SQLSTATE raised when `lock_timeout` cuts off a lock wait.
const LOCK_NOT_AVAILABLE: &str = "55P03";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: PgRow) -> Result<User, UserError> {
        Ok(User {
            id: UserId(row.try_get("id").map_err(database_error)?),
            name: DisplayName::new(row.try_get("name").map_err(database_error)?)?,
            email: EmailAddress::new(row.try_get("email").map_err(database_error)?)?,
            credential_hash: row.try_get("credential_hash").map_err(database_error)?,
            created_at: row.try_get("created_at").map_err(database_error)?,
        })
    }

    /// Run a statement on the ambient transaction, or on the pool when the
    /// context carries none.
    async fn execute(
        &self,
        ctx: &RequestContext,
        query: PgQuery<'_>,
    ) -> Result<Result<PgQueryResult, sqlx::Error>, UserError> {
        match ambient_transaction(ctx) {
            Some(slot) => {
                let mut guard = slot.lock().await;
                let tx = guard.as_mut().ok_or(TransactionError::Closed)?;
                Ok(query.execute(&mut **tx).await)
            }
            None => Ok(query.execute(&self.pool).await),
        }
    }

    async fn fetch_optional(
        &self,
        ctx: &RequestContext,
        query: PgQuery<'_>,
    ) -> Result<Option<PgRow>, UserError> {
        match ambient_transaction(ctx) {
            Some(slot) => {
                let mut guard = slot.lock().await;
                let tx = guard.as_mut().ok_or(TransactionError::Closed)?;
                query.fetch_optional(&mut **tx).await.map_err(database_error)
            }
            None => query
                .fetch_optional(&self.pool)
                .await
                .map_err(database_error),
        }
    }
}

fn database_error(e: sqlx::Error) -> UserError {
    let lock_timed_out = e
        .as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == LOCK_NOT_AVAILABLE);
    if lock_timed_out {
        return TransactionError::TimedOut.into();
    }
    UserError::DatabaseError(e.to_string())
}

fn is_duplicate_email(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db_err| {
        db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT)
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn lock_by_email(
        &self,
        ctx: &RequestContext,
        email: &EmailAddress,
    ) -> Result<bool, UserError> {
        let slot = ambient_transaction(ctx).ok_or(TransactionError::NotInTransaction)?;
        let mut guard = slot.lock().await;
        let tx = guard.as_mut().ok_or(TransactionError::Closed)?;

        // Row locks cannot cover an absent row, so the email itself is
        // locked too; both are released when the transaction ends.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(email.as_str())
            .execute(&mut **tx)
            .await
            .map_err(database_error)?;

        let row = sqlx::query(
            r#"
            SELECT id
            FROM users
            WHERE email = $1
            FOR UPDATE
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(database_error)?;

        Ok(row.is_some())
    }

    async fn create(&self, ctx: &RequestContext, user: User) -> Result<User, UserError> {
        let query = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, credential_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id.0)
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(user.credential_hash.as_str())
        .bind(user.created_at);

        self.execute(ctx, query).await?.map_err(|e| {
            if is_duplicate_email(&e) {
                return UserError::DuplicateAccount(user.email.to_string());
            }
            database_error(e)
        })?;

        Ok(user)
    }

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: &UserId,
    ) -> Result<Option<User>, UserError> {
        let query = sqlx::query(
            r#"
            SELECT id, name, email, credential_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0);

        self.fetch_optional(ctx, query)
            .await?
            .map(Self::row_to_user)
            .transpose()
    }

    async fn update(&self, ctx: &RequestContext, user: User) -> Result<User, UserError> {
        let query = sqlx::query(
            r#"
            UPDATE users
            SET name = $2
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(user.name.as_str());

        let result = self.execute(ctx, query).await?.map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(user.id.to_string()));
        }

        Ok(user)
    }
}
