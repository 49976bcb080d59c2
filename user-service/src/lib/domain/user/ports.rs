use std::future::Future;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::domain::user::errors::TransactionError;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Registration;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new account and issue its first access token.
    ///
    /// Lookup, insert and issuance run in one transaction; concurrent
    /// registrations for the same email are serialized by the store.
    ///
    /// # Arguments
    /// * `ctx` - Request context of the calling request
    /// * `command` - Validated email and raw credential
    ///
    /// # Returns
    /// Created user and a signed access token
    ///
    /// # Errors
    /// * `Credential` - Credential is empty or could not be hashed
    /// * `DuplicateAccount` - Email is already registered
    /// * `TokenIssuance` - Signing failed; the insert is rolled back
    /// * `Transaction` - Begin, commit or rollback failed, or the deadline expired
    /// * `DatabaseError` - Database operation failed
    async fn register_and_issue_token(
        &self,
        ctx: &RequestContext,
        command: RegisterUserCommand,
    ) -> Result<Registration, UserError>;

    /// Retrieve the user identified by the request context.
    ///
    /// # Errors
    /// * `MissingIdentity` - Context carries no authenticated user
    /// * `InvalidUserId` - Identity is not a user ID
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_current_user(&self, ctx: &RequestContext) -> Result<User, UserError>;

    /// Rename the user identified by the request context.
    ///
    /// # Errors
    /// * `MissingIdentity` - Context carries no authenticated user
    /// * `NotFound` - User does not exist
    /// * `Transaction` - Transaction failure
    /// * `DatabaseError` - Database operation failed
    async fn update_current_user(
        &self,
        ctx: &RequestContext,
        command: UpdateUserCommand,
    ) -> Result<User, UserError>;
}

/// Persistence operations for user aggregate.
///
/// Every call joins the transaction carried by `ctx` when there is one.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Take an exclusive lock on the email slot and report whether an
    /// account already holds it.
    ///
    /// The lock is held until the surrounding transaction ends, so a
    /// concurrent caller with the same email blocks here until then.
    ///
    /// # Returns
    /// `true` if a user with this email exists
    ///
    /// # Errors
    /// * `Transaction(NotInTransaction)` - `ctx` carries no transaction
    /// * `DatabaseError` - Database operation failed
    async fn lock_by_email(
        &self,
        ctx: &RequestContext,
        email: &EmailAddress,
    ) -> Result<bool, UserError>;

    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `DuplicateAccount` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, ctx: &RequestContext, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, ctx: &RequestContext, id: &UserId)
        -> Result<Option<User>, UserError>;

    /// Update existing user in storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, ctx: &RequestContext, user: User) -> Result<User, UserError>;
}

/// Runs a unit of work inside one store transaction.
pub trait TransactionManager: Send + Sync + 'static {
    /// Begin a transaction, hand `work` a context bound to it, then commit
    /// on `Ok` or roll back on `Err`, panic or deadline expiry.
    ///
    /// Exactly one of commit or rollback happens per call. A panic inside
    /// `work` is re-raised after the rollback. Once `work` has succeeded the
    /// commit runs to completion even past the deadline.
    ///
    /// # Arguments
    /// * `ctx` - Parent context; its deadline and transaction budget bound
    ///   the unit of work, the budget counted from when the transaction opens
    /// * `work` - Unit of work, receives the derived context
    ///
    /// # Errors
    /// * The error returned by `work`, unchanged
    /// * `TransactionError` - Begin or commit failed, or the deadline expired
    fn run_in_transaction<'a, T, E, F, Fut>(
        &'a self,
        ctx: &'a RequestContext,
        work: F,
    ) -> impl Future<Output = Result<T, E>> + Send + 'a
    where
        T: Send + 'a,
        E: From<TransactionError> + Send + 'a,
        F: FnOnce(RequestContext) -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a;
}

/// Issues access tokens for freshly registered users.
pub trait TokenIssuer: Send + Sync + 'static {
    /// # Errors
    /// * `TokenIssuance` - Signing failed
    fn issue(&self, user_id: &UserId, email: &EmailAddress) -> Result<String, UserError>;
}
