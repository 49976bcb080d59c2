use std::sync::Arc;

use async_trait::async_trait;
use auth::CredentialError;
use auth::CredentialHasher;
use chrono::Utc;

use crate::context::RequestContext;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::Registration;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::TokenIssuer;
use crate::domain::user::ports::TransactionManager;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR, TM, TI>
where
    UR: UserRepository,
    TM: TransactionManager,
    TI: TokenIssuer,
{
    repository: Arc<UR>,
    transactions: Arc<TM>,
    tokens: Arc<TI>,
    credential_hasher: CredentialHasher,
}

impl<UR, TM, TI> UserService<UR, TM, TI>
where
    UR: UserRepository,
    TM: TransactionManager,
    TI: TokenIssuer,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `transactions` - Transaction guard over the same store
    /// * `tokens` - Access token issuer
    pub fn new(repository: Arc<UR>, transactions: Arc<TM>, tokens: Arc<TI>) -> Self {
        Self {
            repository,
            transactions,
            tokens,
            credential_hasher: CredentialHasher::new(),
        }
    }
}

fn current_user_id(ctx: &RequestContext) -> Result<UserId, UserError> {
    let user_id = ctx.user_id().ok_or(UserError::MissingIdentity)?;
    Ok(UserId::from_string(user_id)?)
}

#[async_trait]
impl<UR, TM, TI> UserServicePort for UserService<UR, TM, TI>
where
    UR: UserRepository,
    TM: TransactionManager,
    TI: TokenIssuer,
{
    async fn register_and_issue_token(
        &self,
        ctx: &RequestContext,
        command: RegisterUserCommand,
    ) -> Result<Registration, UserError> {
        // Hash outside the transaction so the email lock is held only for I/O.
        let hasher = self.credential_hasher.clone();
        let credential = command.credential;
        let credential_hash = tokio::task::spawn_blocking(move || hasher.hash(&credential))
            .await
            .map_err(|e| CredentialError::HashingFailed(e.to_string()))??;
        let email = command.email;
        let repository = &self.repository;
        let tokens = &self.tokens;

        let result = self
            .transactions
            .run_in_transaction::<_, UserError, _, _>(ctx, move |tx_ctx| async move {
                if repository.lock_by_email(&tx_ctx, &email).await? {
                    return Err(UserError::DuplicateAccount(email.to_string()));
                }

                let user = User {
                    id: UserId::new(),
                    name: DisplayName::from_email(&email),
                    email,
                    credential_hash,
                    created_at: Utc::now(),
                };
                let user = repository.create(&tx_ctx, user).await?;
                let token = tokens.issue(&user.id, &user.email)?;

                Ok(Registration { user, token })
            })
            .await;

        match &result {
            Ok(registration) => tracing::info!(
                user_id = %registration.user.id,
                email = %registration.user.email,
                "User registered"
            ),
            Err(UserError::DuplicateAccount(email)) => {
                tracing::warn!(email = %email, "Registration rejected: account exists")
            }
            Err(e) => tracing::error!(error = %e, "Registration failed"),
        }

        result
    }

    async fn get_current_user(&self, ctx: &RequestContext) -> Result<User, UserError> {
        let id = current_user_id(ctx)?;

        self.repository
            .find_by_id(ctx, &id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn update_current_user(
        &self,
        ctx: &RequestContext,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let id = current_user_id(ctx)?;
        let repository = &self.repository;

        let updated_user = self
            .transactions
            .run_in_transaction::<_, UserError, _, _>(ctx, move |tx_ctx| async move {
                let mut user = repository
                    .find_by_id(&tx_ctx, &id)
                    .await?
                    .ok_or(UserError::NotFound(id.to_string()))?;

                user.name = command.name;

                repository.update(&tx_ctx, user).await
            })
            .await?;

        tracing::info!(user_id = %updated_user.id, "User renamed");

        Ok(updated_user)
    }
}
