//! Per-request execution context.
//!
//! A [`RequestContext`] travels with one inbound call. The authentication
//! gate stores the caller's identity in it, and the transaction guard
//! derives a child context carrying the open transaction so repository
//! calls made inside a unit of work join that transaction instead of
//! opening their own. Every value has its own typed field and accessor
//! pair; there is no stringly keyed lookup.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

/// Identity resolved from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: Option<String>,
}

/// Opaque handle to a transaction bound to one unit of work.
///
/// The storage backend decides what lives behind it and downcasts it back
/// when a repository call needs the live transaction.
#[derive(Clone)]
pub struct TransactionHandle(Arc<dyn Any + Send + Sync>);

impl TransactionHandle {
    pub fn new<T: Any + Send + Sync>(resource: Arc<T>) -> Self {
        Self(resource)
    }

    /// Borrow the backend resource if it has the expected type.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransactionHandle(..)")
    }
}

/// Request-scoped values, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    user: Option<AuthenticatedUser>,
    transaction: Option<TransactionHandle>,
    deadline: Option<Instant>,
    transaction_timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the authenticated caller.
    pub fn with_user(mut self, user: AuthenticatedUser) -> Self {
        self.user = Some(user);
        self
    }

    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.user.as_ref()
    }

    /// Shortcut for the caller's `userId`.
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.user_id.as_str())
    }

    /// Derive a context bound to an open transaction.
    ///
    /// The parent context is left untouched.
    pub fn with_transaction(&self, handle: TransactionHandle) -> Self {
        Self {
            transaction: Some(handle),
            ..self.clone()
        }
    }

    pub fn transaction(&self) -> Option<&TransactionHandle> {
        self.transaction.as_ref()
    }

    /// Set an absolute deadline for storage work done on behalf of this call.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Budget for each unit of work, counted from the moment its
    /// transaction is opened rather than from request entry.
    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = Some(timeout);
        self
    }

    pub fn transaction_timeout(&self) -> Option<Duration> {
        self.transaction_timeout
    }

    /// Deadline for a unit of work starting at `start`: the earlier of the
    /// absolute deadline and the transaction budget.
    pub fn transaction_deadline(&self, start: Instant) -> Option<Instant> {
        let budget = self.transaction_timeout.map(|timeout| start + timeout);
        match (self.deadline, budget) {
            (Some(deadline), Some(budget)) => Some(deadline.min(budget)),
            (deadline, budget) => deadline.or(budget),
        }
    }
}
