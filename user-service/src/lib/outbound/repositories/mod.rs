pub mod transaction;
pub mod user;

pub use transaction::IsolationLevel;
pub use transaction::PostgresTransactionManager;
pub use user::PostgresUserRepository;
