pub mod config;
pub mod context;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use context::RequestContext;
pub use outbound::repositories;
