pub mod gate;

pub use gate::authenticate;
pub use gate::GateOutcome;
pub use gate::InboundCall;
pub use gate::Rejection;
