//! Open log sessions and the registry that owns them.

mod intent;
mod log_session;
mod registry;
mod types;
mod view;

pub use intent::Intent;
pub use log_session::LogSession;
pub use registry::SessionRegistry;
pub use types::{Badge, CategoryCounts, ChangeReason, SessionEvent, SessionId, ViewChange};
