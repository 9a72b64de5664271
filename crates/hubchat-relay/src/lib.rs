//! hubchat-relay: Chat relay
//!
//! Holds the per-session transcript and conversation handle, relays user
//! input to the assistant service, and accumulates the streamed reply.

pub mod error;
pub mod events;
pub mod relay;
pub mod session;

pub use error::{Error, Result};
pub use events::RelayEvent;
pub use relay::ChatRelay;
pub use session::{RelayState, Session, Transcript, Turn};
