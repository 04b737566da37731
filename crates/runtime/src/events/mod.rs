//! Topic-based event bus for external consumers.
//!
//! The rules engine has its own synchronous bus for in-window reactions. This
//! one fans finished results out to transports: events are published to
//! specific topics, and consumers subscribe only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{GameUpdate, LobbyEvent, TurnNotice};
