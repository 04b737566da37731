//! Session layer for the terraforming rules engine.
//!
//! This crate hosts many independent games on top of [`terra_core`]. Each game
//! lives in a [`GameSession`] guarded by its own async reader/writer lock, so
//! commands on one game never wait on another. Consumers drive games through
//! the cloneable [`GameService`] and follow them through the topic based
//! [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`api`] exposes the service façade and its error type
//! - [`session`] owns one game's state, diff log and collaborators
//! - [`events`] provides the broadcast bus for external consumers
//! - [`oracle`] holds the in-memory card catalog, board and deck
//! - [`repository`] stores live sessions
//! - [`config`] carries runtime tunables
pub mod api;
pub mod config;
pub mod events;
pub mod oracle;
pub mod repository;
pub mod session;

mod state_root;

pub use api::{GameService, PlayerLedger, Result, RuntimeError};
pub use config::RuntimeConfig;
pub use events::{Event, EventBus, GameUpdate, LobbyEvent, Topic};
pub use oracle::{HexBoard, SharedDeck, StaticCatalog};
pub use repository::{GameRepository, InMemoryGameRepository, RepositoryError};
pub use session::{CommandReceipt, GameSession};
pub use state_root::state_root;
