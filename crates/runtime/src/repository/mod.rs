//! Repository layer for live sessions.
//!
//! Repositories track which games exist. Per-game state lives inside each
//! [`GameSession`](crate::session::GameSession); static content (cards, board
//! layout) is served by the [`oracle`](crate::oracle) module.

mod error;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use memory::InMemoryGameRepository;
pub use traits::GameRepository;
